use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use base64::Engine;
use sha2::{Digest, Sha256};

use crate::TransferError;

// ---------------------------------------------------------------------------
// BoundedFileView
// ---------------------------------------------------------------------------

/// A byte range of a file presented as an independent, restartable stream.
///
/// No file handle is held between calls: every read opens the file at
/// `start_byte + offset`, reads, and closes it again before returning.
/// Distinct views over the same file therefore never interfere, and a
/// failed part can be retried by seeking back to 0.
#[derive(Debug, Clone)]
pub struct BoundedFileView {
    path: PathBuf,
    start_byte: u64,
    size: u64,
    amount_read: u64,
}

impl BoundedFileView {
    /// Creates a view of `size` bytes starting at `start_byte`.
    ///
    /// A range running past the end of the file is truncated to the bytes
    /// actually available; [`len`](Self::len) reports the truncated size.
    pub fn new(path: impl Into<PathBuf>, start_byte: u64, size: u64) -> Result<Self, TransferError> {
        let path = path.into();
        let file_size = std::fs::metadata(&path)?.len();
        let size = size.min(file_size.saturating_sub(start_byte));
        tracing::trace!(path = %path.display(), start_byte, size, "opened part view");
        Ok(Self {
            path,
            start_byte,
            size,
            amount_read: 0,
        })
    }

    /// Reads up to `amount` bytes (everything left when `None`).
    ///
    /// Returns an empty buffer once the view is exhausted.
    pub fn read_bytes(&mut self, amount: Option<u64>) -> Result<Vec<u8>, TransferError> {
        let remaining = self.remaining();
        let amount = amount.map_or(remaining, |a| a.min(remaining));
        if amount == 0 {
            return Ok(Vec::new());
        }

        let mut buf = Vec::with_capacity(amount as usize);
        {
            let file = self.open_at_offset()?;
            file.take(amount).read_to_end(&mut buf)?;
        }
        self.amount_read += buf.len() as u64;
        Ok(buf)
    }

    /// Moves the view's offset, relative to `start_byte`.
    ///
    /// Offsets past the end clamp to [`len`](Self::len). `seek_to(0)` makes
    /// the view behave exactly like a freshly constructed one.
    pub fn seek_to(&mut self, offset: u64) {
        self.amount_read = offset.min(self.size);
    }

    /// Current offset within the view, never the file's absolute position.
    pub fn tell(&self) -> u64 {
        self.amount_read
    }

    /// Size of the view, fixed at construction.
    pub fn len(&self) -> u64 {
        self.size
    }

    /// Returns `true` if the view covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Bytes left before the view is exhausted.
    pub fn remaining(&self) -> u64 {
        self.size - self.amount_read
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute offset of the view's first byte in the file.
    pub fn start_byte(&self) -> u64 {
        self.start_byte
    }

    /// Base64 SHA-256 of the whole view (the `ChecksumSHA256` part parameter).
    ///
    /// Leaves the view rewound to offset 0.
    pub fn checksum_sha256(&mut self) -> Result<String, TransferError> {
        self.amount_read = 0;
        let mut hasher = Sha256::new();
        {
            let mut part = self.open_at_offset()?.take(self.size);
            let mut buf = [0u8; 8192];
            loop {
                let n = part.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
        }
        Ok(base64::engine::general_purpose::STANDARD.encode(hasher.finalize()))
    }

    fn open_at_offset(&self) -> io::Result<File> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.start_byte + self.amount_read))?;
        Ok(file)
    }
}

impl Read for BoundedFileView {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let amount = (buf.len() as u64).min(self.remaining()) as usize;
        if amount == 0 {
            return Ok(0);
        }

        let mut filled = 0;
        {
            let mut file = self.open_at_offset()?;
            while filled < amount {
                match file.read(&mut buf[filled..amount]) {
                    Ok(0) => break,
                    Ok(n) => filled += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            }
        }
        self.amount_read += filled as u64;
        Ok(filled)
    }
}

impl Seek for BoundedFileView {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.amount_read) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.size) + i128::from(delta),
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before the start of the view",
            ));
        }
        self.seek_to(u64::try_from(target).unwrap_or(u64::MAX));
        Ok(self.amount_read)
    }
}

// ---------------------------------------------------------------------------
// NonSeekableStream
// ---------------------------------------------------------------------------

/// Wraps a reader so that only [`Read`] is exposed.
///
/// Used for streaming sources (stdin uploads) so the engine cannot take the
/// seekable, retry-by-rewind path.
#[derive(Debug)]
pub struct NonSeekableStream<R> {
    inner: R,
}

impl<R: Read> NonSeekableStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwraps the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for NonSeekableStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}
