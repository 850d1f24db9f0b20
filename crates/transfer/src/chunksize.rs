//! Part-size selection under the service's multipart limits.

use crate::TransferError;

const MIB: u64 = 1024 * 1024;

/// Maximum number of parts in one multipart upload.
pub const MAX_PARTS: u64 = 10_000;

/// Largest object (and largest part) the service accepts in a single request: 5 GiB.
pub const MAX_SINGLE_UPLOAD_SIZE: u64 = 5 * 1024 * MIB;

/// Smallest non-final part the service accepts: 5 MiB.
pub const MIN_UPLOAD_CHUNKSIZE: u64 = 5 * MIB;

/// Largest object that can be uploaded at all: 5 TiB.
pub const MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024 * MIB;

/// Returns a part size for an object of `size` bytes, starting from the
/// requested `current_chunksize`.
///
/// The result lies in `[MIN_UPLOAD_CHUNKSIZE, MAX_SINGLE_UPLOAD_SIZE]` and
/// splits `size` into at most [`MAX_PARTS`] parts. When the requested size
/// would need too many parts it is doubled until it fits, which keeps
/// mebibyte-aligned inputs mebibyte-aligned.
pub fn find_chunksize(size: u64, current_chunksize: u64) -> Result<u64, TransferError> {
    if size > MAX_UPLOAD_SIZE {
        return Err(TransferError::InvalidSize {
            size,
            max: MAX_UPLOAD_SIZE,
        });
    }

    let mut chunksize = current_chunksize.max(MIN_UPLOAD_CHUNKSIZE);
    while size.div_ceil(chunksize) > MAX_PARTS {
        chunksize = chunksize.saturating_mul(2);
    }

    let chunksize = chunksize.min(MAX_SINGLE_UPLOAD_SIZE);
    if chunksize != current_chunksize {
        tracing::debug!(
            size,
            requested = current_chunksize,
            chunksize,
            "adjusted multipart chunk size"
        );
    }
    Ok(chunksize)
}

/// Splits `size` bytes into consecutive `(start_byte, len)` part ranges.
///
/// The final range carries the remainder. A zero `chunksize` yields a single
/// range covering everything.
pub fn part_ranges(size: u64, chunksize: u64) -> impl Iterator<Item = (u64, u64)> {
    let step = if chunksize == 0 { size.max(1) } else { chunksize };
    (0..size.div_ceil(step)).map(move |i| {
        let start = i * step;
        (start, step.min(size - start))
    })
}
