use std::io::{self, IsTerminal, Write};

use crate::encoding::Encoding;

/// Writes `text` to `out` in `encoding`, or as ASCII with `?` replacements
/// when no encoding is declared, then flushes.
pub fn uni_print<W: Write + ?Sized>(
    text: &str,
    out: &mut W,
    encoding: Option<Encoding>,
) -> io::Result<()> {
    let encoding = encoding.unwrap_or(Encoding::Ascii);
    out.write_all(&encoding.encode_lossy(text))?;
    out.flush()
}

/// A text stream with an optional declared encoding.
#[derive(Debug)]
pub struct ConsoleWriter<W> {
    out: W,
    encoding: Option<Encoding>,
}

impl<W: Write> ConsoleWriter<W> {
    pub fn new(out: W, encoding: Option<Encoding>) -> Self {
        Self { out, encoding }
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    /// Prints `text` as is.
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        uni_print(text, &mut self.out, self.encoding)
    }

    /// Prints `text` followed by a newline.
    pub fn println(&mut self, text: &str) -> io::Result<()> {
        self.print(&format!("{text}\n"))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleWriter<io::Stdout> {
    /// Standard output. A terminal is assumed to take UTF-8; a pipe or file
    /// gets the locale's encoding, if it names one.
    pub fn stdout() -> Self {
        let out = io::stdout();
        let encoding = console_encoding(out.is_terminal());
        tracing::trace!(?encoding, "stdout encoding");
        Self::new(out, encoding)
    }
}

impl ConsoleWriter<io::Stderr> {
    /// Standard error, with the same encoding rules as [`ConsoleWriter::stdout`].
    pub fn stderr() -> Self {
        let out = io::stderr();
        let encoding = console_encoding(out.is_terminal());
        Self::new(out, encoding)
    }
}

fn console_encoding(is_terminal: bool) -> Option<Encoding> {
    if is_terminal {
        Some(Encoding::Utf8)
    } else {
        Encoding::from_locale()
    }
}

/// Passes raw bytes straight to the underlying stream.
///
/// Used when an object is downloaded to `-`.
#[derive(Debug)]
pub struct StdoutBytesWriter<W = io::Stdout> {
    out: W,
}

impl StdoutBytesWriter {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> StdoutBytesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Write for StdoutBytesWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.out.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
