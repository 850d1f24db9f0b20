//! Console output for bucketcp.
//!
//! Text goes out in the destination's declared encoding; when none is
//! declared it is written as ASCII with unrepresentable characters replaced
//! by `?`. Object bodies streamed to stdout bypass the encoding entirely via
//! [`StdoutBytesWriter`].

mod encoding;
mod writer;

pub use encoding::Encoding;
pub use writer::{ConsoleWriter, StdoutBytesWriter, uni_print};
