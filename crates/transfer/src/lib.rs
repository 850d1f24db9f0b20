//! Multipart chunking, part readers and work scheduling for bucketcp.
//!
//! The transfer engine asks [`find_chunksize`] for a part size, reads each
//! part through a [`BoundedFileView`] and pulls its next unit of work from a
//! [`StablePriorityQueue`].

mod chunked;
mod chunksize;
mod config;
mod queue;
mod units;

pub use chunked::{BoundedFileView, NonSeekableStream};
pub use chunksize::{
    MAX_PARTS, MAX_SINGLE_UPLOAD_SIZE, MAX_UPLOAD_SIZE, MIN_UPLOAD_CHUNKSIZE, find_chunksize,
    part_ranges,
};
pub use config::TransferConfig;
pub use queue::{Blocking, HasPriority, LOWEST_PRIORITY, QueueFull, StablePriorityQueue, Unprioritized};
pub use units::{human_readable_size, parse_human_readable_size};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file size of {size} bytes exceeds the maximum upload size of {max} bytes")]
    InvalidSize { size: u64, max: u64 },

    #[error("invalid size value: {0}")]
    InvalidSizeValue(String),

    #[error("invalid transfer config: {0}")]
    Config(#[from] serde_json::Error),
}
