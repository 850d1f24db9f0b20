//! Local filesystem operations for transfers.
//!
//! Provides stat and utime helpers with typed failures, parent-directory
//! creation for downloads, and relative path display.

mod dirs;
mod stat;

use std::path::PathBuf;

pub use dirs::{create_parent_dirs, relative_path};
pub use stat::{FileStat, get_file_stat, local_time_from_epoch, set_file_utime};

/// Errors produced by file operations.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not retrieve file stat of \"{}\": {source}", path.display())]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "the file was downloaded, but attempting to modify the utime of \"{}\" failed; \
         is the file owned by another user? ({source})",
        path.display()
    )]
    SetFileUtime {
        path: PathBuf,
        source: std::io::Error,
    },
}
