//! File size and modification time, read and written.

#[cfg(not(unix))]
use std::fs::{File, FileTimes, OpenOptions};
use std::io;
use std::path::Path;
#[cfg(not(unix))]
use std::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, TimeZone};

use crate::FileOpsError;

/// Size and modification time of a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    /// `None` when the timestamp cannot be represented in local time.
    pub modified: Option<DateTime<Local>>,
}

/// Stats `path`.
///
/// Fails with [`FileOpsError::Stat`] naming the path when the file cannot be
/// stat'ed. An out-of-range timestamp yields `modified: None` instead of an
/// error.
pub fn get_file_stat(path: &Path) -> Result<FileStat, FileOpsError> {
    let metadata = std::fs::metadata(path).map_err(|source| FileOpsError::Stat {
        path: path.to_path_buf(),
        source,
    })?;

    let modified = metadata.modified().ok().and_then(system_time_to_local);
    if modified.is_none() {
        tracing::debug!(path = %path.display(), "modification time out of range");
    }

    Ok(FileStat {
        size: metadata.len(),
        modified,
    })
}

/// Converts seconds and nanoseconds since the Unix epoch to local time.
///
/// Returns `None` when the instant is out of range.
pub fn local_time_from_epoch(secs: i64, nanos: u32) -> Option<DateTime<Local>> {
    Local.timestamp_opt(secs, nanos).single()
}

fn system_time_to_local(time: SystemTime) -> Option<DateTime<Local>> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => {
            local_time_from_epoch(i64::try_from(after.as_secs()).ok()?, after.subsec_nanos())
        }
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => local_time_from_epoch(-secs, 0),
                nanos => local_time_from_epoch(-secs - 1, 1_000_000_000 - nanos),
            }
        }
    }
}

/// Sets the access and modification times of `path` to `modified_epoch`
/// (seconds since the Unix epoch).
///
/// The times are set on the path itself, so the file does not need to be
/// readable. Permission failures become [`FileOpsError::SetFileUtime`];
/// every other OS error is returned as [`FileOpsError::Io`] untouched.
pub fn set_file_utime(path: &Path, modified_epoch: i64) -> Result<(), FileOpsError> {
    if modified_epoch.unsigned_abs() >= MAX_UTIME_SECONDS {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("timestamp {modified_epoch} out of range"),
        )
        .into());
    }

    set_path_times(path, modified_epoch).map_err(|e| translate_utime_error(path, e))?;

    tracing::trace!(path = %path.display(), modified_epoch, "set file utime");
    Ok(())
}

// Largest magnitude representable in microseconds.
const MAX_UTIME_SECONDS: u64 = (i64::MAX / 1_000_000) as u64;

#[cfg(unix)]
fn set_path_times(path: &Path, epoch: i64) -> io::Result<()> {
    use nix::sys::time::TimeVal;

    let secs: nix::libc::time_t = epoch
        .try_into()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "timestamp out of range"))?;
    let time = TimeVal::new(secs, 0);
    nix::sys::stat::utimes(path, &time, &time).map_err(io::Error::from)
}

#[cfg(not(unix))]
fn set_path_times(path: &Path, epoch: i64) -> io::Result<()> {
    let offset = Duration::from_secs(epoch.unsigned_abs());
    let time = if epoch >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    }
    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "timestamp out of range"))?;

    let times = FileTimes::new().set_accessed(time).set_modified(time);
    open_for_times(path)?.set_times(times)
}

// Attribute-only access works on read-only files too.
#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    OpenOptions::new().access_mode(FILE_WRITE_ATTRIBUTES).open(path)
}

#[cfg(not(any(unix, windows)))]
fn open_for_times(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).open(path)
}

fn translate_utime_error(path: &Path, err: io::Error) -> FileOpsError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        FileOpsError::SetFileUtime {
            path: path.to_path_buf(),
            source: err,
        }
    } else {
        FileOpsError::Io(err)
    }
}
