//! Directory preparation and path display for downloads.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Creates every missing parent directory of `path`.
///
/// A directory that already exists (including one created concurrently by
/// another transfer) is not an error. Directories created before a failure
/// are left in place.
pub fn create_parent_dirs(path: &Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    match std::fs::create_dir_all(parent) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(path = %parent.display(), "directory already exists");
            Ok(())
        }
        result => result,
    }
}

/// Returns `filename` relative to `start`, always prefixed with the
/// relative directory (`./bar`, `../foo/bar`).
///
/// When no relative form exists (different drives on Windows) the absolute
/// path is returned instead.
pub fn relative_path(filename: &Path, start: &Path) -> PathBuf {
    let (Ok(abs_file), Ok(abs_start)) = (std::path::absolute(filename), std::path::absolute(start))
    else {
        return filename.to_path_buf();
    };
    let abs_file = normalize(&abs_file);
    let abs_start = normalize(&abs_start);

    let Some(base) = abs_file.file_name().map(|b| b.to_os_string()) else {
        return abs_file;
    };
    let Some(dir) = abs_file.parent() else {
        return abs_file.clone();
    };

    let dir: Vec<Component<'_>> = dir.components().collect();
    let start: Vec<Component<'_>> = abs_start.components().collect();
    if dir.first() != start.first() {
        return abs_file.clone();
    }

    let common = dir
        .iter()
        .zip(&start)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..start.len() {
        relative.push("..");
    }
    for component in &dir[common..] {
        relative.push(component);
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative.join(base)
}

/// Lexically resolves `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
