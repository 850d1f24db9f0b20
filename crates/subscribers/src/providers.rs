//! The concrete subscribers attached by the copy commands.

use std::path::Path;

use bucketcp_file_ops::{create_parent_dirs, set_file_utime};
use bucketcp_protocol::{TransferResult, create_warning};
use chrono::{DateTime, Local};
use tokio::sync::mpsc::UnboundedSender;

use crate::SubscriberError;
use crate::dispatch::{OnDoneFiltered, OnQueued};
use crate::future::TransferFuture;

/// Guesses a MIME type from a file or key name.
///
/// Returns `None` for unknown extensions.
pub fn guess_content_type(name: &str) -> Option<String> {
    mime_guess::from_path(name).first_raw().map(str::to_string)
}

// ---------------------------------------------------------------------------
// Queued hooks
// ---------------------------------------------------------------------------

/// Reports a size known up front, overriding whatever was recorded.
#[derive(Debug, Clone, Copy)]
pub struct ProvideSizeSubscriber {
    size: u64,
}

impl ProvideSizeSubscriber {
    pub fn new(size: u64) -> Self {
        Self { size }
    }
}

impl OnQueued for ProvideSizeSubscriber {
    fn on_queued(&self, future: &TransferFuture) -> Result<(), SubscriberError> {
        future.provide_transfer_size(self.size);
        Ok(())
    }
}

/// Sets `ContentType` from the name of the file being uploaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvideUploadContentTypeSubscriber;

impl OnQueued for ProvideUploadContentTypeSubscriber {
    fn on_queued(&self, future: &TransferFuture) -> Result<(), SubscriberError> {
        let guessed = future
            .fileobj()
            .and_then(|path| path.to_str().and_then(guess_content_type));
        provide_content_type(future, guessed);
        Ok(())
    }
}

/// Sets `ContentType` from the key of the object being copied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvideCopyContentTypeSubscriber;

impl OnQueued for ProvideCopyContentTypeSubscriber {
    fn on_queued(&self, future: &TransferFuture) -> Result<(), SubscriberError> {
        let guessed = future
            .copy_source()
            .and_then(|source| guess_content_type(&source.key));
        provide_content_type(future, guessed);
        Ok(())
    }
}

fn provide_content_type(future: &TransferFuture, guessed: Option<String>) {
    match guessed {
        Some(content_type) => {
            tracing::trace!(key = %future.key(), content_type = %content_type, "guessed content type");
            future.set_extra_arg("ContentType", content_type);
        }
        None => tracing::trace!(key = %future.key(), "no content type guessed"),
    }
}

/// Creates the parent directories of a download's destination file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryCreatorSubscriber;

impl OnQueued for DirectoryCreatorSubscriber {
    fn on_queued(&self, future: &TransferFuture) -> Result<(), SubscriberError> {
        let Some(path) = future.fileobj() else {
            return Ok(());
        };
        create_parent_dirs(&path).map_err(|source| SubscriberError::CreateDirectory {
            path: path.parent().unwrap_or(Path::new("")).to_path_buf(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Done hooks
// ---------------------------------------------------------------------------

/// Restores a downloaded file's modification time once the download
/// succeeds.
///
/// Failures never fail the transfer: they are reported as warnings on the
/// result channel.
#[derive(Debug, Clone)]
pub struct ProvideLastModifiedTimeSubscriber {
    last_modified_time: Option<DateTime<Local>>,
    result_tx: UnboundedSender<TransferResult>,
}

impl ProvideLastModifiedTimeSubscriber {
    pub fn new(
        last_modified_time: Option<DateTime<Local>>,
        result_tx: UnboundedSender<TransferResult>,
    ) -> Self {
        Self {
            last_modified_time,
            result_tx,
        }
    }

    fn restore(&self, path: Option<&Path>) -> Result<(), String> {
        let path = path.ok_or("no local file to update")?;
        let time = self
            .last_modified_time
            .ok_or("no last modified time was provided")?;
        set_file_utime(path, time.timestamp()).map_err(|e| e.to_string())
    }
}

impl OnDoneFiltered for ProvideLastModifiedTimeSubscriber {
    fn on_success(&self, future: &TransferFuture) -> Result<(), SubscriberError> {
        let path = future.fileobj();
        if let Err(reason) = self.restore(path.as_deref()) {
            let shown = path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| future.key());
            let message = format!(
                "Successfully downloaded {shown} but was unable to update the \
                 last modified time. {reason}"
            );
            tracing::debug!(path = %shown, reason = %reason, "could not restore mtime");
            if self
                .result_tx
                .send(create_warning(&shown, &message, false))
                .is_err()
            {
                tracing::debug!(path = %shown, "result channel closed, warning dropped");
            }
        }
        Ok(())
    }
}
