//! Result records reported back to the user once a transfer unit settles.

use serde::{Deserialize, Serialize};

/// A message queued for user-facing reporting.
///
/// Warnings are informational: they never abort the transfer that produced
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub message: String,
    pub error: bool,
    pub warning: bool,
}

impl TransferResult {
    /// Creates a non-fatal warning record.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: false,
            warning: true,
        }
    }

    /// Creates an error record.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: true,
            warning: false,
        }
    }
}

/// Builds the warning reported for `path`.
///
/// With `skip_file` the message also states that the file was skipped.
pub fn create_warning(path: &str, error_message: &str, skip_file: bool) -> TransferResult {
    let message = if skip_file {
        format!("warning: Skipping file {path}. {error_message}")
    } else {
        format!("warning: {error_message}")
    };
    TransferResult::warning(message)
}
