//! Transfer lifecycle hooks for bucketcp.
//!
//! A transfer unit is modelled by [`TransferFuture`]. Independent behaviors
//! attach to it through the [`OnQueued`] and [`OnDone`] capabilities and are
//! driven by a [`SubscriberSet`], which fires each hook at most once per unit.

mod dispatch;
mod future;
mod providers;

use std::path::PathBuf;

pub use dispatch::{OnDone, OnDoneFiltered, OnQueued, Subscriber, SubscriberSet};
pub use future::{CallArgs, CancelledError, TransferException, TransferFuture};
pub use providers::{
    DirectoryCreatorSubscriber, ProvideCopyContentTypeSubscriber,
    ProvideLastModifiedTimeSubscriber, ProvideSizeSubscriber, ProvideUploadContentTypeSubscriber,
    guess_content_type,
};

/// Errors raised by subscriber hooks.
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("could not create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("subscriber hook failed: {0}")]
    Hook(#[source] Box<dyn std::error::Error + Send + Sync>),
}
