use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use bucketcp_protocol::{CopySource, RequestParams};
use tokio_util::sync::CancellationToken;

/// The failure a transfer unit settled with.
pub type TransferException = Arc<dyn std::error::Error + Send + Sync>;

/// Outcome recorded for a unit cancelled before it produced its own error.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("transfer was cancelled")]
pub struct CancelledError;

/// Arguments the transfer unit was submitted with.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    /// Local file read from (upload) or written to (download).
    pub fileobj: Option<PathBuf>,
    pub bucket: String,
    pub key: String,
    pub copy_source: Option<CopySource>,
    /// Request parameters hooks may add to before the first request.
    pub extra_args: RequestParams,
}

/// A single transfer unit as seen by its subscribers (thread-safe).
pub struct TransferFuture {
    inner: RwLock<FutureInner>,
    cancel: CancellationToken,
}

struct FutureInner {
    call_args: CallArgs,
    size: Option<u64>,
    exception: Option<TransferException>,
    queued_fired: bool,
    done_fired: bool,
}

impl TransferFuture {
    pub fn new(call_args: CallArgs) -> Self {
        Self::with_cancellation(call_args, CancellationToken::new())
    }

    /// Creates a future that is cancelled together with `token`.
    ///
    /// Pass a child token to cancel a whole batch of units at once.
    pub fn with_cancellation(call_args: CallArgs, token: CancellationToken) -> Self {
        Self {
            inner: RwLock::new(FutureInner {
                call_args,
                size: None,
                exception: None,
                queued_fired: false,
                done_fired: false,
            }),
            cancel: token,
        }
    }

    pub fn call_args(&self) -> CallArgs {
        self.inner.read().unwrap().call_args.clone()
    }

    pub fn key(&self) -> String {
        self.inner.read().unwrap().call_args.key.clone()
    }

    pub fn fileobj(&self) -> Option<PathBuf> {
        self.inner.read().unwrap().call_args.fileobj.clone()
    }

    pub fn copy_source(&self) -> Option<CopySource> {
        self.inner.read().unwrap().call_args.copy_source.clone()
    }

    pub fn extra_args(&self) -> RequestParams {
        self.inner.read().unwrap().call_args.extra_args.clone()
    }

    /// Sets one request parameter, replacing any previous value.
    pub fn set_extra_arg(&self, name: &str, value: impl Into<String>) {
        let mut s = self.inner.write().unwrap();
        s.call_args.extra_args.insert(name.to_string(), value.into());
    }

    /// Records the total transfer size, overriding any earlier value.
    pub fn provide_transfer_size(&self, size: u64) {
        self.inner.write().unwrap().size = Some(size);
    }

    pub fn size(&self) -> Option<u64> {
        self.inner.read().unwrap().size
    }

    /// Records the failure the unit settled with.
    pub fn set_exception(&self, exception: TransferException) {
        self.inner.write().unwrap().exception = Some(exception);
    }

    /// Returns the unit's failure, or [`CancelledError`] when it was
    /// cancelled without one. `None` means the unit succeeded.
    pub fn exception(&self) -> Option<TransferException> {
        let s = self.inner.read().unwrap();
        match &s.exception {
            Some(e) => Some(Arc::clone(e)),
            None if self.cancel.is_cancelled() => Some(Arc::new(CancelledError)),
            None => None,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Claims the queued hook. Returns `false` if it already fired.
    pub(crate) fn claim_queued(&self) -> bool {
        let mut s = self.inner.write().unwrap();
        !std::mem::replace(&mut s.queued_fired, true)
    }

    /// Claims the done hook. Returns `false` if it already fired.
    pub(crate) fn claim_done(&self) -> bool {
        let mut s = self.inner.write().unwrap();
        !std::mem::replace(&mut s.done_fired, true)
    }
}

impl std::fmt::Debug for TransferFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.inner.read().unwrap();
        f.debug_struct("TransferFuture")
            .field("call_args", &s.call_args)
            .field("size", &s.size)
            .field("failed", &s.exception.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
