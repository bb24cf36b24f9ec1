//! Cooperative cancellation tied to the lifetime of one editing surface.
//!
//! [`CancelSource`] is held by whoever owns the surface; each controller and
//! mailbox task receives a [`CancelToken`]. Cancelling stops processing of
//! further events but never undoes effects already emitted. Dropping the
//! source does not cancel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Control handle that triggers cancellation.
#[derive(Debug, Default)]
pub struct CancelSource {
    inner: Arc<CancelInner>,
}

/// Cloneable observer of a [`CancelSource`].
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Idempotent.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            tracing::debug!(target: "sync.cancel", "cancel_requested");
        }
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

impl CancelToken {
    /// Token whose source is dropped immediately; it can never be cancelled.
    pub fn never() -> Self {
        CancelSource::new().token()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel cannot slip between.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
