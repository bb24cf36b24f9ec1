//! Mailbox task: serializes both feeds onto one evaluator.
//!
//! Each feed is a single-slot mailbox (`tokio::sync::watch`): pushing never
//! blocks and a newer snapshot overwrites one not yet evaluated, so only the
//! newest geometry is ever processed. One Tokio task drains both mailboxes and
//! drives the controller, so evaluations never overlap and effects leave in
//! the order the task observed the snapshots.
//!
//! Select order is biased: cancellation, then shutdown, then the viewport
//! mailbox, then the content mailbox. When both mailboxes hold a fresh value
//! the viewport is applied first so the content evaluation sees it.
//!
//! A viewport evaluation is followed immediately by any content snapshot
//! waiting in its mailbox, so content is never held back by a busy viewport
//! feed.
//!
//! The task exits when its cancel token fires, when `FeedEvent::Shutdown` is
//! pushed, or when every `SyncFeeds` clone has been dropped. Cancellation
//! stops at once. Shutdown and feed closure first evaluate any value still
//! pending, so snapshots pushed before them are never lost.

use crate::controller::ScrollSyncController;
use crate::effects::ScrollEffects;
use core_events::{
    EventHooks, FeedEvent, SYNC_TASK_STARTS, SYNC_TASK_STOP_CANCEL, SYNC_TASK_STOP_CLOSED,
    SYNC_TASK_STOP_SHUTDOWN, bump,
};
use core_model::{EditorContentSnapshot, HostViewportSnapshot};
use std::sync::Arc;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, info, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    Cancelled,
    Shutdown,
    FeedsClosed,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Cancelled => "cancelled",
            ExitReason::Shutdown => "shutdown",
            ExitReason::FeedsClosed => "feeds_closed",
        }
    }
}

struct FeedsInner {
    viewport: watch::Sender<Option<HostViewportSnapshot>>,
    content: watch::Sender<Option<EditorContentSnapshot>>,
    shutdown: Arc<Notify>,
}

/// Producer side of the two mailboxes. Cheap to clone; callable from any thread.
#[derive(Clone)]
pub struct SyncFeeds {
    inner: Arc<FeedsInner>,
}

impl SyncFeeds {
    pub fn push_viewport(&self, snapshot: HostViewportSnapshot) {
        self.inner.viewport.send_replace(Some(snapshot));
    }

    pub fn push_content(&self, snapshot: EditorContentSnapshot) {
        self.inner.content.send_replace(Some(snapshot));
    }

    pub fn push(&self, event: FeedEvent) {
        match event {
            FeedEvent::Viewport(s) => self.push_viewport(s),
            FeedEvent::Content(s) => self.push_content(s),
            FeedEvent::Shutdown => self.inner.shutdown.notify_one(),
        }
    }
}

/// Spawn the evaluator task on the current Tokio runtime.
pub fn spawn_sync_task<E>(
    controller: ScrollSyncController<E>,
    hooks: Arc<dyn EventHooks>,
) -> (JoinHandle<ExitReason>, SyncFeeds)
where
    E: ScrollEffects + Send + 'static,
{
    let (viewport_tx, viewport_rx) = watch::channel(None);
    let (content_tx, content_rx) = watch::channel(None);
    let shutdown = Arc::new(Notify::new());
    let feeds = SyncFeeds {
        inner: Arc::new(FeedsInner {
            viewport: viewport_tx,
            content: content_tx,
            shutdown: shutdown.clone(),
        }),
    };
    let task = SyncTask {
        controller,
        viewport_rx,
        content_rx,
        shutdown,
        hooks,
    };
    let span = tracing::debug_span!(target: "sync.task", "sync_task");
    let handle = tokio::spawn(task.run().instrument(span));
    (handle, feeds)
}

struct SyncTask<E> {
    controller: ScrollSyncController<E>,
    viewport_rx: watch::Receiver<Option<HostViewportSnapshot>>,
    content_rx: watch::Receiver<Option<EditorContentSnapshot>>,
    shutdown: Arc<Notify>,
    hooks: Arc<dyn EventHooks>,
}

impl<E: ScrollEffects> SyncTask<E> {
    async fn run(mut self) -> ExitReason {
        info!(target: "sync.task", "sync_task_started");
        bump(&SYNC_TASK_STARTS);
        let cancel = self.controller.cancel_token();
        let mut viewport_open = true;
        let mut content_open = true;

        let reason = loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break ExitReason::Cancelled,
                _ = self.shutdown.notified() => {
                    self.drain_pending();
                    break ExitReason::Shutdown;
                }
                changed = self.viewport_rx.changed(), if viewport_open => match changed {
                    Ok(()) => {
                        let snapshot = *self.viewport_rx.borrow_and_update();
                        snapshot.map(FeedEvent::Viewport)
                    }
                    Err(_) => {
                        trace!(target: "sync.task", "viewport_feed_closed");
                        viewport_open = false;
                        None
                    }
                },
                changed = self.content_rx.changed(), if content_open => match changed {
                    Ok(()) => {
                        let snapshot = *self.content_rx.borrow_and_update();
                        snapshot.map(FeedEvent::Content)
                    }
                    Err(_) => {
                        trace!(target: "sync.task", "content_feed_closed");
                        content_open = false;
                        None
                    }
                },
            };

            if let Some(event) = event {
                let was_viewport = matches!(event, FeedEvent::Viewport(_));
                self.handle(event);
                // Content waiting behind a viewport is evaluated in the same pass so a
                // steady viewport stream cannot starve it.
                if was_viewport && let Some(content) = take_fresh(&mut self.content_rx) {
                    self.handle(FeedEvent::Content(content));
                }
            }
            if !viewport_open && !content_open {
                break ExitReason::FeedsClosed;
            }
        };

        match reason {
            ExitReason::Cancelled => bump(&SYNC_TASK_STOP_CANCEL),
            ExitReason::Shutdown => bump(&SYNC_TASK_STOP_SHUTDOWN),
            ExitReason::FeedsClosed => bump(&SYNC_TASK_STOP_CLOSED),
        }
        info!(target: "sync.task", reason = reason.as_str(), "sync_task_stopped");
        reason
    }

    /// Evaluate whatever both mailboxes still hold, viewport first.
    fn drain_pending(&mut self) {
        if let Some(viewport) = take_fresh(&mut self.viewport_rx) {
            self.handle(FeedEvent::Viewport(viewport));
        }
        if let Some(content) = take_fresh(&mut self.content_rx) {
            self.handle(FeedEvent::Content(content));
        }
    }

    fn handle(&mut self, event: FeedEvent) {
        self.hooks.pre_handle(&event);
        match event {
            FeedEvent::Viewport(s) => self.controller.on_viewport_changed(s),
            FeedEvent::Content(s) => self.controller.on_content_changed(s),
            FeedEvent::Shutdown => {}
        }
        self.hooks.post_handle(&event);
    }
}

/// Newest value not yet evaluated, marking it seen. Works on closed channels too.
fn take_fresh<T: Copy>(rx: &mut watch::Receiver<Option<T>>) -> Option<T> {
    let slot = rx.borrow_and_update();
    if slot.has_changed() {
        *slot
    } else {
        None
    }
}
