//! Feed event types, change classification and telemetry for caret sync.

use core_model::{EditorContentSnapshot, HostViewportSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Process-wide atomic counters (relaxed fetch_add, no locking). Tests that read them should assert
// on deltas rather than absolute values since other tests in the same binary also bump them.
// -------------------------------------------------------------------------------------------------
pub static VIEWPORT_UPDATES: AtomicU64 = AtomicU64::new(0);
pub static CONTENT_UPDATES: AtomicU64 = AtomicU64::new(0);
pub static CONTENT_DEDUPED: AtomicU64 = AtomicU64::new(0); // structurally identical content snapshots
pub static SCROLL_EMITS: AtomicU64 = AtomicU64::new(0);
pub static GROWTH_EMITS: AtomicU64 = AtomicU64::new(0); // subset of SCROLL_EMITS
pub static ALIGNMENT_TOGGLES: AtomicU64 = AtomicU64::new(0);
pub static DROPPED_AFTER_CANCEL: AtomicU64 = AtomicU64::new(0);
// Mailbox task lifecycle
pub static SYNC_TASK_STARTS: AtomicU64 = AtomicU64::new(0);
pub static SYNC_TASK_STOP_CANCEL: AtomicU64 = AtomicU64::new(0);
pub static SYNC_TASK_STOP_CLOSED: AtomicU64 = AtomicU64::new(0);
pub static SYNC_TASK_STOP_SHUTDOWN: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetrySnapshot {
    pub viewport_updates: u64,
    pub content_updates: u64,
    pub content_deduped: u64,
    pub scroll_emits: u64,
    pub growth_emits: u64,
    pub alignment_toggles: u64,
    pub dropped_after_cancel: u64,
    pub sync_task_starts: u64,
    pub sync_task_stop_cancel: u64,
    pub sync_task_stop_closed: u64,
    pub sync_task_stop_shutdown: u64,
}

pub fn telemetry_snapshot() -> TelemetrySnapshot {
    use Ordering::Relaxed;
    TelemetrySnapshot {
        viewport_updates: VIEWPORT_UPDATES.load(Relaxed),
        content_updates: CONTENT_UPDATES.load(Relaxed),
        content_deduped: CONTENT_DEDUPED.load(Relaxed),
        scroll_emits: SCROLL_EMITS.load(Relaxed),
        growth_emits: GROWTH_EMITS.load(Relaxed),
        alignment_toggles: ALIGNMENT_TOGGLES.load(Relaxed),
        dropped_after_cancel: DROPPED_AFTER_CANCEL.load(Relaxed),
        sync_task_starts: SYNC_TASK_STARTS.load(Relaxed),
        sync_task_stop_cancel: SYNC_TASK_STOP_CANCEL.load(Relaxed),
        sync_task_stop_closed: SYNC_TASK_STOP_CLOSED.load(Relaxed),
        sync_task_stop_shutdown: SYNC_TASK_STOP_SHUTDOWN.load(Relaxed),
    }
}

/// One inbound update from either feed.
///
/// Serialized form is internally tagged so recorded traces read naturally:
/// `{"kind":"content","caret_top_px":150.0,...}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedEvent {
    Viewport(HostViewportSnapshot),
    Content(EditorContentSnapshot),
    /// Editing surface torn down; consumers stop processing.
    Shutdown,
}

impl FeedEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FeedEvent::Viewport(_) => "viewport",
            FeedEvent::Content(_) => "content",
            FeedEvent::Shutdown => "shutdown",
        }
    }
}

bitflags::bitflags! {
    /// Fields that differ between two consecutive content snapshots.
    ///
    /// An empty mask means the snapshots are structurally identical and the
    /// newer one is not a qualifying update.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ContentChange: u8 {
        const HEIGHT      = 0b0000_0001;
        const CARET       = 0b0000_0010;
        const LINE_HEIGHT = 0b0000_0100;
        const REVISION    = 0b0000_1000;
        const KEYBOARD    = 0b0001_0000;
    }
}

impl ContentChange {
    pub fn between(prev: &EditorContentSnapshot, next: &EditorContentSnapshot) -> Self {
        let mut mask = ContentChange::empty();
        mask.set(
            ContentChange::HEIGHT,
            prev.content_height_px != next.content_height_px,
        );
        mask.set(ContentChange::CARET, prev.caret() != next.caret());
        mask.set(
            ContentChange::LINE_HEIGHT,
            prev.line_height_px != next.line_height_px,
        );
        mask.set(
            ContentChange::REVISION,
            prev.content_revision != next.content_revision,
        );
        mask.set(
            ContentChange::KEYBOARD,
            prev.keyboard_visible != next.keyboard_visible,
        );
        mask
    }

    /// A content snapshot qualifies for recomputation when anything changed.
    pub fn is_qualifying(&self) -> bool {
        !self.is_empty()
    }
}

// -------------------------------------------------------------------------------------------------
// Event Hooks
// -------------------------------------------------------------------------------------------------
/// Optional hooks that observe feed events at the evaluation boundary.
///
/// Hooks run on the serialized evaluation path and must not block.
pub trait EventHooks: Send + Sync + 'static {
    fn pre_handle(&self, _event: &FeedEvent) {}
    fn post_handle(&self, _event: &FeedEvent) {}
}

/// Default no-op hooks implementation.
pub struct NoopEventHooks;

impl EventHooks for NoopEventHooks {}
