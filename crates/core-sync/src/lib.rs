//! Caret-following scroll synchronization.
//!
//! Keeps the caret of an embedded editing surface visible inside a scrollable
//! host. Two feeds report geometry independently ([`HostViewportSnapshot`] from
//! the host, [`EditorContentSnapshot`] from the editor); the controller holds
//! the latest of each and emits scroll corrections through [`ScrollEffects`].
//!
//! Layering:
//! * [`SyncState`] is the pure reducer: `(state, snapshot) -> (state', effects)`.
//!   No callbacks, no I/O; logging only at TRACE.
//! * [`ScrollSyncController`] owns a reducer, an effect sink and a
//!   [`CancelToken`]. Its two entry points take `&mut self`, so evaluations are
//!   serialized by construction and effects are dispatched in delivery order.
//! * [`spawn_sync_task`] drives a controller from two single-slot mailboxes
//!   (latest value wins) on one Tokio task, for hosts whose feeds fire from
//!   arbitrary threads.
//!
//! Correction rules (window `[top, bottom]`, caret `[c_top, c_bottom]`):
//! * Caret fully inside: nothing emitted; the bottom-edge flag clears.
//! * Caret below: target `offset + (c_bottom - bottom) + safety_lines * line_height`.
//! * Caret above: target `offset - (top - c_top)`, no margin.
//! * Trailing-edge growth: after a downward correction, a content update whose
//!   caret box is unchanged and whose content height grew scrolls by exactly the
//!   height delta.
//!
//! Independently, a flip of `keyboard_visible` between consecutive qualifying
//! content snapshots emits an alignment toggle.

mod cancel;
mod controller;
mod effects;
mod options;
mod reducer;
mod task;

pub use cancel::{CancelSource, CancelToken};
pub use controller::ScrollSyncController;
pub use core_model::{EditorContentSnapshot, HeaderInset, HostViewportSnapshot};
pub use effects::{Effect, Effects, FnEffects, ScrollEffects};
pub use options::SyncOptions;
pub use reducer::{Evaluation, Outcome, SyncState};
pub use task::{ExitReason, SyncFeeds, spawn_sync_task};
