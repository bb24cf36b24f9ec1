//! Pure correction reducer.
//!
//! `SyncState` remembers the latest snapshot from each feed plus one derived
//! flag, `was_caret_at_bottom_edge`, set by a downward correction and consumed
//! by trailing-edge growth tracking. Each `reduce_*` call is one evaluation:
//! it updates the stored snapshots and returns the effects to emit, in order.
//!
//! Invariants:
//! * A content snapshot structurally equal to the stored one is dropped
//!   without touching state (`Outcome::Deduped`).
//! * Stored snapshots always reflect the last evaluated input, whether or not
//!   a correction fired.
//! * An alignment toggle, when present, precedes the scroll correction.
//! * Viewport updates never take the growth path.

use crate::effects::{Effect, Effects};
use crate::options::SyncOptions;
use core_events::ContentChange;
use core_model::{CaretBox, EditorContentSnapshot, HostViewportSnapshot};
use tracing::trace;

/// Why an evaluation produced (or did not produce) a scroll correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Content snapshot identical to the stored one; nothing evaluated.
    Deduped,
    /// Content recorded but no viewport has been reported yet.
    AwaitingViewport,
    /// Viewport recorded but no content has been reported yet.
    AwaitingContent,
    /// Caret already fully visible.
    Visible,
    /// Caret overflowed the bottom edge; scrolled down with safety margin.
    Below,
    /// Caret overflowed the top edge; scrolled up to align its top edge.
    Above,
    /// Trailing-edge growth: scrolled by the content height delta.
    Growth,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Deduped => "deduped",
            Outcome::AwaitingViewport => "awaiting_viewport",
            Outcome::AwaitingContent => "awaiting_content",
            Outcome::Visible => "visible",
            Outcome::Below => "below",
            Outcome::Above => "above",
            Outcome::Growth => "growth",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub effects: Effects,
}

impl Evaluation {
    fn new(outcome: Outcome, effects: Effects) -> Self {
        Self { outcome, effects }
    }

    /// Target offset of the scroll correction, if one was emitted.
    pub fn scroll_target(&self) -> Option<f64> {
        self.effects.iter().find_map(|e| match e {
            Effect::UpdateScroll(t) => Some(*t),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncState {
    options: SyncOptions,
    last_viewport: Option<HostViewportSnapshot>,
    last_content: Option<EditorContentSnapshot>,
    was_caret_at_bottom_edge: bool,
}

impl SyncState {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn last_viewport(&self) -> Option<&HostViewportSnapshot> {
        self.last_viewport.as_ref()
    }

    pub fn last_content(&self) -> Option<&EditorContentSnapshot> {
        self.last_content.as_ref()
    }

    pub fn was_caret_at_bottom_edge(&self) -> bool {
        self.was_caret_at_bottom_edge
    }

    /// Record a viewport snapshot and re-evaluate against the stored content.
    pub fn reduce_viewport(&mut self, next: HostViewportSnapshot) -> Evaluation {
        self.last_viewport = Some(next);
        let Some(content) = self.last_content else {
            return Evaluation::new(Outcome::AwaitingContent, Effects::new());
        };
        let mut effects = Effects::new();
        let outcome = self.correct(&next, &content, &mut effects);
        Evaluation::new(outcome, effects)
    }

    /// Record a qualifying content snapshot and evaluate it against the stored viewport.
    pub fn reduce_content(&mut self, next: EditorContentSnapshot) -> Evaluation {
        let prev = self.last_content;
        let mut effects = Effects::new();

        if let Some(prev) = prev {
            let change = ContentChange::between(&prev, &next);
            if !change.is_qualifying() {
                trace!(target: "sync.reducer", revision = next.content_revision, "content_deduped");
                return Evaluation::new(Outcome::Deduped, effects);
            }
            trace!(target: "sync.reducer", change = ?change, "content_changed");
            if change.contains(ContentChange::KEYBOARD) {
                effects.push(Effect::ToggleViewportAlignment(next.keyboard_visible));
            }
        }
        self.last_content = Some(next);

        let Some(viewport) = self.last_viewport else {
            return Evaluation::new(Outcome::AwaitingViewport, effects);
        };

        let window = viewport.visible_window(self.options.header_inset);
        let caret = next.caret();
        if !window.contains(caret)
            && let Some(prev) = prev
            && self.tracks_growth(&prev, caret, &next)
        {
            let size_delta = next.content_height_px - prev.content_height_px;
            let target = viewport.scroll_offset_px + size_delta;
            trace!(target: "sync.reducer", size_delta, target, "growth_follow");
            effects.push(Effect::UpdateScroll(target));
            return Evaluation::new(Outcome::Growth, effects);
        }

        let outcome = self.correct(&viewport, &next, &mut effects);
        Evaluation::new(outcome, effects)
    }

    /// Caret pinned at the trailing edge while content grew beneath it.
    fn tracks_growth(
        &self,
        prev: &EditorContentSnapshot,
        caret: CaretBox,
        next: &EditorContentSnapshot,
    ) -> bool {
        self.options.growth_tracking
            && self.was_caret_at_bottom_edge
            && prev.caret() == caret
            && next.content_height_px > prev.content_height_px
    }

    /// Generic geometry correction shared by both feeds.
    fn correct(
        &mut self,
        viewport: &HostViewportSnapshot,
        content: &EditorContentSnapshot,
        effects: &mut Effects,
    ) -> Outcome {
        let window = viewport.visible_window(self.options.header_inset);
        let caret = content.caret();

        if let Some(overflow) = window.overflow_below(caret) {
            let safety_distance = content.line_height_px * self.options.safety_lines;
            let target = viewport.scroll_offset_px + overflow + safety_distance;
            trace!(target: "sync.reducer", overflow, safety_distance, target, "correct_down");
            effects.push(Effect::UpdateScroll(target));
            self.was_caret_at_bottom_edge = true;
            Outcome::Below
        } else if let Some(overflow) = window.overflow_above(caret) {
            let target = viewport.scroll_offset_px - overflow;
            trace!(target: "sync.reducer", overflow, target, "correct_up");
            effects.push(Effect::UpdateScroll(target));
            self.was_caret_at_bottom_edge = false;
            Outcome::Above
        } else {
            self.was_caret_at_bottom_edge = false;
            Outcome::Visible
        }
    }
}
