//! Scroll synchronization controller.
//!
//! Wraps a [`SyncState`] reducer with an effect sink and a cancellation token.
//! One controller serves one editing surface for its whole lifetime; there is
//! no reset. Restarting association with a new surface means constructing a
//! new controller.

use crate::cancel::CancelToken;
use crate::effects::{Effect, ScrollEffects};
use crate::options::SyncOptions;
use crate::reducer::{Evaluation, Outcome, SyncState};
use core_events::{
    ALIGNMENT_TOGGLES, CONTENT_DEDUPED, CONTENT_UPDATES, DROPPED_AFTER_CANCEL, GROWTH_EMITS,
    SCROLL_EMITS, VIEWPORT_UPDATES, bump,
};
use core_model::{EditorContentSnapshot, HostViewportSnapshot};
use tracing::{debug, trace};

pub struct ScrollSyncController<E> {
    state: SyncState,
    effects: E,
    cancel: CancelToken,
}

impl<E: ScrollEffects> ScrollSyncController<E> {
    pub fn new(effects: E, cancel: CancelToken) -> Self {
        Self::with_options(effects, cancel, SyncOptions::default())
    }

    pub fn with_options(effects: E, cancel: CancelToken, options: SyncOptions) -> Self {
        Self {
            state: SyncState::new(options),
            effects,
            cancel,
        }
    }

    /// Record a host viewport snapshot and re-evaluate against the latest content.
    pub fn on_viewport_changed(&mut self, snapshot: HostViewportSnapshot) {
        if self.dropped("viewport") {
            return;
        }
        bump(&VIEWPORT_UPDATES);
        let eval = self.state.reduce_viewport(snapshot);
        self.dispatch("viewport", eval);
    }

    /// Evaluate a content snapshot unless it is identical to the previous one.
    pub fn on_content_changed(&mut self, snapshot: EditorContentSnapshot) {
        if self.dropped("content") {
            return;
        }
        bump(&CONTENT_UPDATES);
        let eval = self.state.reduce_content(snapshot);
        self.dispatch("content", eval);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn into_effects(self) -> E {
        self.effects
    }

    fn dropped(&self, source: &'static str) -> bool {
        if self.cancel.is_cancelled() {
            bump(&DROPPED_AFTER_CANCEL);
            trace!(target: "sync.controller", source, "event_dropped_after_cancel");
            return true;
        }
        false
    }

    fn dispatch(&mut self, source: &'static str, eval: Evaluation) {
        match eval.outcome {
            Outcome::Deduped => {
                bump(&CONTENT_DEDUPED);
                return;
            }
            Outcome::Growth => bump(&GROWTH_EMITS),
            _ => {}
        }
        if !eval.effects.is_empty() {
            debug!(
                target: "sync.controller",
                source,
                outcome = eval.outcome.as_str(),
                effects = eval.effects.len(),
                "evaluation_emitted"
            );
        }
        for effect in eval.effects {
            match effect {
                Effect::UpdateScroll(_) => bump(&SCROLL_EMITS),
                Effect::ToggleViewportAlignment(_) => bump(&ALIGNMENT_TOGGLES),
            }
            self.effects.apply(effect);
        }
    }
}
