//! Trace replay.
//!
//! A trace is JSON lines, one `FeedEvent` per line:
//!
//! ```text
//! # host reports its window first
//! {"kind":"viewport","visible_height_px":100.0,"scroll_offset_px":0.0}
//! {"kind":"content","caret_top_px":150.0,"caret_bottom_px":170.0,"line_height_px":20.0}
//! {"kind":"shutdown"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Omitted snapshot fields
//! default to zero / false. Events are fed to one controller in order; every
//! effect is written as one JSON object per line as soon as it is emitted.
//! A `shutdown` event cancels the controller, so later events are dropped.
//!
//! [`replay_mailbox`] feeds the same trace through the mailbox task instead.
//! Pending snapshots coalesce there, so a burst of updates the task has not
//! yet drained produces only the newest snapshot's effects. Snapshots pushed
//! before a `shutdown` are still evaluated before the task stops.

use core_events::{FeedEvent, NoopEventHooks};
use core_sync::{
    CancelSource, CancelToken, Effect, FnEffects, ScrollSyncController, SyncOptions,
    spawn_sync_task,
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("line {line}: invalid feed event: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding effect: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("writing effect output: {0}")]
    Output(#[from] std::io::Error),
    #[error("sync task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Wire shape of one emitted effect.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "effect", rename_all = "snake_case")]
enum EffectRecord {
    UpdateScroll { target_offset_px: f64 },
    ToggleViewportAlignment { keyboard_visible: bool },
}

impl From<Effect> for EffectRecord {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::UpdateScroll(target_offset_px) => EffectRecord::UpdateScroll { target_offset_px },
            Effect::ToggleViewportAlignment(keyboard_visible) => {
                EffectRecord::ToggleViewportAlignment { keyboard_visible }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub effects: usize,
    /// Events that arrived after a `shutdown` and were ignored.
    pub dropped: usize,
}

pub fn parse_trace(input: &str) -> Result<Vec<FeedEvent>, ReplayError> {
    let mut events = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str::<FeedEvent>(line).map_err(|source| {
            ReplayError::Parse {
                line: idx + 1,
                source,
            }
        })?;
        events.push(event);
    }
    Ok(events)
}

pub fn replay<W: Write>(
    events: &[FeedEvent],
    options: SyncOptions,
    out: &mut W,
) -> Result<ReplaySummary, ReplayError> {
    let cancel = CancelSource::new();
    let mut controller =
        ScrollSyncController::with_options(Vec::<Effect>::new(), cancel.token(), options);
    let mut summary = ReplaySummary::default();
    let mut written = 0;

    for event in events {
        summary.events += 1;
        if controller.is_cancelled() {
            summary.dropped += 1;
        }
        match *event {
            FeedEvent::Viewport(s) => controller.on_viewport_changed(s),
            FeedEvent::Content(s) => controller.on_content_changed(s),
            FeedEvent::Shutdown => {
                if cancel.is_cancelled() {
                    warn!(target: "replay", index = summary.events, "duplicate_shutdown");
                }
                cancel.cancel();
            }
        }
        for effect in &controller.effects()[written..] {
            write_effect(out, *effect)?;
        }
        written = controller.effects().len();
    }
    out.flush()?;
    summary.effects = written;
    Ok(summary)
}

pub async fn replay_mailbox<W: Write>(
    events: &[FeedEvent],
    options: SyncOptions,
    out: &mut W,
) -> Result<ReplaySummary, ReplayError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let scroll_tx = tx.clone();
    let sink = FnEffects::new(
        move |target| {
            let _ = scroll_tx.send(Effect::UpdateScroll(target));
        },
        move |keyboard_visible| {
            let _ = tx.send(Effect::ToggleViewportAlignment(keyboard_visible));
        },
    );
    let controller = ScrollSyncController::with_options(sink, CancelToken::never(), options);
    let (handle, feeds) = spawn_sync_task(controller, Arc::new(NoopEventHooks));

    let mut summary = ReplaySummary::default();
    let mut shut_down = false;
    for event in events {
        summary.events += 1;
        if shut_down {
            summary.dropped += 1;
            continue;
        }
        feeds.push(*event);
        shut_down = matches!(event, FeedEvent::Shutdown);
        tokio::task::yield_now().await;
    }
    drop(feeds);

    let reason = handle.await?;
    info!(target: "replay", reason = reason.as_str(), "mailbox_task_exited");
    // The sink (and both senders) dropped with the task, so this drains and ends.
    while let Some(effect) = rx.recv().await {
        write_effect(out, effect)?;
        summary.effects += 1;
    }
    out.flush()?;
    Ok(summary)
}

fn write_effect<W: Write>(out: &mut W, effect: Effect) -> Result<(), ReplayError> {
    let record = EffectRecord::from(effect);
    serde_json::to_writer(&mut *out, &record).map_err(ReplayError::Encode)?;
    out.write_all(b"\n")?;
    debug!(target: "replay", ?record, "effect_written");
    Ok(())
}
