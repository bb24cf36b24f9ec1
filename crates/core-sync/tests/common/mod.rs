#![allow(dead_code)]

use core_sync::{
    CancelToken, EditorContentSnapshot, Effect, HostViewportSnapshot, ScrollSyncController,
};

pub fn controller() -> ScrollSyncController<Vec<Effect>> {
    ScrollSyncController::new(Vec::new(), CancelToken::never())
}

pub fn viewport(visible_height: f64, scroll_offset: f64) -> HostViewportSnapshot {
    HostViewportSnapshot::plain(visible_height, scroll_offset)
}

pub fn content(caret_top: f64, caret_bottom: f64, line_height: f64) -> EditorContentSnapshot {
    EditorContentSnapshot::default()
        .with_caret(caret_top, caret_bottom)
        .with_line_height(line_height)
        .with_content_height(caret_bottom.max(200.0))
        .with_revision(1)
}

pub fn scroll_targets(effects: &[Effect]) -> Vec<f64> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::UpdateScroll(t) => Some(*t),
            _ => None,
        })
        .collect()
}
