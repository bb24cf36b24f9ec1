//! Property-based tests for the correction geometry.

use core_sync::{
    EditorContentSnapshot, Effect, HeaderInset, HostViewportSnapshot, Outcome, SyncOptions,
    SyncState,
};
use proptest::prelude::*;

fn caret_snapshot(top: f64, height: f64, line: f64) -> EditorContentSnapshot {
    EditorContentSnapshot::default()
        .with_caret(top, top + height)
        .with_line_height(line)
        .with_content_height(top + height)
}

proptest! {
    // Caret inside the window never produces a scroll effect.
    #[test]
    fn visible_caret_is_a_no_op(
        offset in 0.0f64..5_000.0,
        visible in 50.0f64..2_000.0,
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
        line in 1.0f64..64.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut s = SyncState::default();
        s.reduce_viewport(HostViewportSnapshot::plain(visible, offset));
        let eval = s.reduce_content(
            EditorContentSnapshot::default()
                .with_caret(offset + lo * visible, offset + hi * visible)
                .with_line_height(line),
        );
        prop_assert_eq!(eval.outcome, Outcome::Visible);
        prop_assert!(eval.effects.is_empty());
    }

    // After a downward correction the caret bottom sits `safety_lines` lines above the new bottom edge.
    #[test]
    fn downward_target_leaves_safety_margin(
        offset in 0.0f64..5_000.0,
        visible in 50.0f64..2_000.0,
        below in 1.0f64..3_000.0,
        caret_h in 0.0f64..40.0,
        line in 1.0f64..64.0,
    ) {
        let mut s = SyncState::default();
        s.reduce_viewport(HostViewportSnapshot::plain(visible, offset));
        let bottom = offset + visible + below;
        let eval = s.reduce_content(caret_snapshot(bottom - caret_h, caret_h, line));
        prop_assert_eq!(eval.outcome, Outcome::Below);
        let target = eval.scroll_target().unwrap();
        let new_bottom = target + visible;
        prop_assert!((new_bottom - bottom - 2.0 * line).abs() < 1e-6);
        prop_assert!(s.was_caret_at_bottom_edge());
    }

    // Upward corrections align the caret top with the new window top exactly.
    #[test]
    fn upward_target_aligns_caret_top(
        offset in 100.0f64..5_000.0,
        visible in 50.0f64..2_000.0,
        above in 1.0f64..100.0,
        header in 0.0f64..50.0,
    ) {
        let mut s = SyncState::default();
        let vp = HostViewportSnapshot::new(visible, header, header, offset);
        s.reduce_viewport(vp);
        let window_top = vp.visible_window(HeaderInset::Visible).top;
        let eval = s.reduce_content(caret_snapshot(window_top - above, 10.0, 20.0));
        prop_assert_eq!(eval.outcome, Outcome::Above);
        let target = eval.scroll_target().unwrap();
        prop_assert!((target - header - (window_top - above)).abs() < 1e-6);
        prop_assert!(!s.was_caret_at_bottom_edge());
    }

    // Re-sending the stored snapshot is always deduplicated, whatever the geometry.
    #[test]
    fn repeated_snapshot_is_deduped(
        offset in 0.0f64..5_000.0,
        caret_top in 0.0f64..10_000.0,
        rev in 0u64..1_000,
        keyboard in any::<bool>(),
    ) {
        let mut s = SyncState::new(SyncOptions::default());
        s.reduce_viewport(HostViewportSnapshot::plain(400.0, offset));
        let snap = caret_snapshot(caret_top, 20.0, 20.0)
            .with_revision(rev)
            .with_keyboard(keyboard);
        s.reduce_content(snap);
        let again = s.reduce_content(snap);
        prop_assert_eq!(again.outcome, Outcome::Deduped);
        prop_assert!(again.effects.is_empty());
    }

    // Keyboard flips always surface exactly one toggle, ahead of any scroll.
    #[test]
    fn keyboard_flip_emits_single_leading_toggle(
        caret_top in 0.0f64..2_000.0,
        offset in 0.0f64..2_000.0,
    ) {
        let mut s = SyncState::default();
        s.reduce_viewport(HostViewportSnapshot::plain(300.0, offset));
        let snap = caret_snapshot(caret_top, 20.0, 20.0);
        s.reduce_content(snap);
        let eval = s.reduce_content(snap.with_keyboard(true));
        let toggles = eval
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::ToggleViewportAlignment(_)))
            .count();
        prop_assert_eq!(toggles, 1);
        prop_assert_eq!(eval.effects[0], Effect::ToggleViewportAlignment(true));
    }
}
