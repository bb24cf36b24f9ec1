//! Outbound effect seam.
//!
//! The controller never touches the host directly; it hands every decision to a
//! [`ScrollEffects`] sink. Hosts typically wire two closures via [`FnEffects`];
//! tests and the replay tool record into a `Vec<Effect>`.

use smallvec::SmallVec;

/// One outbound command for the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Set the host scroll position to this absolute offset.
    UpdateScroll(f64),
    /// Switch the host alignment mode for the given keyboard state.
    ToggleViewportAlignment(bool),
}

/// Effects of a single evaluation: at most one toggle plus one scroll.
pub type Effects = SmallVec<[Effect; 2]>;

pub trait ScrollEffects {
    fn on_update_scroll(&mut self, target_offset_px: f64);
    fn on_toggle_viewport_alignment(&mut self, keyboard_visible: bool);

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::UpdateScroll(target) => self.on_update_scroll(target),
            Effect::ToggleViewportAlignment(visible) => self.on_toggle_viewport_alignment(visible),
        }
    }
}

impl<T: ScrollEffects + ?Sized> ScrollEffects for &mut T {
    fn on_update_scroll(&mut self, target_offset_px: f64) {
        (**self).on_update_scroll(target_offset_px)
    }
    fn on_toggle_viewport_alignment(&mut self, keyboard_visible: bool) {
        (**self).on_toggle_viewport_alignment(keyboard_visible)
    }
}

impl<T: ScrollEffects + ?Sized> ScrollEffects for Box<T> {
    fn on_update_scroll(&mut self, target_offset_px: f64) {
        (**self).on_update_scroll(target_offset_px)
    }
    fn on_toggle_viewport_alignment(&mut self, keyboard_visible: bool) {
        (**self).on_toggle_viewport_alignment(keyboard_visible)
    }
}

/// Recorder sink.
impl ScrollEffects for Vec<Effect> {
    fn on_update_scroll(&mut self, target_offset_px: f64) {
        self.push(Effect::UpdateScroll(target_offset_px));
    }
    fn on_toggle_viewport_alignment(&mut self, keyboard_visible: bool) {
        self.push(Effect::ToggleViewportAlignment(keyboard_visible));
    }
}

/// Effect sink built from two callbacks.
pub struct FnEffects<S, A> {
    on_update_scroll: S,
    on_toggle_viewport_alignment: A,
}

impl<S, A> FnEffects<S, A>
where
    S: FnMut(f64),
    A: FnMut(bool),
{
    pub fn new(on_update_scroll: S, on_toggle_viewport_alignment: A) -> Self {
        Self {
            on_update_scroll,
            on_toggle_viewport_alignment,
        }
    }
}

impl<S, A> ScrollEffects for FnEffects<S, A>
where
    S: FnMut(f64),
    A: FnMut(bool),
{
    fn on_update_scroll(&mut self, target_offset_px: f64) {
        (self.on_update_scroll)(target_offset_px)
    }
    fn on_toggle_viewport_alignment(&mut self, keyboard_visible: bool) {
        (self.on_toggle_viewport_alignment)(keyboard_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_keeps_order() {
        let mut rec: Vec<Effect> = Vec::new();
        rec.apply(Effect::ToggleViewportAlignment(true));
        rec.apply(Effect::UpdateScroll(42.0));
        assert_eq!(
            rec,
            vec![Effect::ToggleViewportAlignment(true), Effect::UpdateScroll(42.0)]
        );
    }

    #[test]
    fn fn_effects_routes_each_callback() {
        let mut scrolls = Vec::new();
        let mut toggles = Vec::new();
        {
            let mut sink = FnEffects::new(|t| scrolls.push(t), |v| toggles.push(v));
            sink.apply(Effect::UpdateScroll(10.0));
            sink.apply(Effect::ToggleViewportAlignment(false));
            sink.on_update_scroll(20.0);
        }
        assert_eq!(scrolls, vec![10.0, 20.0]);
        assert_eq!(toggles, vec![false]);
    }

    fn drive<E: ScrollEffects>(mut sink: E) {
        sink.on_update_scroll(5.0);
    }

    #[test]
    fn borrowed_and_boxed_sinks_forward() {
        let mut rec: Vec<Effect> = Vec::new();
        drive(&mut rec);
        assert_eq!(rec, vec![Effect::UpdateScroll(5.0)]);

        let boxed: Box<dyn ScrollEffects> = Box::new(Vec::<Effect>::new());
        drive(boxed);
    }
}
