//! Host window geometry.
//!
//! The visible window is the slice of content coordinates the host currently
//! presents: `[top, bottom]` where `top = scroll_offset - header` and
//! `bottom = top + visible_height`. Which header height participates is an
//! explicit choice ([`HeaderInset`]) because the host reports two of them:
//! the full reserved header and the portion still on screen. Fixtures with no
//! header make all three choices equivalent.
//!
//! Invariants:
//! * `top <= bottom` whenever `visible_height >= 0`.
//! * Containment is inclusive on both edges: a caret touching the window
//!   edge is visible and needs no correction.

use serde::{Deserialize, Serialize};

use crate::CaretBox;

/// Which header height is subtracted from the scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderInset {
    /// Subtract the portion of the header currently on screen.
    #[default]
    Visible,
    /// Subtract the full reserved header height.
    Total,
    /// Ignore the header entirely.
    None,
}

impl HeaderInset {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderInset::Visible => "visible",
            HeaderInset::Total => "total",
            HeaderInset::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleWindow {
    pub top: f64,
    pub bottom: f64,
}

impl VisibleWindow {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, caret: CaretBox) -> bool {
        self.top <= caret.top && caret.bottom <= self.bottom
    }

    /// Distance the caret extends past the bottom edge, if any.
    pub fn overflow_below(&self, caret: CaretBox) -> Option<f64> {
        (caret.bottom > self.bottom).then(|| caret.bottom - self.bottom)
    }

    /// Distance the caret extends past the top edge, if any.
    pub fn overflow_above(&self, caret: CaretBox) -> Option<f64> {
        (caret.top < self.top).then(|| self.top - caret.top)
    }
}
