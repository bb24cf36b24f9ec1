//! Geometry snapshots exchanged between the host scroll container, the
//! embedded editor surface, and the scroll synchronization controller.
//!
//! Two feeds report geometry independently and out of band from each other:
//! * The host scroll container pushes a [`HostViewportSnapshot`] on every
//!   layout or scroll change.
//! * The embedded editor pushes an [`EditorContentSnapshot`] on every layout
//!   pass (reflow, caret movement, keyboard visibility change, revision bump).
//!
//! Both are plain `Copy` values replaced wholesale on each update; nothing in
//! this crate holds state across updates.
//!
//! Invariants (upheld by the producing feeds, not checked here):
//! * Every length is non-negative.
//! * `caret_top_px <= caret_bottom_px`.
//! * `content_revision` strictly increases whenever content changes.
//!
//! Coordinates: the caret box is expressed in the editor's own content space
//! and compared directly against the host window computed by
//! [`HostViewportSnapshot::visible_window`].

use serde::{Deserialize, Serialize};

mod window;
pub use window::{HeaderInset, VisibleWindow};

/// Geometry of the host scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostViewportSnapshot {
    /// Height of the visible scroll window.
    pub visible_height_px: f64,
    /// Portion of the header currently occupying the visible window.
    pub visible_header_height_px: f64,
    /// Total height reserved for the header (may exceed the visible portion
    /// when the header is partially scrolled away).
    pub header_height_px: f64,
    /// Current scroll position measured from the content origin.
    pub scroll_offset_px: f64,
}

impl HostViewportSnapshot {
    pub fn new(
        visible_height_px: f64,
        visible_header_height_px: f64,
        header_height_px: f64,
        scroll_offset_px: f64,
    ) -> Self {
        Self {
            visible_height_px,
            visible_header_height_px,
            header_height_px,
            scroll_offset_px,
        }
    }

    /// Header-less viewport, the common shape in fixtures.
    pub fn plain(visible_height_px: f64, scroll_offset_px: f64) -> Self {
        Self::new(visible_height_px, 0.0, 0.0, scroll_offset_px)
    }

    /// Visible window in content coordinates. `inset` selects which header
    /// height is subtracted from the scroll offset.
    pub fn visible_window(&self, inset: HeaderInset) -> VisibleWindow {
        let header = match inset {
            HeaderInset::Visible => self.visible_header_height_px,
            HeaderInset::Total => self.header_height_px,
            HeaderInset::None => 0.0,
        };
        let top = self.scroll_offset_px - header;
        VisibleWindow::new(top, top + self.visible_height_px)
    }
}

/// Caret bounding box in editor content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaretBox {
    pub top: f64,
    pub bottom: f64,
}

impl CaretBox {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }
}

/// Geometry of the embedded editor surface.
///
/// Equality is structural across every field: two snapshots differing only in
/// `content_revision` or `keyboard_visible` are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorContentSnapshot {
    pub content_height_px: f64,
    pub caret_top_px: f64,
    pub caret_bottom_px: f64,
    /// Height of one text line; sizes the safety margin below the caret.
    pub line_height_px: f64,
    pub content_revision: u64,
    pub keyboard_visible: bool,
}

impl EditorContentSnapshot {
    pub fn caret(&self) -> CaretBox {
        CaretBox::new(self.caret_top_px, self.caret_bottom_px)
    }

    /// Builder-style helpers used heavily by fixtures and the replay tool.
    pub fn with_caret(mut self, top: f64, bottom: f64) -> Self {
        self.caret_top_px = top;
        self.caret_bottom_px = bottom;
        self
    }

    pub fn with_content_height(mut self, content_height_px: f64) -> Self {
        self.content_height_px = content_height_px;
        self
    }

    pub fn with_line_height(mut self, line_height_px: f64) -> Self {
        self.line_height_px = line_height_px;
        self
    }

    pub fn with_revision(mut self, content_revision: u64) -> Self {
        self.content_revision = content_revision;
        self
    }

    pub fn with_keyboard(mut self, keyboard_visible: bool) -> Self {
        self.keyboard_visible = keyboard_visible;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_viewport_has_no_header() {
        let vp = HostViewportSnapshot::plain(100.0, 40.0);
        assert_eq!(vp.visible_header_height_px, 0.0);
        assert_eq!(vp.header_height_px, 0.0);
        assert_eq!(vp.scroll_offset_px, 40.0);
    }

    #[test]
    fn revision_alone_distinguishes_snapshots() {
        let a = EditorContentSnapshot::default()
            .with_caret(10.0, 30.0)
            .with_content_height(200.0);
        let b = a.with_revision(a.content_revision + 1);
        assert_ne!(a, b);
        assert_eq!(a.caret(), b.caret());
    }

    #[test]
    fn keyboard_flag_alone_distinguishes_snapshots() {
        let a = EditorContentSnapshot::default().with_caret(10.0, 30.0);
        assert_ne!(a, a.with_keyboard(true));
    }

    #[test]
    fn snapshots_use_snake_case_wire_names() {
        let snap = EditorContentSnapshot::default()
            .with_caret(1.0, 2.0)
            .with_revision(7);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"caret_top_px\":1.0"));
        assert!(json.contains("\"content_revision\":7"));
        let back: EditorContentSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
