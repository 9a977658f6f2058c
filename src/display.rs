//! Render adapter seam and redundant-render suppression
//!
//! The host owns the actual text-line widgets; the engine only pushes
//! strings through [`RenderLine`] / [`RenderPanel`]. Pushes are assumed
//! non-free, so each widget folds everything that affects its rendered
//! output into a composite key and skips the push when the key is unchanged.

/// A single host text line the engine can write to
pub trait RenderLine {
    /// Replaces the visible text
    fn set_text(&mut self, text: String);

    /// Shows or hides the line
    fn set_visible(&mut self, visible: bool);
}

/// A host widget with a variable number of text lines (auction list)
///
/// Line 0 is the header. Lines are created on demand by the host when an
/// index beyond the current count is written.
pub trait RenderPanel {
    /// Writes and shows the line at `index`
    fn set_line(&mut self, index: usize, text: String);

    /// Hides every line at `index` and beyond
    fn hide_from(&mut self, index: usize);
}

/// Suppresses render pushes while the composite display key is unchanged
///
/// Pure compare-and-store over the previous key; there are no side flags to
/// clear, so a forgotten reset cannot wedge the display. Equality of the key
/// type must cover every input that affects the rendered string - a missed
/// field means a config change never shows up until something else changes.
pub struct ChangeDetector<K> {
    last: Option<K>,
}

impl<K: PartialEq> ChangeDetector<K> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// True when `key` differs from the previously pushed key; stores it as
    /// the new baseline in that case
    pub fn update(&mut self, key: K) -> bool {
        if self.last.as_ref() == Some(&key) {
            return false;
        }
        self.last = Some(key);
        true
    }

    /// Forgets the baseline so the next tick always renders; used on
    /// enable/disable and context switches
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl<K: PartialEq> Default for ChangeDetector<K> {
    fn default() -> Self {
        Self::new()
    }
}
