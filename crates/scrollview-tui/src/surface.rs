use std::collections::HashMap;
use std::ops::Range;

use scrollview_core::surface::{Rect, ScrollSurface};

/// One line of list content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub text: String,
}

impl Row {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    fn width(&self) -> usize {
        self.text.chars().count()
    }
}

/// Terminal pane measured in cells, one row per line
///
/// Offsets are fractional while an animation is in flight; rendering rounds
/// them to whole cells.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    rows: Vec<Row>,
    index: HashMap<String, usize>,
    widest: usize,
    viewport_width: u16,
    viewport_height: u16,
    scroll_left: f64,
    scroll_top: f64,
    dirty: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_rows(&mut self, rows: impl IntoIterator<Item = Row>) {
        for row in rows {
            self.widest = self.widest.max(row.width());
            self.index.insert(row.id.clone(), self.rows.len());
            self.rows.push(row);
        }
    }

    /// Index of the row with `id`
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn viewport(&self) -> (u16, u16) {
        (self.viewport_width, self.viewport_height)
    }

    /// Resize the pane, re-clamping offsets
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.write_left(self.scroll_left);
        self.write_top(self.scroll_top);
    }

    /// Largest reachable vertical offset
    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height() - self.offset_height()).max(0.0)
    }

    pub fn max_scroll_left(&self) -> f64 {
        (self.scroll_width() - self.offset_width()).max(0.0)
    }

    /// First row drawn at the top of the pane
    pub fn first_visible_row(&self) -> usize {
        self.scroll_top.round() as usize
    }

    /// Character column drawn at the left edge
    pub fn first_visible_column(&self) -> usize {
        self.scroll_left.round() as usize
    }

    pub fn visible_rows(&self) -> Range<usize> {
        let start = self.first_visible_row().min(self.rows.len());
        let end = (start + self.viewport_height as usize).min(self.rows.len());
        start..end
    }

    /// Returns true once after the offset moved
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn write_left(&mut self, value: f64) {
        let value = value.clamp(0.0, self.max_scroll_left());
        if value != self.scroll_left {
            self.scroll_left = value;
            self.dirty = true;
        }
    }

    fn write_top(&mut self, value: f64) {
        let value = value.clamp(0.0, self.max_scroll_top());
        if value != self.scroll_top {
            self.scroll_top = value;
            self.dirty = true;
        }
    }
}

impl ScrollSurface for TerminalSurface {
    fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_left(&mut self, value: f64) {
        self.write_left(value);
    }

    fn set_scroll_top(&mut self, value: f64) {
        self.write_top(value);
    }

    fn offset_width(&self) -> f64 {
        self.viewport_width as f64
    }

    fn offset_height(&self) -> f64 {
        self.viewport_height as f64
    }

    fn scroll_width(&self) -> f64 {
        self.widest.max(self.viewport_width as usize) as f64
    }

    fn scroll_height(&self) -> f64 {
        self.rows.len() as f64
    }

    fn content_bounds(&self) -> Option<Rect> {
        Some(Rect::new(
            -self.scroll_left,
            -self.scroll_top,
            self.scroll_width(),
            self.scroll_height(),
        ))
    }

    fn element_bounds(&self, id: &str) -> Option<Rect> {
        let row = self.position(id)?;
        Some(Rect::new(
            -self.scroll_left,
            row as f64 - self.scroll_top,
            self.scroll_width(),
            1.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(rows: usize) -> TerminalSurface {
        let mut surface = TerminalSurface::new();
        surface.push_rows((0..rows).map(|i| Row::new(format!("row-{}", i), format!("line {}", i))));
        surface.set_viewport(20, 10);
        surface
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut s = surface(50);
        s.set_scroll_top(100.0);
        assert_eq!(s.scroll_top(), 40.0);
        s.set_scroll_top(-3.0);
        assert_eq!(s.scroll_top(), 0.0);

        // Lines are narrower than the pane: nothing to scroll sideways
        s.set_scroll_left(5.0);
        assert_eq!(s.scroll_left(), 0.0);
    }

    #[test]
    fn test_short_content_cannot_scroll() {
        let mut s = surface(4);
        s.set_scroll_top(2.0);
        assert_eq!(s.scroll_top(), 0.0);
        assert_eq!(s.visible_rows(), 0..4);
    }

    #[test]
    fn test_dirty_only_on_change() {
        let mut s = surface(50);
        assert!(!s.take_dirty());

        s.set_scroll_top(5.0);
        assert!(s.take_dirty());
        assert!(!s.take_dirty());

        s.set_scroll_top(5.0);
        assert!(!s.take_dirty());

        // Clamped to the current value
        s.set_scroll_top(-1.0);
        assert!(s.take_dirty());
        s.set_scroll_top(-1.0);
        assert!(!s.take_dirty());
    }

    #[test]
    fn test_visible_rows_round_fractional_offset() {
        let mut s = surface(50);
        s.set_scroll_top(3.6);
        assert_eq!(s.first_visible_row(), 4);
        assert_eq!(s.visible_rows(), 4..14);
    }

    #[test]
    fn test_element_bounds_relative_to_content() {
        let mut s = surface(50);
        s.set_scroll_top(12.0);
        let content = s.content_bounds().unwrap();
        let row = s.element_bounds("row-30").unwrap();
        assert_eq!(row.offset_from(&content).y, 30.0);
        assert!(s.element_bounds("row-99").is_none());
    }

    #[test]
    fn test_wide_rows_scroll_horizontally() {
        let mut s = surface(5);
        s.push_rows([Row::new("wide", "x".repeat(50))]);
        assert_eq!(s.scroll_width(), 50.0);
        s.set_scroll_left(100.0);
        assert_eq!(s.scroll_left(), 30.0);
        assert_eq!(s.first_visible_column(), 30);
    }

    #[test]
    fn test_resize_reclamps() {
        let mut s = surface(50);
        s.set_scroll_top(40.0);
        s.take_dirty();
        s.set_viewport(20, 30);
        assert_eq!(s.scroll_top(), 20.0);
        assert!(s.take_dirty());
    }
}
