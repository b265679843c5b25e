//! Scrollable surface abstraction and geometry types
//!
//! A [`ScrollSurface`] is whatever the host scrolls: a terminal pane, a
//! browser element, an in-memory model. The controller only reads geometry
//! and writes scroll offsets through this trait.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Offset of `self` relative to the origin of `container`
    pub fn offset_from(&self, container: &Rect) -> Point {
        Point::new(self.x - container.x, self.y - container.y)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

impl Axis {
    pub fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

/// Scroll geometry along one axis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisMetrics {
    /// Current scroll offset
    pub distance: f64,
    /// Total scrollable content length
    pub content_size: f64,
    /// Visible viewport length
    pub viewport_size: f64,
}

impl AxisMetrics {
    pub fn new(distance: f64, content_size: f64, viewport_size: f64) -> Self {
        Self {
            distance,
            content_size,
            viewport_size,
        }
    }

    /// Distance left to scroll before the viewport hits the content end
    #[inline]
    pub fn remaining(&self) -> f64 {
        self.content_size - self.distance - self.viewport_size
    }
}

/// Host-owned scrollable surface
pub trait ScrollSurface {
    fn scroll_left(&self) -> f64;
    fn scroll_top(&self) -> f64;
    fn set_scroll_left(&mut self, value: f64);
    fn set_scroll_top(&mut self, value: f64);

    /// Visible viewport width
    fn offset_width(&self) -> f64;
    /// Visible viewport height
    fn offset_height(&self) -> f64;
    /// Total content width
    fn scroll_width(&self) -> f64;
    /// Total content height
    fn scroll_height(&self) -> f64;

    /// Bounding box of the content container, in the same space as
    /// [`element_bounds`](Self::element_bounds)
    fn content_bounds(&self) -> Option<Rect> {
        None
    }

    /// Bounding box of the element with `id`, if mounted
    fn element_bounds(&self, _id: &str) -> Option<Rect> {
        None
    }

    fn content_offset(&self) -> Point {
        Point::new(self.scroll_left(), self.scroll_top())
    }

    fn content_size(&self) -> Size {
        Size::new(self.scroll_width(), self.scroll_height())
    }

    fn axis_metrics(&self, axis: Axis) -> AxisMetrics {
        match axis {
            Axis::Horizontal => {
                AxisMetrics::new(self.scroll_left(), self.scroll_width(), self.offset_width())
            }
            Axis::Vertical => {
                AxisMetrics::new(self.scroll_top(), self.scroll_height(), self.offset_height())
            }
        }
    }
}

/// In-memory surface with browser-like clamping
#[derive(Debug, Clone, Default)]
pub struct VirtualSurface {
    offset: Point,
    viewport: Size,
    content: Size,
    /// Element boxes in content coordinates
    elements: Vec<(String, Rect)>,
}

impl VirtualSurface {
    pub fn new(viewport: Size, content: Size) -> Self {
        Self {
            viewport,
            content,
            ..Default::default()
        }
    }

    pub fn set_content_size(&mut self, content: Size) {
        self.content = content;
        self.offset.x = self.clamp_x(self.offset.x);
        self.offset.y = self.clamp_y(self.offset.y);
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.offset.x = self.clamp_x(self.offset.x);
        self.offset.y = self.clamp_y(self.offset.y);
    }

    pub fn add_element(&mut self, id: impl Into<String>, bounds: Rect) {
        self.elements.push((id.into(), bounds));
    }

    fn clamp_x(&self, value: f64) -> f64 {
        value.clamp(0.0, (self.content.width - self.viewport.width).max(0.0))
    }

    fn clamp_y(&self, value: f64) -> f64 {
        value.clamp(0.0, (self.content.height - self.viewport.height).max(0.0))
    }
}

impl ScrollSurface for VirtualSurface {
    fn scroll_left(&self) -> f64 {
        self.offset.x
    }

    fn scroll_top(&self) -> f64 {
        self.offset.y
    }

    fn set_scroll_left(&mut self, value: f64) {
        self.offset.x = self.clamp_x(value);
    }

    fn set_scroll_top(&mut self, value: f64) {
        self.offset.y = self.clamp_y(value);
    }

    fn offset_width(&self) -> f64 {
        self.viewport.width
    }

    fn offset_height(&self) -> f64 {
        self.viewport.height
    }

    fn scroll_width(&self) -> f64 {
        self.content.width
    }

    fn scroll_height(&self) -> f64 {
        self.content.height
    }

    fn content_bounds(&self) -> Option<Rect> {
        Some(Rect::new(-self.offset.x, -self.offset.y, self.content.width, self.content.height))
    }

    fn element_bounds(&self, id: &str) -> Option<Rect> {
        self.elements
            .iter()
            .find(|(element_id, _)| element_id == id)
            .map(|(_, rect)| rect.translate(-self.offset.x, -self.offset.y))
    }
}
