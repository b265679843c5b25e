use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Local};
use scrollview_core::frame::{FrameContext, FrameLoop};
use scrollview_core::scroll::{
    Clock, ScrollIntoViewOptions, ScrollToOptions, ScrollView, ScrollViewOptions, SystemClock,
};
use scrollview_core::surface::ScrollSurface;
use scrollview_core::{AppConfig, Dimension, Error, UnitConverter};
use tracing::{debug, info, warn};

use crate::event::{page_rows, PageLoadResult};
use crate::surface::TerminalSurface;
use crate::theme::Theme;

/// Rows `start..start + count` wanted from the item source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start: usize,
    pub count: usize,
}

/// Application state
pub struct App {
    /// Application configuration
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    frames: Rc<FrameLoop>,
    /// Scroll controller over the list pane
    pub view: ScrollView<TerminalSurface>,
    /// Whether keyboard scrolling animates
    pub animated: bool,
    /// Row id `m` scrolls back to
    pub marked: Option<String>,
    /// A page request is in flight
    pub is_loading: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
    last_end_reached: Rc<Cell<Option<DateTime<Local>>>>,
}

impl App {
    pub fn new(config: Arc<AppConfig>, theme: Theme) -> Self {
        Self::with_clock(config, theme, Rc::new(SystemClock::new()))
    }

    pub fn with_clock(config: Arc<AppConfig>, theme: Theme, clock: Rc<dyn Clock>) -> Self {
        let frames = Rc::new(FrameLoop::new());
        let context = FrameContext::new(frames.clone(), clock);
        let options = ScrollViewOptions::from(&config.scroll);

        let mut surface = TerminalSurface::new();
        surface.push_rows(page_rows(0, config.ui.page_size));

        let mut view = ScrollView::new(surface, context, UnitConverter::default(), options);
        let last_end_reached = Rc::new(Cell::new(None));
        let stamp = last_end_reached.clone();
        view.set_on_end_reached(move |event| {
            debug!(offset = ?event.content_offset, size = ?event.content_size, "End reached");
            stamp.set(Some(Local::now()));
        });

        Self {
            animated: config.scroll.is_smooth(),
            config,
            theme,
            frames,
            view,
            marked: None,
            is_loading: false,
            should_quit: false,
            status_message: None,
            last_end_reached,
        }
    }

    pub fn frames(&self) -> &Rc<FrameLoop> {
        &self.frames
    }

    /// Number of rows loaded so far
    pub fn loaded(&self) -> usize {
        self.view.surface().borrow().len()
    }

    pub fn last_end_reached(&self) -> Option<DateTime<Local>> {
        self.last_end_reached.get()
    }

    pub fn is_animating(&self) -> bool {
        self.view.is_animating()
    }

    /// Measure the list pane; the unit ratio follows its width
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.view.surface().borrow().viewport() == (width, height) {
            return;
        }
        self.view.surface().borrow_mut().set_viewport(width, height);
        self.view.set_units(UnitConverter::from_viewport(
            width as f64,
            self.config.scroll.reference_width,
        ));
        debug!(width, height, ratio = self.view.units().ratio(), "Viewport resized");
    }

    /// Advance animations by one frame
    pub fn tick_frame(&mut self) {
        self.frames.run_frame();
    }

    /// Dispatch a scroll event if the offset moved since the last call
    ///
    /// Returns the page to fetch when the end of the list was reached.
    pub fn dispatch_scroll(&mut self) -> Option<PageRequest> {
        let moved = self.view.surface().borrow_mut().take_dirty();
        if moved && self.view.handle_scroll() {
            return self.request_page();
        }
        None
    }

    fn request_page(&mut self) -> Option<PageRequest> {
        if self.is_loading {
            return None;
        }
        self.is_loading = true;
        let request = PageRequest {
            start: self.loaded(),
            count: self.config.ui.page_size,
        };
        info!(start = request.start, count = request.count, "Loading more rows");
        Some(request)
    }

    pub fn apply_page(&mut self, result: PageLoadResult) {
        self.is_loading = false;
        match result {
            PageLoadResult::Success { start, rows } => {
                if start != self.loaded() {
                    warn!(start, loaded = self.loaded(), "Discarding out-of-order page");
                    return;
                }
                let count = rows.len();
                self.view.surface().borrow_mut().push_rows(rows);
                self.set_status(format!("Loaded {} more rows", count));
            }
            PageLoadResult::Failure { start, error } => {
                warn!(start, error = %error, "Page load failed");
                self.set_status(format!("Load failed: {}", error));
            }
        }
    }

    /// Scroll by `lines` rows (negative scrolls up)
    pub fn scroll_lines(&mut self, lines: i32) {
        if !self.view.scroll_by(0.0, lines as f64, self.animated) {
            self.set_status("Scrolling is disabled");
        }
    }

    /// Scroll by `columns` cells sideways
    pub fn scroll_columns(&mut self, columns: i32) {
        self.view.scroll_by(columns as f64, 0.0, self.animated);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = self.half_page();
        self.scroll_lines(half);
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = self.half_page();
        self.scroll_lines(-half);
    }

    fn half_page(&self) -> i32 {
        let (_, height) = self.view.surface().borrow().viewport();
        (height / 2).max(1) as i32
    }

    /// Jump to the beginning
    pub fn jump_to_top(&mut self) {
        self.scroll_to_row(0);
    }

    /// Jump to the end
    pub fn jump_to_bottom(&mut self) {
        let bottom = self.view.surface().borrow().max_scroll_top();
        self.scroll_to_row(bottom as u64);
    }

    fn scroll_to_row(&mut self, row: u64) {
        let options = ScrollToOptions {
            y: Some(Dimension::px(row)),
            animated: self.animated,
            ..Default::default()
        };
        if let Err(e) = self.view.scroll_to(options) {
            self.set_status(format!("Scroll failed: {}", e));
        }
    }

    /// Remember the row at the top of the pane
    pub fn mark_top_row(&mut self) {
        let surface = self.view.surface().borrow();
        let id = surface.rows().get(surface.first_visible_row()).map(|row| row.id.clone());
        drop(surface);

        match id {
            Some(id) => {
                self.set_status(format!("Marked {}", id));
                self.marked = Some(id);
            }
            None => self.set_status("Nothing to mark"),
        }
    }

    /// Bring the marked row to the top of the pane
    pub fn scroll_to_marked(&mut self) {
        let options = ScrollIntoViewOptions {
            id: self.marked.clone(),
            animated: self.animated,
            duration_ms: None,
        };
        match self.view.scroll_into_view(options) {
            Ok(()) => {}
            Err(Error::MissingParameter(_)) => self.set_status("No row marked (space marks the top row)"),
            Err(e) => self.set_status(format!("Scroll failed: {}", e)),
        }
    }

    /// Toggle between animated and instant keyboard scrolling
    pub fn toggle_animated(&mut self) {
        self.animated = !self.animated;
        if !self.animated {
            self.view.stop_animation();
        }
        self.set_status(if self.animated { "Smooth scrolling on" } else { "Smooth scrolling off" });
    }

    /// Forget end-reached history so loading can trigger again
    pub fn reset_scroll(&mut self) {
        self.view.reset_scroll();
        self.set_status("Scroll memory reset");
    }

    /// Vertical offset, possibly mid-animation
    pub fn offset(&self) -> f64 {
        self.view.surface().borrow().scroll_top()
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear the status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
