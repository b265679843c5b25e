//! Scroll controller
//!
//! Drives the scroll offset of a [`ScrollSurface`], either by writing it
//! directly or by running an [`AnimationTimer`] whose ticks write
//! interpolated offsets. [`ScrollView`] wraps a surface with the imperative
//! API a host exposes (`scroll_to`, `scroll_into_view`, `reset_scroll`) and
//! dispatches scroll events to listeners and the end-reached detector.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use super::easing::EasingType;
use super::end_reached::EndReachedDetector;
use super::throttle::Throttle;
use super::timer::{AnimationTimer, TimerConfig};
use super::timing::lerp;
use crate::config::ScrollConfig;
use crate::frame::FrameContext;
use crate::surface::{Axis, Point, ScrollSurface, Size};
use crate::units::{Dimension, UnitConverter};
use crate::{Error, Result};

pub const DEFAULT_ANIMATION_DURATION_MS: f64 = 400.0;

/// Scroll `surface` to (`x`, `y`) pixels
///
/// Negative coordinates leave that axis untouched. Animated scrolls use a
/// sine ease-out and return the running timer; the animation keeps running
/// if the handle is dropped, and skips writes once the surface is gone.
pub fn scroll_to<S: ScrollSurface + 'static>(
    surface: &Rc<RefCell<S>>,
    frames: &FrameContext,
    x: f64,
    y: f64,
    animated: bool,
    duration_ms: f64,
) -> Option<AnimationTimer> {
    let origin = surface.borrow().content_offset();

    if !animated {
        let mut surface = surface.borrow_mut();
        if x >= 0.0 {
            surface.set_scroll_left(x);
        }
        if y >= 0.0 {
            surface.set_scroll_top(y);
        }
        return None;
    }

    let target = Rc::downgrade(surface);
    let config = TimerConfig::new(EasingType::EaseOutSine, duration_ms).on_run(move |event| {
        let Some(surface) = target.upgrade() else {
            return;
        };
        let mut surface = surface.borrow_mut();
        if x >= 0.0 {
            surface.set_scroll_left(lerp(origin.x, x, event.progress));
        }
        if y >= 0.0 {
            surface.set_scroll_top(lerp(origin.y, y, event.progress));
        }
    });

    let timer = AnimationTimer::new(config, frames.clone());
    timer.run();
    Some(timer)
}

/// Payload of scroll notifications
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollEvent {
    pub content_offset: Point,
    pub content_size: Size,
}

/// Behaviour of a [`ScrollView`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollViewOptions {
    /// Scroll (and detect end reached) along the horizontal axis
    pub horizontal: bool,
    /// Distance from the content end that counts as "reached"
    pub end_reached_threshold: Dimension,
    /// Minimum time between dispatched scroll events; 0 dispatches all
    pub scroll_event_throttle_ms: u64,
    /// Ignore user-driven scrolling; programmatic scrolls still apply
    pub disable_scroll: bool,
    /// Default duration for animated scrolls
    pub animation_duration_ms: f64,
}

impl Default for ScrollViewOptions {
    fn default() -> Self {
        Self {
            horizontal: false,
            end_reached_threshold: Dimension::Units(0.0),
            scroll_event_throttle_ms: 0,
            disable_scroll: false,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
        }
    }
}

impl From<&ScrollConfig> for ScrollViewOptions {
    fn from(config: &ScrollConfig) -> Self {
        Self {
            horizontal: config.horizontal,
            end_reached_threshold: config.end_reached_threshold.clone(),
            scroll_event_throttle_ms: config.scroll_event_throttle_ms,
            disable_scroll: false,
            animation_duration_ms: config.animation_duration_ms as f64,
        }
    }
}

/// Arguments to [`ScrollView::scroll_to`]; `None` leaves an axis untouched
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollToOptions {
    pub x: Option<Dimension>,
    pub y: Option<Dimension>,
    pub animated: bool,
    /// Falls back to the view's configured duration
    pub duration_ms: Option<f64>,
}

impl Default for ScrollToOptions {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            animated: true,
            duration_ms: None,
        }
    }
}

/// Arguments to [`ScrollView::scroll_into_view`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollIntoViewOptions {
    pub id: Option<String>,
    pub animated: bool,
    pub duration_ms: Option<f64>,
}

impl Default for ScrollIntoViewOptions {
    fn default() -> Self {
        Self {
            id: None,
            animated: true,
            duration_ms: None,
        }
    }
}

impl ScrollIntoViewOptions {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }
}

type ScrollListener = Box<dyn FnMut(&ScrollEvent)>;

struct ActiveScroll {
    timer: AnimationTimer,
    target: Point,
}

/// Imperative scroll API over a host surface
pub struct ScrollView<S: ScrollSurface + 'static> {
    surface: Rc<RefCell<S>>,
    frames: FrameContext,
    units: UnitConverter,
    options: ScrollViewOptions,
    detector: EndReachedDetector,
    throttle: Throttle,
    on_scroll: Option<ScrollListener>,
    on_end_reached: Option<ScrollListener>,
    active: Option<ActiveScroll>,
}

impl<S: ScrollSurface + 'static> ScrollView<S> {
    pub fn new(surface: S, frames: FrameContext, units: UnitConverter, options: ScrollViewOptions) -> Self {
        let throttle = Throttle::new(options.scroll_event_throttle_ms);
        Self {
            surface: Rc::new(RefCell::new(surface)),
            frames,
            units,
            options,
            detector: EndReachedDetector::new(),
            throttle,
            on_scroll: None,
            on_end_reached: None,
            active: None,
        }
    }

    pub fn surface(&self) -> &Rc<RefCell<S>> {
        &self.surface
    }

    pub fn units(&self) -> &UnitConverter {
        &self.units
    }

    /// Replace the converter, e.g. after the viewport was re-measured
    pub fn set_units(&mut self, units: UnitConverter) {
        self.units = units;
    }

    pub fn options(&self) -> &ScrollViewOptions {
        &self.options
    }

    pub fn set_disable_scroll(&mut self, disable: bool) {
        self.options.disable_scroll = disable;
    }

    pub fn axis(&self) -> Axis {
        Axis::from_horizontal(self.options.horizontal)
    }

    pub fn set_on_scroll(&mut self, listener: impl FnMut(&ScrollEvent) + 'static) {
        self.on_scroll = Some(Box::new(listener));
    }

    pub fn set_on_end_reached(&mut self, listener: impl FnMut(&ScrollEvent) + 'static) {
        self.on_end_reached = Some(Box::new(listener));
    }

    /// Forget end-reached history so the next qualifying scroll fires again
    pub fn reset_scroll(&mut self) {
        self.detector.reset();
        self.throttle.reset();
    }

    /// Check if an animated scroll is in flight
    pub fn is_animating(&self) -> bool {
        self.active.as_ref().is_some_and(|active| active.timer.is_running())
    }

    /// Where the current animation is heading, or the current offset
    pub fn target_offset(&self) -> Point {
        match &self.active {
            Some(active) if active.timer.is_running() => active.target,
            _ => self.surface.borrow().content_offset(),
        }
    }

    /// Interrupt the in-flight animation, leaving the offset where it is
    pub fn stop_animation(&mut self) {
        if let Some(active) = self.active.take() {
            active.timer.stop();
        }
    }

    pub fn scroll_to(&mut self, options: ScrollToOptions) -> Result<()> {
        let x = self.resolve_axis(options.x.as_ref())?;
        let y = self.resolve_axis(options.y.as_ref())?;
        let duration_ms = options.duration_ms.unwrap_or(self.options.animation_duration_ms);
        self.start(x, y, options.animated, duration_ms);
        Ok(())
    }

    /// Scroll so that the element `id` sits at the content origin
    ///
    /// Fails without an id; does nothing if the element is not mounted.
    pub fn scroll_into_view(&mut self, options: ScrollIntoViewOptions) -> Result<()> {
        let id = options
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingParameter("id"))?;

        let offset = {
            let surface = self.surface.borrow();
            match (surface.element_bounds(id), surface.content_bounds()) {
                (Some(target), Some(content)) => target.offset_from(&content),
                _ => {
                    debug!(id, "scroll_into_view target not mounted");
                    return Ok(());
                }
            }
        };

        let duration_ms = options.duration_ms.unwrap_or(self.options.animation_duration_ms);
        self.start(offset.x, offset.y, options.animated, duration_ms);
        Ok(())
    }

    /// User-driven relative scroll, chained onto any in-flight target
    ///
    /// The target is clamped to the scrollable range. Returns false when
    /// scrolling is disabled.
    pub fn scroll_by(&mut self, dx: f64, dy: f64, animated: bool) -> bool {
        if self.options.disable_scroll {
            return false;
        }
        let from = self.target_offset();
        let (max_x, max_y) = {
            let surface = self.surface.borrow();
            (
                (surface.scroll_width() - surface.offset_width()).max(0.0),
                (surface.scroll_height() - surface.offset_height()).max(0.0),
            )
        };
        let x = if dx != 0.0 { (from.x + dx).clamp(0.0, max_x) } else { -1.0 };
        let y = if dy != 0.0 { (from.y + dy).clamp(0.0, max_y) } else { -1.0 };
        self.start(x, y, animated, self.options.animation_duration_ms);
        true
    }

    /// Dispatch a scroll event after the surface offset changed
    ///
    /// Returns true when the end-reached notification fired.
    pub fn handle_scroll(&mut self) -> bool {
        if !self.throttle.try_fire(self.frames.clock.now_ms()) {
            return false;
        }

        let (event, metrics) = {
            let surface = self.surface.borrow();
            let event = ScrollEvent {
                content_offset: surface.content_offset(),
                content_size: surface.content_size(),
            };
            (event, surface.axis_metrics(self.axis()))
        };

        if let Some(listener) = self.on_scroll.as_mut() {
            listener(&event);
        }

        let reached = self
            .detector
            .evaluate(metrics, &self.options.end_reached_threshold, &self.units);
        if reached {
            if let Some(listener) = self.on_end_reached.as_mut() {
                listener(&event);
            }
        }
        reached
    }

    fn resolve_axis(&self, value: Option<&Dimension>) -> Result<f64> {
        match value {
            Some(value) => self.units.resolve(value),
            None => Ok(-1.0),
        }
    }

    fn start(&mut self, x: f64, y: f64, animated: bool, duration_ms: f64) {
        self.stop_animation();

        let current = self.surface.borrow().content_offset();
        let target = Point::new(
            if x >= 0.0 { x } else { current.x },
            if y >= 0.0 { y } else { current.y },
        );
        debug!(x, y, animated, duration_ms, "Scrolling");

        self.active = scroll_to(&self.surface, &self.frames, x, y, animated, duration_ms)
            .map(|timer| ActiveScroll { timer, target });
    }
}

impl<S: ScrollSurface + fmt::Debug + 'static> fmt::Debug for ScrollView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollView")
            .field("surface", &self.surface)
            .field("options", &self.options)
            .field("detector", &self.detector)
            .field("animating", &self.is_animating())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameLoop;
    use crate::scroll::timing::ManualClock;
    use crate::surface::{Rect, VirtualSurface};

    struct Harness {
        frames: Rc<FrameLoop>,
        clock: Rc<ManualClock>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                frames: Rc::new(FrameLoop::new()),
                clock: Rc::new(ManualClock::new()),
            }
        }

        fn context(&self) -> FrameContext {
            FrameContext::new(self.frames.clone(), self.clock.clone())
        }

        fn step(&self, ms: f64) {
            self.clock.advance(ms);
            self.frames.run_frame();
        }

        fn view(&self, options: ScrollViewOptions) -> ScrollView<VirtualSurface> {
            let mut surface = VirtualSurface::new(Size::new(100.0, 50.0), Size::new(400.0, 1000.0));
            surface.add_element("row-30", Rect::new(0.0, 300.0, 100.0, 10.0));
            ScrollView::new(surface, self.context(), UnitConverter::new(1.0), options)
        }
    }

    fn surface() -> Rc<RefCell<VirtualSurface>> {
        Rc::new(RefCell::new(VirtualSurface::new(
            Size::new(100.0, 50.0),
            Size::new(400.0, 1000.0),
        )))
    }

    #[test]
    fn test_instant_scroll_skips_negative_axis() {
        let h = Harness::new();
        let s = surface();
        s.borrow_mut().set_scroll_left(30.0);

        let timer = scroll_to(&s, &h.context(), -1.0, 200.0, false, 400.0);
        assert!(timer.is_none());
        assert_eq!(s.borrow().scroll_left(), 30.0);
        assert_eq!(s.borrow().scroll_top(), 200.0);
        assert!(!h.frames.has_pending());
    }

    #[test]
    fn test_animated_scroll_interpolates_with_sine() {
        let h = Harness::new();
        let s = surface();
        s.borrow_mut().set_scroll_top(100.0);

        let timer = scroll_to(&s, &h.context(), -1.0, 500.0, true, 400.0).unwrap();
        assert_eq!(s.borrow().scroll_top(), 100.0);

        h.step(200.0);
        let expected = 100.0 + 400.0 * (std::f64::consts::FRAC_PI_4).sin();
        assert!((s.borrow().scroll_top() - expected).abs() < 1e-9);
        assert_eq!(s.borrow().scroll_left(), 0.0);

        h.step(200.0);
        assert!(timer.is_finished());
        assert!((s.borrow().scroll_top() - 500.0).abs() < 1e-9);
        assert!(!h.frames.has_pending());
    }

    #[test]
    fn test_animation_survives_dropped_surface() {
        let h = Harness::new();
        let s = surface();
        let timer = scroll_to(&s, &h.context(), 50.0, 50.0, true, 100.0).unwrap();
        drop(s);

        h.step(50.0);
        h.step(60.0);
        assert!(timer.is_finished());
    }

    #[test]
    fn test_view_scroll_to_leaves_missing_axis() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions::default());
        view.surface().borrow_mut().set_scroll_left(12.0);

        view.scroll_to(ScrollToOptions {
            y: Some("300px".into()),
            animated: false,
            ..Default::default()
        })
        .unwrap();

        let s = view.surface().borrow();
        assert_eq!(s.scroll_left(), 12.0);
        assert_eq!(s.scroll_top(), 300.0);
    }

    #[test]
    fn test_view_scroll_to_rejects_malformed_target() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions::default());
        let err = view
            .scroll_to(ScrollToOptions {
                y: Some("lots".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDimension(_)));
        assert!(!view.is_animating());
    }

    #[test]
    fn test_view_scroll_to_zero_is_a_real_target() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions::default());
        view.surface().borrow_mut().set_scroll_top(400.0);
        view.scroll_to(ScrollToOptions {
            y: Some(0.into()),
            animated: false,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(view.surface().borrow().scroll_top(), 0.0);
    }

    #[test]
    fn test_new_scroll_replaces_running_animation() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions::default());

        view.scroll_to(ScrollToOptions { y: Some(800.into()), ..Default::default() }).unwrap();
        h.step(100.0);
        assert!(view.is_animating());
        assert_eq!(view.target_offset().y, 800.0);

        view.scroll_to(ScrollToOptions { y: Some(0.into()), ..Default::default() }).unwrap();
        assert_eq!(h.frames.pending_count(), 1);
        assert_eq!(view.target_offset().y, 0.0);

        h.step(400.0);
        assert!(!view.is_animating());
        assert!(view.surface().borrow().scroll_top().abs() < 1e-9);
    }

    #[test]
    fn test_scroll_into_view() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions::default());
        view.surface().borrow_mut().set_scroll_top(120.0);

        view.scroll_into_view(ScrollIntoViewOptions {
            animated: false,
            ..ScrollIntoViewOptions::id("row-30")
        })
        .unwrap();
        assert_eq!(view.surface().borrow().scroll_top(), 300.0);
    }

    #[test]
    fn test_scroll_into_view_requires_id() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions::default());

        let err = view.scroll_into_view(ScrollIntoViewOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingParameter("id")));

        let err = view.scroll_into_view(ScrollIntoViewOptions::id("")).unwrap_err();
        assert!(matches!(err, Error::MissingParameter(_)));
    }

    #[test]
    fn test_scroll_into_view_unknown_id_is_noop() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions::default());
        view.surface().borrow_mut().set_scroll_top(42.0);

        view.scroll_into_view(ScrollIntoViewOptions::id("row-999")).unwrap();
        assert_eq!(view.surface().borrow().scroll_top(), 42.0);
        assert!(!h.frames.has_pending());
    }

    #[test]
    fn test_handle_scroll_dispatches_events() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions {
            end_reached_threshold: Dimension::Units(10.0),
            ..Default::default()
        });

        let seen = Rc::new(RefCell::new(Vec::new()));
        let ends = Rc::new(RefCell::new(0));
        let seen_in = seen.clone();
        view.set_on_scroll(move |e| seen_in.borrow_mut().push(*e));
        let ends_in = ends.clone();
        view.set_on_end_reached(move |_| *ends_in.borrow_mut() += 1);

        view.surface().borrow_mut().set_scroll_top(500.0);
        assert!(!view.handle_scroll());

        view.surface().borrow_mut().set_scroll_top(945.0);
        assert!(view.handle_scroll());

        view.surface().borrow_mut().set_scroll_top(950.0);
        assert!(!view.handle_scroll());

        assert_eq!(*ends.borrow(), 1);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1].content_offset, Point::new(0.0, 945.0));
        assert_eq!(seen[1].content_size, Size::new(400.0, 1000.0));

        // More content re-arms the detector
        drop(seen);
        view.surface().borrow_mut().set_content_size(Size::new(400.0, 2000.0));
        view.surface().borrow_mut().set_scroll_top(1945.0);
        assert!(view.handle_scroll());
        assert_eq!(*ends.borrow(), 2);
    }

    #[test]
    fn test_horizontal_end_reached() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions {
            horizontal: true,
            end_reached_threshold: "20px".into(),
            ..Default::default()
        });
        view.surface().borrow_mut().set_scroll_top(945.0);
        assert!(!view.handle_scroll());
        view.surface().borrow_mut().set_scroll_left(290.0);
        assert!(view.handle_scroll());
    }

    #[test]
    fn test_reset_scroll_rearms() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions {
            end_reached_threshold: Dimension::Units(10.0),
            ..Default::default()
        });
        view.surface().borrow_mut().set_scroll_top(950.0);
        assert!(view.handle_scroll());
        assert!(!view.handle_scroll());

        view.reset_scroll();
        assert!(view.handle_scroll());
    }

    #[test]
    fn test_throttled_events() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions {
            scroll_event_throttle_ms: 100,
            ..Default::default()
        });
        let count = Rc::new(RefCell::new(0));
        let count_in = count.clone();
        view.set_on_scroll(move |_| *count_in.borrow_mut() += 1);

        view.handle_scroll();
        h.clock.advance(50.0);
        view.handle_scroll();
        h.clock.advance(60.0);
        view.handle_scroll();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_scroll_by_chains_targets() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions::default());

        assert!(view.scroll_by(0.0, 10.0, true));
        assert!(view.scroll_by(0.0, 10.0, true));
        assert_eq!(view.target_offset(), Point::new(0.0, 20.0));

        h.step(500.0);
        assert!((view.surface().borrow().scroll_top() - 20.0).abs() < 1e-9);

        assert!(view.scroll_by(0.0, -50.0, false));
        assert_eq!(view.surface().borrow().scroll_top(), 0.0);
    }

    #[test]
    fn test_scroll_by_target_stays_within_content() {
        let h = Harness::new();
        let surface = VirtualSurface::new(Size::new(100.0, 50.0), Size::new(100.0, 100.0));
        let mut view = ScrollView::new(surface, h.context(), UnitConverter::new(1.0), Default::default());
        view.scroll_by(0.0, 50.0, false);
        assert_eq!(view.surface().borrow().scroll_top(), 50.0);

        for _ in 0..10 {
            view.scroll_by(0.0, 1.0, true);
        }
        assert_eq!(view.target_offset(), Point::new(0.0, 50.0));

        // Scrolling back up moves away from the end straight away
        view.scroll_by(0.0, -1.0, true);
        assert_eq!(view.target_offset(), Point::new(0.0, 49.0));
        h.step(500.0);
        assert!((view.surface().borrow().scroll_top() - 49.0).abs() < 1e-9);

        view.scroll_by(-5.0, 0.0, false);
        view.scroll_by(5.0, 0.0, false);
        assert_eq!(view.surface().borrow().scroll_left(), 0.0);
    }

    #[test]
    fn test_disable_scroll_blocks_user_scroll_only() {
        let h = Harness::new();
        let mut view = h.view(ScrollViewOptions {
            disable_scroll: true,
            ..Default::default()
        });
        assert!(!view.scroll_by(0.0, 10.0, false));
        assert_eq!(view.surface().borrow().scroll_top(), 0.0);

        view.scroll_to(ScrollToOptions {
            y: Some(10.into()),
            animated: false,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(view.surface().borrow().scroll_top(), 10.0);
    }
}
