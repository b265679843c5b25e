//! Smooth scrolling system
//!
//! Easing curves and timing math feed a frame-driven [`AnimationTimer`];
//! the [`controller`] writes interpolated offsets into a scroll surface and
//! dispatches scroll and end-reached events.
//!
//! # Usage
//!
//! ```ignore
//! use std::rc::Rc;
//! use scrollview_core::frame::{FrameContext, FrameLoop};
//! use scrollview_core::scroll::{ScrollToOptions, ScrollView, ScrollViewOptions};
//!
//! let frames = Rc::new(FrameLoop::new());
//! let mut view = ScrollView::new(surface, FrameContext::system(frames.clone()), units, ScrollViewOptions::default());
//!
//! view.scroll_to(ScrollToOptions { y: Some("300rpx".into()), ..Default::default() })?;
//!
//! // Once per display refresh
//! frames.run_frame();
//! ```

pub mod easing;
pub mod timing;
pub mod timer;
pub mod throttle;
pub mod end_reached;
pub mod controller;

pub use controller::{
    scroll_to, ScrollEvent, ScrollIntoViewOptions, ScrollToOptions, ScrollView, ScrollViewOptions,
};
pub use easing::EasingType;
pub use end_reached::EndReachedDetector;
pub use timer::{AnimationTimer, TimerConfig, TimerEvent, TimerEventKind, TimerPhase};
pub use timing::{Clock, ManualClock, SystemClock};
