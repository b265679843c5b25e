//! Frame scheduling primitive
//!
//! A [`FrameScheduler`] accepts a one-shot callback and runs it at the next
//! frame boundary. [`FrameLoop`] is the queue-backed implementation used by
//! the terminal host and tests: the host calls [`FrameLoop::run_frame`] once
//! per display refresh, or lets [`drive`] do it on a fixed interval when no
//! native frame source exists.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::scroll::timing::{Clock, SystemClock};

/// Interval used when no frame rate is configured (~60fps)
pub const FALLBACK_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// One-shot callback invoked at a frame boundary
pub type FrameCallback = Box<dyn FnOnce()>;

/// Opaque handle to a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

/// Host-provided `schedule` / `cancel` pair
pub trait FrameScheduler {
    /// Queue `callback` for the next frame
    fn schedule(&self, callback: FrameCallback) -> FrameHandle;

    /// Drop a queued callback. Cancelling a handle that already fired is a no-op.
    fn cancel(&self, handle: FrameHandle);
}

/// Queue of callbacks waiting for the next frame
#[derive(Default)]
pub struct FrameLoop {
    next_id: Cell<u64>,
    pending: RefCell<BTreeMap<u64, FrameCallback>>,
    frame_count: Cell<u64>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback that was pending when the frame began
    ///
    /// Callbacks scheduled while the frame runs wait for the next frame.
    /// Returns the number of callbacks invoked.
    pub fn run_frame(&self) -> usize {
        let due: Vec<u64> = self.pending.borrow().keys().copied().collect();
        self.frame_count.set(self.frame_count.get() + 1);

        let mut ran = 0;
        for id in due {
            // Release the borrow before invoking: callbacks reschedule and cancel
            let callback = self.pending.borrow_mut().remove(&id);
            if let Some(callback) = callback {
                callback();
                ran += 1;
            }
        }
        ran
    }

    /// Check if any callback is waiting for a frame
    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of frames run so far
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }
}

impl FrameScheduler for FrameLoop {
    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.pending.borrow_mut().insert(id, callback);
        FrameHandle(id)
    }

    fn cancel(&self, handle: FrameHandle) {
        self.pending.borrow_mut().remove(&handle.0);
    }
}

impl fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLoop")
            .field("pending", &self.pending_count())
            .field("frame_count", &self.frame_count())
            .finish()
    }
}

/// Scheduler and clock shared by everything animating on one surface
#[derive(Clone)]
pub struct FrameContext {
    pub scheduler: Rc<dyn FrameScheduler>,
    pub clock: Rc<dyn Clock>,
}

impl FrameContext {
    pub fn new(scheduler: Rc<dyn FrameScheduler>, clock: Rc<dyn Clock>) -> Self {
        Self { scheduler, clock }
    }

    /// Frame loop paired with the monotonic system clock
    pub fn system(frames: Rc<FrameLoop>) -> Self {
        Self::new(frames, Rc::new(SystemClock::new()))
    }
}

impl fmt::Debug for FrameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameContext")
            .field("now_ms", &self.clock.now_ms())
            .finish_non_exhaustive()
    }
}

/// Shortest frame interval; rates above 1000fps are capped here
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Frame interval for a target frame rate, falling back to ~16ms when `fps == 0`
#[inline]
pub fn frame_interval(fps: u32) -> Duration {
    if fps == 0 {
        FALLBACK_FRAME_INTERVAL
    } else {
        Duration::from_millis(1000 / fps as u64).max(MIN_FRAME_INTERVAL)
    }
}

/// Run frames on a fixed interval until no callback is pending
///
/// This is the fallback frame source for hosts without a display-refresh
/// signal. Returns the number of frames run.
pub async fn drive(frames: &FrameLoop, interval: Duration) -> u64 {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Skip the first tick (fires immediately)
    ticker.tick().await;

    let mut count = 0;
    while frames.has_pending() {
        ticker.tick().await;
        frames.run_frame();
        count += 1;
    }
    count
}
