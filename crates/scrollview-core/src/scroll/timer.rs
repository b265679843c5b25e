//! Frame-driven animation timer
//!
//! One timer drives one animated transition. It advances on frame callbacks
//! obtained from the injected [`FrameScheduler`](crate::frame::FrameScheduler),
//! computes eased progress from wall-clock time, and reports four lifecycle
//! events:
//!
//! - `start` when a run begins
//! - `run` on every tick, carrying eased `progress` and linear `percent`
//! - `stop` when the value settles (reached 1 or was cut off)
//! - `end` when the timer releases its frame callback
//!
//! A timer interrupted with [`AnimationTimer::stop`] can be run again; the new
//! run resumes `percent` from where the interrupted one left off.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::easing::EasingType;
use super::timing::ratio;
use crate::frame::{FrameContext, FrameHandle};
use crate::Result;

/// Durations at or below this are treated as instantaneous
pub const MIN_DURATION_MS: f64 = 1.0;

/// Lifecycle event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEventKind {
    Start,
    Run,
    Stop,
    End,
}

impl TimerEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            TimerEventKind::Start => "start",
            TimerEventKind::Run => "run",
            TimerEventKind::Stop => "stop",
            TimerEventKind::End => "end",
        }
    }
}

/// Payload passed to timer listeners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerEvent {
    pub kind: TimerEventKind,
    /// Eased progress in [0, 1]
    pub progress: f64,
    /// Linear completion, including carry-over from an interrupted run
    pub percent: f64,
    /// Milliseconds since the current run started
    pub elapsed_ms: f64,
}

impl TimerEvent {
    fn new(kind: TimerEventKind, progress: f64, percent: f64, elapsed_ms: f64) -> Self {
        Self { kind, progress, percent, elapsed_ms }
    }
}

/// Callback invoked with timer events. Panics are not caught.
pub type TimerListener = Rc<dyn Fn(&TimerEvent)>;

/// Immutable per-timer configuration
#[derive(Clone)]
pub struct TimerConfig {
    pub easing: EasingType,
    /// Total duration; `f64::INFINITY` never self-terminates
    pub duration_ms: f64,
    pub on_start: Option<TimerListener>,
    pub on_run: Option<TimerListener>,
    pub on_stop: Option<TimerListener>,
    pub on_end: Option<TimerListener>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            easing: EasingType::Linear,
            duration_ms: f64::INFINITY,
            on_start: None,
            on_run: None,
            on_stop: None,
            on_end: None,
        }
    }
}

impl TimerConfig {
    pub fn new(easing: EasingType, duration_ms: f64) -> Self {
        Self {
            easing,
            duration_ms,
            ..Default::default()
        }
    }

    /// Resolve the easing by name; unknown names are a configuration error
    pub fn with_easing_name(mut self, name: &str) -> Result<Self> {
        self.easing = name.parse()?;
        Ok(self)
    }

    pub fn on_start(mut self, listener: impl Fn(&TimerEvent) + 'static) -> Self {
        self.on_start = Some(Rc::new(listener));
        self
    }

    pub fn on_run(mut self, listener: impl Fn(&TimerEvent) + 'static) -> Self {
        self.on_run = Some(Rc::new(listener));
        self
    }

    pub fn on_stop(mut self, listener: impl Fn(&TimerEvent) + 'static) -> Self {
        self.on_stop = Some(Rc::new(listener));
        self
    }

    pub fn on_end(mut self, listener: impl Fn(&TimerEvent) + 'static) -> Self {
        self.on_end = Some(Rc::new(listener));
        self
    }
}

impl fmt::Debug for TimerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerConfig")
            .field("easing", &self.easing)
            .field("duration_ms", &self.duration_ms)
            .finish_non_exhaustive()
    }
}

/// Snapshot taken when a run is interrupted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingStop {
    pub percent: f64,
    pub elapsed_ms: f64,
}

/// Coarse lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Stopped,
    Finished,
}

#[derive(Debug, Default)]
struct TimerState {
    start_timestamp: f64,
    elapsed_ms: f64,
    clamped_elapsed_ms: f64,
    progress: f64,
    percent: f64,
    /// Percent carried over from the previous interrupted run
    finished_percent: f64,
    pending_stop: Option<PendingStop>,
    is_finished: bool,
    /// `end` already emitted for the current run
    end_emitted: bool,
    scheduled: Option<FrameHandle>,
}

struct TimerInner {
    config: TimerConfig,
    frames: FrameContext,
    state: RefCell<TimerState>,
}

/// Animation timer handle
///
/// Clones share state, so a listener may hold a clone and call
/// [`stop`](Self::stop) from inside a tick.
#[derive(Clone)]
pub struct AnimationTimer {
    inner: Rc<TimerInner>,
}

impl AnimationTimer {
    pub fn new(config: TimerConfig, frames: FrameContext) -> Self {
        Self {
            inner: Rc::new(TimerInner {
                config,
                frames,
                state: RefCell::new(TimerState::default()),
            }),
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.inner.config
    }

    /// Start (or resume) the animation
    ///
    /// No-op once finished. Near-zero durations complete synchronously.
    pub fn run(&self) {
        if self.inner.state.borrow().is_finished {
            return;
        }

        let config = &self.inner.config;
        if config.duration_ms <= MIN_DURATION_MS {
            {
                let mut state = self.inner.state.borrow_mut();
                state.is_finished = true;
                state.progress = 1.0;
                state.percent = 1.0;
            }
            debug!(duration_ms = config.duration_ms, "Instant animation, finishing immediately");
            emit(&config.on_run, TimerEvent::new(TimerEventKind::Run, 1.0, 1.0, 0.0));
            emit(&config.on_stop, TimerEvent::new(TimerEventKind::Stop, 1.0, 1.0, 0.0));
            self.stop();
            return;
        }

        let now = self.inner.frames.clock.now_ms();
        let carried = {
            let mut state = self.inner.state.borrow_mut();
            state.finished_percent = state.pending_stop.take().map_or(0.0, |stop| stop.percent);
            state.end_emitted = false;
            state.start_timestamp = now;
            state.elapsed_ms = 0.0;
            state.clamped_elapsed_ms = 0.0;
            state.progress = 0.0;
            state.percent = 0.0;
            state.finished_percent
        };
        debug!(
            easing = %config.easing,
            duration_ms = config.duration_ms,
            carried_percent = carried,
            "Animation started"
        );
        emit(&config.on_start, TimerEvent::new(TimerEventKind::Start, 0.0, 0.0, 0.0));

        // A start listener may already have stopped us
        if self.inner.state.borrow().pending_stop.is_some() {
            return;
        }
        self.schedule_tick();
    }

    /// Interrupt the animation and release the pending frame callback
    ///
    /// Emits `end` once per run; further calls are no-ops. Safe to call from
    /// inside a listener.
    pub fn stop(&self) {
        let (event, handle) = {
            let mut state = self.inner.state.borrow_mut();
            if state.end_emitted {
                return;
            }
            state.end_emitted = true;
            state.pending_stop = Some(PendingStop {
                percent: state.percent,
                elapsed_ms: state.clamped_elapsed_ms,
            });
            (
                TimerEvent::new(TimerEventKind::End, state.progress, 1.0, state.elapsed_ms),
                state.scheduled.take(),
            )
        };
        if let Some(handle) = handle {
            self.inner.frames.scheduler.cancel(handle);
        }
        debug!(
            percent = self.percent(),
            finished = self.is_finished(),
            "Animation released"
        );
        emit(&self.inner.config.on_end, event);
    }

    fn schedule_tick(&self) {
        let previous = self.inner.state.borrow_mut().scheduled.take();
        if let Some(handle) = previous {
            self.inner.frames.scheduler.cancel(handle);
        }
        let timer = self.clone();
        let handle = self
            .inner
            .frames
            .scheduler
            .schedule(Box::new(move || timer.tick()));
        self.inner.state.borrow_mut().scheduled = Some(handle);
    }

    fn tick(&self) {
        let config = &self.inner.config;
        let now = self.inner.frames.clock.now_ms();

        let (run_event, stop_event) = {
            let mut state = self.inner.state.borrow_mut();
            state.scheduled = None;
            state.elapsed_ms = now - state.start_timestamp;
            state.clamped_elapsed_ms = state.elapsed_ms.min(config.duration_ms);
            let linear = ratio(state.clamped_elapsed_ms, config.duration_ms);
            state.progress = config.easing.apply(linear);
            state.percent = linear + state.finished_percent;

            if state.percent >= 1.0 || state.pending_stop.is_some() {
                match state.pending_stop {
                    Some(stop) if stop.percent > 0.0 => {
                        state.percent = stop.percent;
                        state.clamped_elapsed_ms = stop.elapsed_ms;
                    }
                    _ => state.percent = 1.0,
                }
                let run = TimerEvent::new(TimerEventKind::Run, state.progress, state.percent, state.elapsed_ms);
                let stop = TimerEvent::new(TimerEventKind::Stop, state.progress, state.percent, state.elapsed_ms);
                (run, Some(stop))
            } else {
                let run = TimerEvent::new(TimerEventKind::Run, state.progress, state.percent, state.elapsed_ms);
                (run, None)
            }
        };

        emit(&config.on_run, run_event);

        match stop_event {
            Some(stop_event) => {
                emit(&config.on_stop, stop_event);
                if stop_event.percent >= 1.0 {
                    self.inner.state.borrow_mut().is_finished = true;
                    debug!(elapsed_ms = stop_event.elapsed_ms, "Animation finished");
                    self.stop();
                }
            }
            None => {
                // A run listener calling stop() cancels the loop synchronously
                if self.inner.state.borrow().pending_stop.is_none() {
                    self.schedule_tick();
                }
            }
        }
    }

    #[inline]
    pub fn percent(&self) -> f64 {
        self.inner.state.borrow().percent
    }

    #[inline]
    pub fn progress(&self) -> f64 {
        self.inner.state.borrow().progress
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.inner.state.borrow().elapsed_ms
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.inner.state.borrow().is_finished
    }

    /// Check if a frame callback is pending
    #[inline]
    pub fn is_running(&self) -> bool {
        self.inner.state.borrow().scheduled.is_some()
    }

    pub fn pending_stop(&self) -> Option<PendingStop> {
        self.inner.state.borrow().pending_stop
    }

    pub fn phase(&self) -> TimerPhase {
        let state = self.inner.state.borrow();
        if state.is_finished {
            TimerPhase::Finished
        } else if state.scheduled.is_some() {
            TimerPhase::Running
        } else if state.pending_stop.is_some() {
            TimerPhase::Stopped
        } else {
            TimerPhase::Idle
        }
    }
}

impl fmt::Debug for AnimationTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("AnimationTimer")
            .field("config", &self.inner.config)
            .field("percent", &state.percent)
            .field("progress", &state.progress)
            .field("pending_stop", &state.pending_stop)
            .field("is_finished", &state.is_finished)
            .finish()
    }
}

#[inline]
fn emit(listener: &Option<TimerListener>, event: TimerEvent) {
    if let Some(listener) = listener {
        listener(&event);
    }
}
