//! Leading-edge throttle for scroll event dispatch

/// Lets one call through per `interval_ms` window
#[derive(Debug, Clone, Copy, Default)]
pub struct Throttle {
    interval_ms: f64,
    last_fired_ms: Option<f64>,
}

impl Throttle {
    /// An interval of `0` disables throttling
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms as f64,
            last_fired_ms: None,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.interval_ms > 0.0
    }

    /// Returns true if a call at `now_ms` may proceed, and records it
    pub fn try_fire(&mut self, now_ms: f64) -> bool {
        if !self.is_enabled() {
            return true;
        }
        match self.last_fired_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_fired_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_fired_ms = None;
    }
}
