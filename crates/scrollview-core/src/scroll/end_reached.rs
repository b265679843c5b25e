//! Edge-triggered "end reached" detection for infinite loading
//!
//! A notification fires when the viewport is within the threshold of the
//! content end, the user is scrolling towards the end, and the content length
//! differs from the length seen at the last notification. The scroll distance
//! is remembered on every evaluation, the content length only when firing:
//! staying at the end without new content never refires.

use tracing::debug;

use crate::surface::AxisMetrics;
use crate::units::{Dimension, UnitConverter};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EndReachedDetector {
    last_scroll_distance: f64,
    last_content_size: f64,
}

impl EndReachedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one scroll event; returns whether to notify
    pub fn evaluate(
        &mut self,
        metrics: AxisMetrics,
        threshold: &Dimension,
        units: &UnitConverter,
    ) -> bool {
        let threshold_px = units.to_pixels(threshold);
        let is_near_end = metrics.remaining() < threshold_px;
        let is_advancing = metrics.distance > self.last_scroll_distance;
        let is_new_content = metrics.content_size != self.last_content_size;

        self.last_scroll_distance = metrics.distance;

        if is_near_end && is_advancing && is_new_content {
            debug!(
                distance = metrics.distance,
                content_size = metrics.content_size,
                threshold_px,
                "End reached"
            );
            self.last_content_size = metrics.content_size;
            return true;
        }
        false
    }

    /// Forget everything observed so far
    pub fn reset(&mut self) {
        self.last_scroll_distance = 0.0;
        self.last_content_size = 0.0;
    }

    #[inline]
    pub fn last_scroll_distance(&self) -> f64 {
        self.last_scroll_distance
    }

    #[inline]
    pub fn last_content_size(&self) -> f64 {
        self.last_content_size
    }
}
