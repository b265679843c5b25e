//! Pure easing functions for scroll animations
//!
//! Every curve maps input progress in [0, 1] to eased progress in [0, 1].
//! The set is closed: names are resolved to an [`EasingType`] once, when a
//! timer is configured, and unknown names are rejected there.

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Easing curve applied to linear time progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EasingType {
    /// Jump straight to the end value on completion
    None,
    /// f(x) = x
    #[default]
    Linear,
    /// f(x) = sin(x·π/2)
    EaseOutSine,
    /// f(x) = 1 - (1-x)³
    Cubic,
    /// f(x) = 1 - (1-x)⁵
    Quintic,
    /// f(x) = 1 - 2^(-10x)
    EaseOut,
}

impl EasingType {
    pub const ALL: [EasingType; 6] = [
        EasingType::None,
        EasingType::Linear,
        EasingType::EaseOutSine,
        EasingType::Cubic,
        EasingType::Quintic,
        EasingType::EaseOut,
    ];

    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `x` - Progress value, clamped into [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        match self {
            EasingType::None => if x < 1.0 { 0.0 } else { 1.0 },
            EasingType::Linear => x,
            EasingType::EaseOutSine => sine_ease_out(x),
            EasingType::Cubic => cubic_ease_out(x),
            EasingType::Quintic => quintic_ease_out(x),
            EasingType::EaseOut => exponential_ease_out(x),
        }
    }

    /// Canonical name, as accepted by [`FromStr`] and the config file
    pub fn name(&self) -> &'static str {
        match self {
            EasingType::None => "none",
            EasingType::Linear => "linear",
            EasingType::EaseOutSine => "easeOutSine",
            EasingType::Cubic => "cubic",
            EasingType::Quintic => "quintic",
            EasingType::EaseOut => "easeOut",
        }
    }
}

impl fmt::Display for EasingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EasingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept camelCase, kebab-case and snake_case spellings
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "none" => Ok(EasingType::None),
            "linear" => Ok(EasingType::Linear),
            "easeoutsine" => Ok(EasingType::EaseOutSine),
            "cubic" => Ok(EasingType::Cubic),
            "quintic" => Ok(EasingType::Quintic),
            "easeout" => Ok(EasingType::EaseOut),
            _ => Err(Error::UnknownEasing(s.to_string())),
        }
    }
}

impl TryFrom<String> for EasingType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EasingType> for String {
    fn from(value: EasingType) -> Self {
        value.name().to_string()
    }
}

/// Sine ease-out: f(x) = sin(x·π/2)
#[inline]
fn sine_ease_out(x: f64) -> f64 {
    (x * FRAC_PI_2).sin()
}

/// Cubic ease-out: f(x) = 1 - (1-x)³
#[inline]
fn cubic_ease_out(x: f64) -> f64 {
    let inv = 1.0 - x;
    1.0 - inv * inv * inv
}

/// Quintic ease-out: f(x) = 1 - (1-x)⁵
#[inline]
fn quintic_ease_out(x: f64) -> f64 {
    let inv = 1.0 - x;
    1.0 - inv * inv * inv * inv * inv
}

/// Exponential ease-out: f(x) = 1 - 2^(-10x)
#[inline]
fn exponential_ease_out(x: f64) -> f64 {
    if x >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * x)
    }
}
