//! Dimension to pixel conversion
//!
//! Dimensions are either bare numbers, interpreted in reference units, or
//! strings: `"40"` and `"40rpx"` are reference units, `"40px"` is literal
//! pixels. Reference units scale by the device ratio
//! `viewport_width / reference_width`, computed once when the converter is
//! built.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Width of the reference design, in reference units
pub const DEFAULT_REFERENCE_WIDTH: f64 = 750.0;

/// A length as written by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Units(f64),
    Text(String),
}

impl Dimension {
    /// Absolute device pixels, bypassing the reference ratio
    pub fn px(pixels: u64) -> Self {
        Dimension::Text(format!("{}px", pixels))
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::Units(0.0)
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Dimension::Units(value)
    }
}

impl From<i32> for Dimension {
    fn from(value: i32) -> Self {
        Dimension::Units(value as f64)
    }
}

impl From<&str> for Dimension {
    fn from(value: &str) -> Self {
        Dimension::Text(value.to_string())
    }
}

impl From<String> for Dimension {
    fn from(value: String) -> Self {
        Dimension::Text(value)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Units(value) => write!(f, "{}", value),
            Dimension::Text(text) => f.write_str(text),
        }
    }
}

fn dimension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)(r?px)?$").expect("dimension pattern is valid"))
}

/// Converts dimensions into device pixels using a fixed device ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    ratio: f64,
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl UnitConverter {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    /// Derive the device ratio from a measured viewport width
    pub fn from_viewport(viewport_width: f64, reference_width: f64) -> Self {
        let reference_width = if reference_width > 0.0 {
            reference_width
        } else {
            DEFAULT_REFERENCE_WIDTH
        };
        Self::new(viewport_width / reference_width)
    }

    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Convert leniently: malformed strings become `0`
    pub fn to_pixels(&self, value: &Dimension) -> f64 {
        match value {
            Dimension::Units(units) => units * self.ratio,
            Dimension::Text(text) => self.parse(text).unwrap_or(0.0),
        }
    }

    /// Convert strictly, rejecting strings that are not `N`, `Nrpx` or `Npx`
    pub fn parse(&self, text: &str) -> Result<f64> {
        let captures = dimension_pattern()
            .captures(text)
            .ok_or_else(|| Error::InvalidDimension(text.to_string()))?;
        let amount: f64 = captures[1]
            .parse()
            .map_err(|_| Error::InvalidDimension(text.to_string()))?;

        match captures.get(2).map(|m| m.as_str()) {
            Some("px") => Ok(amount),
            _ => Ok(amount * self.ratio),
        }
    }

    /// Convert a caller-supplied dimension, surfacing malformed strings
    pub fn resolve(&self, value: &Dimension) -> Result<f64> {
        match value {
            Dimension::Units(units) => Ok(units * self.ratio),
            Dimension::Text(text) => self.parse(text),
        }
    }
}
