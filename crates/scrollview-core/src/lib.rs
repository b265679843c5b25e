pub mod config;
pub mod error;
pub mod frame;
pub mod scroll;
pub mod surface;
pub mod units;

pub use config::{AppConfig, ScrollConfig, UiConfig};
pub use error::{Error, Result};
pub use frame::{FrameContext, FrameLoop, FrameScheduler};
pub use scroll::EasingType;
pub use units::{Dimension, UnitConverter};
