use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::frame::frame_interval;
use crate::scroll::EasingType;
use crate::units::{Dimension, DEFAULT_REFERENCE_WIDTH};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log file; the TUI logs to stderr when unset
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

/// Smooth scrolling and end-reached configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Animate programmatic and keyboard scrolls
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Duration of animated scrolls in milliseconds
    #[serde(default = "default_animation_duration")]
    pub animation_duration_ms: u64,
    /// Easing curve used by the `trace` command; keyboard scrolls always ease out
    #[serde(default = "default_easing")]
    pub easing: EasingType,
    /// Frame rate while animating (0 = ~60fps fallback, at most 1000)
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Width of the reference design, in reference units
    #[serde(default = "default_reference_width")]
    pub reference_width: f64,
    /// Distance from the content end that triggers loading more
    #[serde(default = "default_end_reached_threshold")]
    pub end_reached_threshold: Dimension,
    /// Minimum milliseconds between scroll events (0 = no throttle)
    #[serde(default)]
    pub scroll_event_throttle_ms: u64,
    /// Scroll horizontally instead of vertically
    #[serde(default)]
    pub horizontal: bool,
    /// Lines per j/k press
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: u16,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            animation_duration_ms: default_animation_duration(),
            easing: default_easing(),
            animation_fps: default_animation_fps(),
            reference_width: default_reference_width(),
            end_reached_threshold: default_end_reached_threshold(),
            scroll_event_throttle_ms: 0,
            horizontal: false,
            scroll_lines: default_scroll_lines(),
        }
    }
}

impl ScrollConfig {
    /// Get tick duration for animation FPS
    #[inline]
    pub fn animation_tick_duration(&self) -> Duration {
        frame_interval(self.animation_fps)
    }

    /// Check if smooth scrolling is effectively enabled
    #[inline]
    pub fn is_smooth(&self) -> bool {
        self.smooth_enabled && self.animation_duration_ms > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Rows fetched per end-reached notification
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Simulated latency of loading a page
    #[serde(default = "default_load_delay")]
    pub load_delay_ms: u64,
    /// Draw a scrollbar next to the content
    #[serde(default = "default_true")]
    pub show_scroll_indicator: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            page_size: default_page_size(),
            load_delay_ms: default_load_delay(),
            show_scroll_indicator: default_true(),
        }
    }
}

const KNOWN_SECTIONS: [&str; 3] = ["general", "scroll", "ui"];

/// Highest frame rate with a whole-millisecond frame interval
pub const MAX_ANIMATION_FPS: u32 = 1000;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_animation_duration() -> u64 {
    400
}

fn default_easing() -> EasingType {
    EasingType::EaseOutSine
}

fn default_animation_fps() -> u32 {
    60
}

fn default_reference_width() -> f64 {
    DEFAULT_REFERENCE_WIDTH
}

fn default_end_reached_threshold() -> Dimension {
    Dimension::Units(10.0)
}

fn default_scroll_lines() -> u16 {
    1
}

fn default_tick_rate() -> u64 {
    100
}

fn default_page_size() -> usize {
    40
}

fn default_load_delay() -> u64 {
    300
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        for section in table.keys() {
            if !KNOWN_SECTIONS.contains(&section.as_str()) {
                warn!(section = %section, "Ignoring unknown config section");
            }
        }
        let config: Self = toml::Value::Table(table).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.scroll.reference_width <= 0.0 {
            return Err(crate::Error::Config(format!(
                "scroll.reference_width must be positive, got {}",
                self.scroll.reference_width
            )));
        }
        if self.scroll.animation_fps > MAX_ANIMATION_FPS {
            return Err(crate::Error::Config(format!(
                "scroll.animation_fps must be at most {}, got {}",
                MAX_ANIMATION_FPS, self.scroll.animation_fps
            )));
        }
        if self.ui.page_size == 0 {
            return Err(crate::Error::Config("ui.page_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scrollview/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollview")
            .join("config.toml")
    }

    /// Directory for runtime files such as the default TUI log
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scrollview")
    }

    /// Get the log file path (with tilde expansion)
    pub fn log_file(&self) -> Option<PathBuf> {
        self.general.log_file.as_deref().map(expand_tilde)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScrollConfig::default();
        assert!(config.smooth_enabled);
        assert_eq!(config.animation_duration_ms, 400);
        assert_eq!(config.easing, EasingType::EaseOutSine);
        assert_eq!(config.scroll_lines, 1);
        assert_eq!(config.animation_fps, 60);
        assert_eq!(config.reference_width, 750.0);
        assert_eq!(config.end_reached_threshold, Dimension::Units(10.0));
    }

    #[test]
    fn test_animation_tick_fallback() {
        let config = ScrollConfig {
            animation_fps: 0,
            ..Default::default()
        };
        assert_eq!(config.animation_tick_duration(), Duration::from_millis(16));
    }

    #[test]
    fn test_is_smooth() {
        let mut config = ScrollConfig::default();
        assert!(config.is_smooth());

        config.smooth_enabled = false;
        assert!(!config.is_smooth());

        config.smooth_enabled = true;
        config.animation_duration_ms = 0;
        assert!(!config.is_smooth());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [scroll]
            easing = "linear"
            end_reached_threshold = "20px"

            [ui]
            page_size = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.scroll.easing, EasingType::Linear);
        assert_eq!(config.scroll.end_reached_threshold, Dimension::Text("20px".into()));
        assert_eq!(config.scroll.animation_duration_ms, 400);
        assert_eq!(config.ui.page_size, 10);
        assert_eq!(config.ui.tick_rate_ms, 100);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_unknown_easing_is_config_error() {
        let err = AppConfig::from_toml("[scroll]\neasing = \"wobble\"\n").unwrap_err();
        assert!(err.to_string().contains("wobble"), "{}", err);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_toml("[scroll]\nreference_width = 0.0\n").is_err());
        assert!(AppConfig::from_toml("[ui]\npage_size = 0\n").is_err());
        assert!(AppConfig::from_toml("[scroll]\nanimation_fps = 2000\n").is_err());

        let config = AppConfig::from_toml("[scroll]\nanimation_fps = 1000\n").unwrap();
        assert_eq!(config.scroll.animation_tick_duration(), Duration::from_millis(1));
    }

    #[test]
    fn test_unknown_section_is_ignored() {
        let config = AppConfig::from_toml("[keymap]\nquit = \"q\"\n\n[ui]\npage_size = 5\n").unwrap();
        assert_eq!(config.ui.page_size, 5);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.scroll, config.scroll);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("scrollview-test-missing").join("config.toml");
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.ui.page_size, 40);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("scrollview-test-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut config = AppConfig::default();
        config.scroll.animation_duration_ms = 250;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.scroll.animation_duration_ms, 250);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
