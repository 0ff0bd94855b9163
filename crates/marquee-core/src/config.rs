use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::media::{MediaQuery, PointerKind, Viewport};
use crate::{Error, Result};

/// Attribute prefix used on the host element (`data-mc-duration`, ...)
pub const ATTRIBUTE_PREFIX: &str = "data-mc-";

/// Horizontal flow of the strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Content travels left to right
    Ltr,
    /// Content travels right to left
    #[default]
    Rtl,
    /// Right to left, reversed while the page scrolls up
    Auto,
}

impl Direction {
    /// Sign of the timeline's playback speed when it is built
    pub fn initial_time_scale(self) -> f64 {
        match self {
            Direction::Ltr => -1.0,
            Direction::Rtl | Direction::Auto => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
            Direction::Auto => "auto",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ltr" => Ok(Direction::Ltr),
            "rtl" => Ok(Direction::Rtl),
            "auto" => Ok(Direction::Auto),
            _ => Err(Error::InvalidAttribute {
                name: "direction".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Declarative widget attributes as written on the element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarqueeAttributes {
    /// Seconds for one full loop
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Skew angle in degrees
    #[serde(default)]
    pub skew: Option<f64>,
    /// Active only below this viewport width (px)
    #[serde(default)]
    pub max: Option<f64>,
    /// Active only from this viewport width (px); wins over `max`
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub direction: Direction,
}

impl Default for MarqueeAttributes {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            skew: None,
            max: None,
            min: None,
            direction: Direction::default(),
        }
    }
}

impl MarqueeAttributes {
    /// Parse `data-mc-*` attribute pairs. Unrelated attributes are ignored,
    /// empty values count as absent, and malformed values fall back to their
    /// defaults with a warning.
    pub fn from_dataset<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut attrs = Self::default();

        for (key, value) in attributes {
            let Some(name) = key.strip_prefix(ATTRIBUTE_PREFIX) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match name {
                "duration" => {
                    attrs.duration = parse_number(name, value)
                        .filter(|secs| *secs > 0.0)
                        .unwrap_or_else(|| {
                            warn!(value, "Ignoring invalid duration, using default");
                            default_duration()
                        })
                }
                "skew" => attrs.skew = parse_number(name, value),
                "max" => attrs.max = parse_number(name, value).filter(|px| *px >= 0.0),
                "min" => attrs.min = parse_number(name, value).filter(|px| *px >= 0.0),
                "direction" => {
                    attrs.direction = value.parse().unwrap_or_else(|_| {
                        warn!(value, "Unknown direction, using rtl");
                        Direction::Rtl
                    })
                }
                _ => {}
            }
        }

        attrs
    }
}

fn parse_number(name: &str, value: &str) -> Option<f64> {
    let parsed = value.parse::<f64>().ok().filter(|v| v.is_finite());
    if parsed.is_none() {
        warn!(name, value, "Ignoring non-numeric attribute");
    }
    parsed
}

/// Timing and sizing knobs shared by every widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Trailing-edge resize debounce
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Extra items beyond what covers the container
    #[serde(default = "default_clone_padding")]
    pub clone_padding: usize,
    /// Upper bound on items for degenerate metrics
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            clone_padding: default_clone_padding(),
            max_items: default_max_items(),
        }
    }
}

/// Resolved, immutable widget configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeConfig {
    pub duration: Duration,
    pub skew_degrees: Option<f64>,
    /// Condition gating replication, skew, animation and scroll reversal
    pub breakpoint: MediaQuery,
    pub direction: Direction,
    pub debounce: Duration,
    pub clone_padding: usize,
    pub max_items: usize,
}

impl MarqueeConfig {
    pub fn resolve(attrs: &MarqueeAttributes) -> Result<Self> {
        Self::resolve_with(attrs, &TuningConfig::default())
    }

    pub fn resolve_with(attrs: &MarqueeAttributes, tuning: &TuningConfig) -> Result<Self> {
        let duration = Duration::try_from_secs_f64(attrs.duration)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| Error::InvalidAttribute {
                name: "duration".to_string(),
                value: attrs.duration.to_string(),
            })?;
        if let Some(skew) = attrs.skew {
            if !skew.is_finite() {
                return Err(Error::InvalidAttribute {
                    name: "skew".to_string(),
                    value: skew.to_string(),
                });
            }
        }
        for (name, px) in [("max", attrs.max), ("min", attrs.min)] {
            if let Some(px) = px {
                if !(px.is_finite() && px >= 0.0) {
                    return Err(Error::InvalidAttribute {
                        name: name.to_string(),
                        value: px.to_string(),
                    });
                }
            }
        }
        if tuning.max_items == 0 {
            return Err(Error::Config("max_items must be at least 1".to_string()));
        }

        Ok(Self {
            duration,
            skew_degrees: attrs.skew,
            breakpoint: resolve_breakpoint(attrs.max, attrs.min),
            direction: attrs.direction,
            debounce: Duration::from_millis(tuning.debounce_ms),
            clone_padding: tuning.clone_padding,
            max_items: tuning.max_items,
        })
    }
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs_f64(default_duration()),
            skew_degrees: None,
            breakpoint: MediaQuery::Always,
            direction: Direction::default(),
            debounce: Duration::from_millis(default_debounce_ms()),
            clone_padding: default_clone_padding(),
            max_items: default_max_items(),
        }
    }
}

/// Derive the single breakpoint condition. `min` overrides `max`.
pub fn resolve_breakpoint(max: Option<f64>, min: Option<f64>) -> MediaQuery {
    match (max, min) {
        (Some(max), Some(min)) => {
            warn!(max, min, "Both max and min breakpoints set, using min");
            MediaQuery::at_least(min)
        }
        (None, Some(min)) => MediaQuery::at_least(min),
        (Some(max), None) => MediaQuery::below(max),
        (None, None) => MediaQuery::Always,
    }
}

/// Animation engine settings, handed to the engine once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Warn when a tween is created without targets
    #[serde(default)]
    pub null_target_warn: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            null_target_warn: false,
        }
    }
}

/// Simulated page used by the preview and the scenario runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f64,
    #[serde(default = "default_viewport_height")]
    pub height: f64,
    #[serde(default)]
    pub pointer: PointerKind,
    /// Measured width of the template item
    #[serde(default = "default_template_width")]
    pub template_width: f64,
    /// Widget offset from the top of the page
    #[serde(default = "default_widget_top")]
    pub widget_top: f64,
    #[serde(default = "default_widget_height")]
    pub widget_height: f64,
    #[serde(default = "default_page_height")]
    pub page_height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
            pointer: PointerKind::default(),
            template_width: default_template_width(),
            widget_top: default_widget_top(),
            widget_height: default_widget_height(),
            page_height: default_page_height(),
        }
    }
}

impl ViewportConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height, self.pointer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Idle tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while the strip is playing
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Text rendered inside the template item
    #[serde(default = "default_item_text")]
    pub item_text: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            item_text: default_item_text(),
        }
    }
}

impl UiConfig {
    pub fn frame_duration(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis(1000 / self.animation_fps as u64)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub marquee: MarqueeAttributes,
    #[serde(default)]
    pub tuning: TuningConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_duration() -> f64 {
    20.0
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_clone_padding() -> usize {
    3
}

fn default_max_items() -> usize {
    512
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    800.0
}

fn default_template_width() -> f64 {
    300.0
}

fn default_widget_top() -> f64 {
    1200.0
}

fn default_widget_height() -> f64 {
    120.0
}

fn default_page_height() -> f64 {
    4000.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    30
}

fn default_item_text() -> String {
    " MARQUEE * ".to_string()
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Always ~/.config/marquee/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("marquee")
            .join("config.toml")
    }

    pub fn marquee_config(&self) -> Result<MarqueeConfig> {
        MarqueeConfig::resolve_with(&self.marquee, &self.tuning)
    }
}
