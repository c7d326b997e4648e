//! Configuration Management

use crate::motion::smoothing::SmoothingSeed;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source frame geometry
    pub frame: FrameConfig,
    /// Target screen
    pub screen: ScreenConfig,
    /// Gesture thresholds
    pub gesture: GestureConfig,
    /// Cursor smoothing
    pub smoothing: SmoothingConfig,
    /// External tracker process
    #[serde(default)]
    pub tracker: TrackerConfig,
}

/// Source frame configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Camera frame width (pixels)
    pub source_frame_width: u32,
    /// Camera frame height (pixels)
    pub source_frame_height: u32,
    /// Inset from each frame edge bounding the active tracking area (pixels)
    pub frame_margin: f64,
    /// Flip x so a mirrored camera image moves the cursor the natural way
    pub mirror_x: bool,
}

/// Target screen configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub screen_width: u32,
    pub screen_height: u32,
}

/// Gesture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Index-middle tip distance below which a pinch closes (source pixels)
    pub click_trigger_distance: f64,
    /// Distance above which a closed pinch opens again (source pixels)
    pub click_release_distance: f64,
    /// Only treat the index-only pose as pointing when the thumb is folded too
    pub require_thumb_retracted: bool,
    /// Hands reported below this confidence are ignored
    pub min_detection_confidence: f64,
}

/// Smoothing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Exponential smoothing factor α in (0, 1); lower is smoother but laggier
    pub smoothing_factor: f64,
    /// Initial cursor position
    pub seed: SmoothingSeed,
}

/// Tracker process configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Program printing one JSON detection per line on stdout
    pub command: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            source_frame_width: 640,
            source_frame_height: 480,
            frame_margin: 100.0,
            mirror_x: true,
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_trigger_distance: 25.0,
            click_release_distance: 35.0,
            require_thumb_retracted: true,
            min_detection_confidence: 0.5,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 1.0 / 7.0,
            seed: SmoothingSeed::ScreenCenter,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            command: "python3".to_string(),
            args: vec!["hand_tracker.py".to_string()],
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let f = &self.frame;
        if f.source_frame_width == 0 || f.source_frame_height == 0 {
            return Err(crate::Error::Config(format!(
                "source frame size must be positive, got {}x{}",
                f.source_frame_width, f.source_frame_height
            )));
        }
        if !(f.frame_margin >= 0.0)
            || 2.0 * f.frame_margin >= f.source_frame_width as f64
            || 2.0 * f.frame_margin >= f.source_frame_height as f64
        {
            return Err(crate::Error::Config(format!(
                "frame_margin {} leaves no active area in a {}x{} frame",
                f.frame_margin, f.source_frame_width, f.source_frame_height
            )));
        }
        if self.screen.screen_width == 0 || self.screen.screen_height == 0 {
            return Err(crate::Error::Config(format!(
                "screen size must be positive, got {}x{}",
                self.screen.screen_width, self.screen.screen_height
            )));
        }
        let g = &self.gesture;
        if !(g.click_trigger_distance > 0.0 && g.click_trigger_distance.is_finite()) {
            return Err(crate::Error::Config(format!(
                "click_trigger_distance must be > 0, got {}",
                g.click_trigger_distance
            )));
        }
        if !(g.click_release_distance > g.click_trigger_distance
            && g.click_release_distance.is_finite())
        {
            return Err(crate::Error::Config(format!(
                "click_release_distance ({}) must be greater than click_trigger_distance ({})",
                g.click_release_distance, g.click_trigger_distance
            )));
        }
        if !(0.0..=1.0).contains(&g.min_detection_confidence) {
            return Err(crate::Error::Config(format!(
                "min_detection_confidence must be in [0, 1], got {}",
                g.min_detection_confidence
            )));
        }
        let alpha = self.smoothing.smoothing_factor;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(crate::Error::Config(format!(
                "smoothing_factor must be in (0, 1), got {}",
                alpha
            )));
        }
        Ok(())
    }

    /// Copy of this config recalibrated for a different source frame size.
    ///
    /// The margin and pinch distances are pixel quantities of the source
    /// frame, so they scale with it. The smaller of the two axis ratios is
    /// used for the distances, keeping them conservative for non-uniform
    /// changes in aspect ratio.
    pub fn rescaled_for_frame(&self, width: u32, height: u32) -> Config {
        let mut out = self.clone();
        if width == 0 || height == 0 {
            return out;
        }
        let sx = width as f64 / self.frame.source_frame_width as f64;
        let sy = height as f64 / self.frame.source_frame_height as f64;
        let s = sx.min(sy);

        out.frame.source_frame_width = width;
        out.frame.source_frame_height = height;
        out.frame.frame_margin = self.frame.frame_margin * s;
        out.gesture.click_trigger_distance = self.gesture.click_trigger_distance * s;
        out.gesture.click_release_distance = self.gesture.click_release_distance * s;
        out
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Directory holding config and recordings
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".hand_mouse"))
            .unwrap_or_else(|| PathBuf::from(".hand_mouse"))
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Value at a dotted key such as `gesture.click_trigger_distance`
    pub fn get_value(&self, key: &str) -> Result<Option<toml::Value>, crate::Error> {
        let table = parse_table(&self.to_toml()?)?;
        Ok(lookup(&table, key).cloned())
    }
}

/// Replace the value at a dotted key in a TOML document and return the
/// re-rendered document. `value` is read as a TOML literal (number, bool,
/// array, quoted string) and kept as a plain string otherwise. The key must
/// already exist.
pub fn set_toml_value(toml_str: &str, key: &str, value: &str) -> Result<String, crate::Error> {
    let mut table = parse_table(toml_str)?;
    let slot = lookup_mut(&mut table, key)
        .ok_or_else(|| crate::Error::Config(format!("Unknown configuration key '{}'", key)))?;
    *slot = parse_value(value);
    toml::to_string_pretty(&table).map_err(|e| crate::Error::Config(e.to_string()))
}

fn parse_table(toml_str: &str) -> Result<toml::Table, crate::Error> {
    toml_str
        .parse::<toml::Table>()
        .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
}

fn parse_value(value: &str) -> toml::Value {
    format!("value = {}", value)
        .parse::<toml::Table>()
        .ok()
        .and_then(|mut t| t.remove("value"))
        .unwrap_or_else(|| toml::Value::String(value.to_string()))
}

fn lookup<'a>(table: &'a toml::Table, key: &str) -> Option<&'a toml::Value> {
    let mut parts = key.split('.');
    let mut current = table.get(parts.next()?)?;
    for part in parts {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

fn lookup_mut<'a>(table: &'a mut toml::Table, key: &str) -> Option<&'a mut toml::Value> {
    let mut parts = key.split('.');
    let mut current = table.get_mut(parts.next()?)?;
    for part in parts {
        current = current.as_table_mut()?.get_mut(part)?;
    }
    Some(current)
}
