//! Canvas configuration
//!
//! Options can be built in code or read from a TOML file:
//!
//! ```toml
//! fps = 60
//! anti_alias = false
//! background_color = { r = 20, g = 20, b = 30 }
//! ```
//!
//! Missing keys take their defaults.

use easel_core::{Color, EaselError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Options recognized by [`Canvas`](crate::Canvas)
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasOptions {
    /// Newly created elements are rendered without an explicit attach
    pub auto_add: bool,
    /// Keep content centered when the canvas is resized
    pub auto_center: bool,
    pub anti_alias: bool,
    pub background_color: Color,
    /// Ticks per second of the frame clock
    pub fps: u32,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            auto_add: true,
            auto_center: true,
            anti_alias: true,
            background_color: Color::WHITE,
            fps: 30,
        }
    }
}

impl CanvasOptions {
    /// Parse options from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: CanvasOptions = toml::from_str(content)
            .map_err(|e| EaselError::configuration(format!("invalid canvas options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EaselError::configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| EaselError::configuration(format!("failed to serialize options: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(EaselError::configuration("fps must be greater than zero"));
        }
        Ok(())
    }

    /// Wall-clock time between two ticks
    pub fn frame_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.fps.max(1)))
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_auto_add(mut self, auto_add: bool) -> Self {
        self.auto_add = auto_add;
        self
    }

    pub fn with_auto_center(mut self, auto_center: bool) -> Self {
        self.auto_center = auto_center;
        self
    }

    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CanvasOptions::default();
        assert!(options.auto_add && options.auto_center && options.anti_alias);
        assert_eq!(options.background_color, Color::WHITE);
        assert_eq!(options.fps, 30);
        assert_eq!(options.frame_period(), Duration::from_micros(33_333));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let options = CanvasOptions::from_toml_str(
            "fps = 60\nanti_alias = false\nbackground_color = { r = 20, g = 20, b = 30 }\n",
        )
        .unwrap();
        assert_eq!(options.fps, 60);
        assert!(!options.anti_alias);
        assert!(options.auto_add);
        assert_eq!(options.background_color, Color::rgb(20, 20, 30));
    }

    #[test]
    fn test_zero_fps_rejected() {
        let err = CanvasOptions::from_toml_str("fps = 0").unwrap_err();
        assert!(matches!(err, EaselError::Configuration(_)));
        assert!(CanvasOptions::default().with_fps(0).validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let options = CanvasOptions::default()
            .with_fps(24)
            .with_background_color(Color::BLACK);
        let text = options.to_toml_string().unwrap();
        assert_eq!(CanvasOptions::from_toml_str(&text).unwrap(), options);
    }
}
