//! Session configuration.
//!
//! Every tunable of the detection loop lives in [`SessionConfig`]. It can be
//! built in code, starting from [`SessionConfig::default`], or loaded from a
//! JSON file:
//!
//! ```no_run
//! use impact_vision::SessionConfig;
//! use std::path::Path;
//!
//! let config = SessionConfig::from_json_file(Path::new("session.json"))?;
//! # Ok::<(), impact_vision::ImpactError>(())
//! ```
//!
//! Fields missing from the file keep their default value.

use crate::core_modules::color_mask::{ColorRange, MAX_HUE};
use crate::error::{ImpactError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;
pub const DEFAULT_MIN_BLOB_AREA: f64 = 100.0;
pub const DEFAULT_MARK_RADIUS: i32 = 10;
pub const DEFAULT_CALIBRATION_DELAY_MS: u64 = 3000;
pub const DEFAULT_KEY_POLL_MS: u64 = 1;

/// Complete configuration for an impact-detection session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Nominal frame width in pixels. Also the width of the virtual screen.
    pub frame_width: u32,
    /// Nominal frame height in pixels. Also the height of the virtual screen.
    pub frame_height: u32,
    /// HSV bounds of the ball colour.
    pub color_range: ColorRange,
    /// Blobs whose area is at or below this value are treated as noise.
    pub min_blob_area: f64,
    /// Radius of the mark painted for each impact.
    pub mark_radius: i32,
    /// Mirror every captured frame horizontally before detection.
    pub mirror_feed: bool,
    /// Pause given to the operator before the calibration frame is taken.
    pub calibration_delay_ms: u64,
    /// Timeout of the per-tick key poll.
    pub key_poll_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            color_range: ColorRange::default(),
            min_blob_area: DEFAULT_MIN_BLOB_AREA,
            mark_radius: DEFAULT_MARK_RADIUS,
            mirror_feed: true,
            calibration_delay_ms: DEFAULT_CALIBRATION_DELAY_MS,
            key_poll_ms: DEFAULT_KEY_POLL_MS,
        }
    }
}

impl SessionConfig {
    /// Loads a configuration from a JSON file and validates it.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_width == 0 {
            return Err(ImpactError::invalid("frame_width", self.frame_width));
        }
        if self.frame_height == 0 {
            return Err(ImpactError::invalid("frame_height", self.frame_height));
        }
        let ColorRange { lower, upper } = self.color_range;
        if lower[0] > MAX_HUE || upper[0] > MAX_HUE {
            return Err(ImpactError::invalid(
                "color_range.hue",
                format!("{}..={}", lower[0], upper[0]),
            ));
        }
        if lower.iter().zip(upper.iter()).any(|(lo, hi)| lo > hi) {
            return Err(ImpactError::invalid(
                "color_range",
                format!("{:?}..={:?}", lower, upper),
            ));
        }
        if self.min_blob_area.is_nan() || self.min_blob_area < 0.0 {
            return Err(ImpactError::invalid("min_blob_area", self.min_blob_area));
        }
        if self.mark_radius <= 0 {
            return Err(ImpactError::invalid("mark_radius", self.mark_radius));
        }
        Ok(())
    }

    pub fn calibration_delay(&self) -> Duration {
        Duration::from_millis(self.calibration_delay_ms)
    }

    pub fn key_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.key_poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_tennis_ball_setup() {
        let config = SessionConfig::default();
        assert_eq!((config.frame_width, config.frame_height), (640, 480));
        assert_eq!(config.color_range.lower, [20, 100, 100]);
        assert_eq!(config.color_range.upper, [30, 255, 255]);
        assert_eq!(config.min_blob_area, 100.0);
        assert_eq!(config.mark_radius, 10);
        assert_eq!(config.calibration_delay(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{ "mark_radius": 4, "mirror_feed": false }"#).unwrap();
        assert_eq!(config.mark_radius, 4);
        assert!(!config.mirror_feed);
        assert_eq!(config.frame_width, DEFAULT_FRAME_WIDTH);
        assert_eq!(config.color_range, ColorRange::default());
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut config = SessionConfig::default();
        config.min_blob_area = 250.0;
        config.color_range = ColorRange::new([100, 150, 50], [130, 255, 255]);

        config.to_json_file(&path).unwrap();
        let loaded = SessionConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn rejects_inverted_color_range() {
        let mut config = SessionConfig::default();
        config.color_range = ColorRange::new([30, 100, 100], [20, 255, 255]);
        assert!(matches!(
            config.validate(),
            Err(ImpactError::InvalidParameter { ref parameter, .. }) if parameter == "color_range"
        ));
    }

    #[test]
    fn rejects_out_of_range_hue_and_bad_sizes() {
        let mut config = SessionConfig::default();
        config.color_range = ColorRange::new([170, 0, 0], [200, 255, 255]);
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.mark_radius = 0;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.frame_height = 0;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.min_blob_area = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_file_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "mark_radius": -3 }"#).unwrap();
        assert!(matches!(
            SessionConfig::from_json_file(&path),
            Err(ImpactError::InvalidParameter { .. })
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            SessionConfig::from_json_file(&path),
            Err(ImpactError::Json(_))
        ));
    }
}
