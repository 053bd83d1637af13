use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Config format this build reads and writes.
pub const CONFIG_FORMAT_VERSION: Version = Version::new(1, 0, 0);

/// Tunable interaction thresholds. Every field falls back to its default
/// when missing from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub format_version: Version,
    /// Pointer travel before a press becomes a drag or marquee.
    pub drag_threshold_px: f64,
    pub min_interactive_width_px: f64,
    /// Distance from the top/bottom edge that triggers marquee auto-scroll.
    pub auto_scroll_edge_px: f64,
    pub auto_scroll_lines: u32,
    pub auto_scroll_interval_ms: u64,
    pub line_height_px: f64,
    /// Horizontal scroll per wheel line.
    pub wheel_scroll_px: f64,
    pub zoom_step: f64,
    /// Zoom step while the fine-zoom modifier (Shift) is held.
    pub fine_zoom_step: f64,
    pub snap_enabled: bool,
    pub snap_threshold_px: f64,
    pub track_height_step_px: f64,
    /// Width of the resize grip at each end of a clip.
    pub edge_grip_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            format_version: CONFIG_FORMAT_VERSION,
            drag_threshold_px: 5.0,
            min_interactive_width_px: 1.0,
            auto_scroll_edge_px: 16.0,
            auto_scroll_lines: 2,
            auto_scroll_interval_ms: 25,
            line_height_px: 16.0,
            wheel_scroll_px: 20.0,
            zoom_step: 0.4,
            fine_zoom_step: 0.2,
            snap_enabled: true,
            snap_threshold_px: 8.0,
            track_height_step_px: 8.0,
            edge_grip_px: 6.0,
        }
    }
}

impl EngineConfig {
    pub fn auto_scroll_interval(&self) -> Duration {
        Duration::from_millis(self.auto_scroll_interval_ms)
    }

    /// Pixels scrolled by one marquee auto-scroll step.
    pub fn auto_scroll_step_px(&self) -> f64 {
        self.auto_scroll_lines as f64 * self.line_height_px
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.check_version()?;
        info!("loaded engine config {} from {}", config.format_version, path.display());
        Ok(config)
    }

    /// Load `path`, falling back to defaults when it is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("using default engine config ({}): {err}", path.display());
                Self::default()
            }
        }
    }

    fn check_version(&self) -> Result<()> {
        if self.format_version.major != CONFIG_FORMAT_VERSION.major {
            return Err(CoreError::UnsupportedConfigVersion {
                found: self.format_version.clone(),
                supported: CONFIG_FORMAT_VERSION,
            });
        }
        Ok(())
    }
}
