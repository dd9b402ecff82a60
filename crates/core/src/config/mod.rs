use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{FxError, Result};

/// Top-level configuration structure for the page effects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    pub ambient: AmbientConfig,
    pub confetti: ConfettiConfig,
    pub page: PageConfig,
}

impl FxConfig {
    /// Parses a configuration from JSON. Missing sections and fields keep
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        // NaN fails this comparison too.
        if !(self.page.frame_interval_ms > 0.0) {
            return Err(FxError::InvalidInput("frame_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Loads a JSON configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Tuning for the ambient particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    /// Viewports narrower than this many pixels get the narrow pool.
    pub breakpoint: f32,
    pub narrow_count: usize,
    pub wide_count: usize,
    /// Opacity at which a growing particle flips to shrinking.
    pub opacity_ceiling: f32,
    /// Distance past the top or side edges before a particle is recycled.
    pub edge_margin: f32,
    pub core_color: String,
    pub halo_color: String,
    /// Halo radius as a multiple of the core radius.
    pub halo_scale: f32,
    /// Halo alpha as a fraction of the core opacity.
    pub halo_alpha: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            breakpoint: 768.0,
            narrow_count: 40,
            wide_count: 80,
            opacity_ceiling: 0.7,
            edge_margin: 10.0,
            core_color: "#D4A853".to_string(),
            halo_color: "#FFD700".to_string(),
            halo_scale: 2.0,
            halo_alpha: 0.2,
        }
    }
}

/// Tuning for the confetti burst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfettiConfig {
    pub piece_count: usize,
    /// Added to every live piece's vertical velocity once per frame.
    pub gravity: f32,
    /// Subtracted from a piece's opacity per frame once it is below the
    /// bottom edge.
    pub fade_step: f32,
    /// Hard stop for the whole batch, measured from launch.
    pub timeout_ms: u64,
    pub palette: Vec<String>,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            piece_count: 200,
            gravity: 0.05,
            fade_step: 0.02,
            timeout_ms: 6_000,
            palette: [
                "#D4A853", "#F0D78C", "#FFD700", "#B8860B", "#E8D5B7", "#FF6B6B", "#FF8E53",
                "#48BB78", "#E53E3E", "#9F7AEA",
            ]
            .iter()
            .map(|hex| hex.to_string())
            .collect(),
        }
    }
}

/// Settings for the non-animated page features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Countdown target as milliseconds since the Unix epoch.
    pub countdown_target_ms: i64,
    pub rsvp_endpoint: String,
    pub music_volume: f32,
    /// Simulated display refresh interval used by headless drivers.
    pub frame_interval_ms: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            // 2026-03-10T00:00:00+05:30
            countdown_target_ms: 1_773_081_000_000,
            rsvp_endpoint: "https://weeding-invitation-backend.vercel.app/api/rsvp".to_string(),
            music_volume: 0.4,
            frame_interval_ms: 1000.0 / 60.0,
        }
    }
}
