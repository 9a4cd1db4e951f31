//! Viewer configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below.

use std::path::Path;

use anyhow::Context;
use meshview_core::{Axis, OrbitSettings, RenderSettings};
use serde::{Deserialize, Serialize};

/// Root configuration for the terminal viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub render: RenderSettings,
    pub orbit: OrbitSettings,
    /// Model spin per frame, in radians.
    pub spin_speed: f32,
    pub spin_axis: Axis,
    /// Start with the model spinning.
    pub spin: bool,
    pub target_fps: u32,
    /// Camera field of view (degrees above 10, radians otherwise).
    pub fov: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            render: RenderSettings::default(),
            // Terminal cells are coarse, so pointer deltas are small
            orbit: OrbitSettings {
                rotation_sensitivity: 0.05,
                ..OrbitSettings::default()
            },
            spin_speed: 0.015,
            spin_axis: Axis::Y,
            spin: true,
            target_fps: 30,
            fov: 45.0,
        }
    }
}

impl ViewerConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
