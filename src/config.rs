//! Scene tuning loaded from JSON.

use crate::interaction::OffSeason;
use crate::{AdventError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Box body size in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxDimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for BoxDimensions {
    fn default() -> Self {
        Self { width: 30.0, height: 30.0, depth: 5.0 }
    }
}

/// Every knob the interaction model and door layout read.
///
/// Missing fields fall back to the defaults below, so a partial JSON file
/// only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub box_dimensions: BoxDimensions,
    /// Pointer travel (per axis) at which a click becomes a drag.
    pub drag_threshold_px: f32,
    /// Delay between opening a door and showing its day.
    pub view_delay_ms: u64,
    /// Quiet time before the idle sway starts.
    pub idle_timeout_ms: u64,
    pub idle_fade_secs: f32,
    /// Radians of box rotation per pixel dragged.
    pub rotate_per_px: f32,
    /// Zoom change per wheel delta unit.
    pub wheel_zoom_rate: f32,
    pub max_zoom: f32,
    pub initial_rotation: [f32; 2],
    /// Door hinge angle when fully open, in radians.
    pub door_open_angle: f32,
    pub off_season: OffSeason,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            box_dimensions: BoxDimensions::default(),
            drag_threshold_px: 5.0,
            view_delay_ms: 600,
            idle_timeout_ms: 2000,
            idle_fade_secs: 1.5,
            rotate_per_px: 0.01,
            wheel_zoom_rate: 0.05,
            max_zoom: 80.0,
            initial_rotation: [0.3, 0.5],
            door_open_angle: -std::f32::consts::PI * 0.6,
            off_season: OffSeason::Unlocked,
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AdventError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), "loaded scene config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let dims = &self.box_dimensions;
        if dims.width <= 0.0 || dims.height <= 0.0 || dims.depth <= 0.0 {
            return Err(AdventError::Config("box dimensions must be positive".into()));
        }
        if self.drag_threshold_px <= 0.0 {
            return Err(AdventError::Config("drag_threshold_px must be positive".into()));
        }
        if self.idle_fade_secs <= 0.0 {
            return Err(AdventError::Config("idle_fade_secs must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{"view_delay_ms": 900, "off_season": "locked"}"#;
        let config = SceneConfig::from_json_str(json).unwrap();
        assert_eq!(config.view_delay_ms, 900);
        assert_eq!(config.off_season, OffSeason::Locked);
        assert_eq!(config.box_dimensions, BoxDimensions::default());
        assert_eq!(config.drag_threshold_px, 5.0);
    }

    #[test]
    fn nested_dimensions_merge_with_defaults() {
        let config = SceneConfig::from_json_str(r#"{"box_dimensions": {"depth": 8}}"#).unwrap();
        assert_eq!(config.box_dimensions.depth, 8.0);
        assert_eq!(config.box_dimensions.width, 30.0);
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let err = SceneConfig::from_json_str(r#"{"box_dimensions": {"width": 0}}"#).unwrap_err();
        assert!(matches!(err, AdventError::Config(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(SceneConfig::from_json_str("{"), Err(AdventError::Config(_))));
    }
}
