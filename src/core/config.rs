/// Pipeline configuration: resource limits, spacing and defaults.
///
/// Loaded from RON. Every field is optional on disk and falls back to the
/// values below.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::world::Size;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Coarse caps applied during validation. Excess entries are dropped,
/// first-N kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Upper clamp for any size component, in world units.
    pub max_world_size: f64,
    pub max_zones: usize,
    pub max_rooms_per_zone: usize,
    pub max_props_per_room: usize,
    pub max_clues_per_room: usize,
    pub max_npcs: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_world_size: 200.0,
            max_zones: 10,
            max_rooms_per_zone: 20,
            max_props_per_room: 50,
            max_clues_per_room: 50,
            max_npcs: 32,
        }
    }
}

/// Layout spacing, in grid units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    /// Gap between consecutive zones along the packing axis.
    pub zone_padding: u32,
    /// Gap between rooms, and inset of the first room from its zone edge.
    pub room_padding: u32,
    /// Distance between auto-scattered props.
    pub prop_step: u32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            zone_padding: 4,
            room_padding: 2,
            prop_step: 2,
        }
    }
}

/// Sizes substituted when a document omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub world_size: Size,
    pub zone_size: Size,
    pub room_size: Size,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            world_size: Size::new(100.0, 100.0, 20.0),
            zone_size: Size::flat(10.0, 10.0),
            room_size: Size::flat(5.0, 5.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub limits: Limits,
    pub spacing: Spacing,
    pub defaults: Defaults,
    /// World units per grid index cell.
    pub grid_cell_size: f64,
    /// Seed for generated fallback ids.
    pub seed: u64,
    /// Substitute the canned world when the strict shape check fails.
    pub use_fallback_on_shape_error: bool,
    /// Emit a text-layer label for every zone.
    pub zone_labels: bool,
    /// Capacity of the per-session asset resolution cache.
    pub asset_cache_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            spacing: Spacing::default(),
            defaults: Defaults::default(),
            grid_cell_size: 1.0,
            seed: 0,
            use_fallback_on_shape_error: true,
            zone_labels: false,
            asset_cache_capacity: 256,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<PipelineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a config from a RON string and check it.
    pub fn parse_ron(input: &str) -> Result<PipelineConfig, ConfigError> {
        let config: PipelineConfig = ron::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    /// Reject values that would make layout or indexing meaningless.
    pub fn check(&self) -> Result<(), ConfigError> {
        if !(self.grid_cell_size.is_finite() && self.grid_cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "grid_cell_size must be positive, got {}",
                self.grid_cell_size
            )));
        }
        if !(self.limits.max_world_size.is_finite() && self.limits.max_world_size >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "max_world_size must be at least 1, got {}",
                self.limits.max_world_size
            )));
        }
        if self.spacing.prop_step == 0 {
            return Err(ConfigError::Invalid("prop_step must be non-zero".to_string()));
        }
        for (name, size) in [
            ("world_size", &self.defaults.world_size),
            ("zone_size", &self.defaults.zone_size),
            ("room_size", &self.defaults.room_size),
        ] {
            if size.width < 1.0 || size.depth < 1.0 {
                return Err(ConfigError::Invalid(format!(
                    "default {} must be at least 1x1",
                    name
                )));
            }
        }
        if self.asset_cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "asset_cache_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.check().is_ok());
        assert_eq!(config.limits.max_zones, 10);
        assert_eq!(config.spacing.zone_padding, 4);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = PipelineConfig::parse_ron("(limits: (max_zones: 3), seed: 7)").unwrap();
        assert_eq!(config.limits.max_zones, 3);
        assert_eq!(config.limits.max_rooms_per_zone, 20);
        assert_eq!(config.seed, 7);
        assert!(config.use_fallback_on_shape_error);
    }

    #[test]
    fn rejects_zero_cell_size() {
        let err = PipelineConfig::parse_ron("(grid_cell_size: 0.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_ron() {
        let err = PipelineConfig::parse_ron("(limits: ").unwrap_err();
        assert!(matches!(err, ConfigError::Ron(_)));
    }
}
