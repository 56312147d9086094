//! # World Configuration
//!
//! Tunables for terrain generation, caching and the worker pool. A config is
//! plain JSON; every field is optional and falls back to the defaults below.
//!
//! ```json
//! { "seed": 42, "cache_capacity": 128, "render_distance": 4 }
//! ```

use std::{num::NonZeroUsize, path::Path, path::PathBuf, thread, time::Duration};

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::engine_state::voxels::terrain::TerrainParams;

/// Render distance in chunks used when none is configured.
pub const DEFAULT_RENDER_DISTANCE: i32 = 2;

/// Complete configuration of a world session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed of the noise permutation table.
    pub seed: u64,
    /// Terrain height where the noise contribution is zero.
    pub base_height: f64,
    /// How far the noise can push the surface up or down.
    pub amplitude: f64,
    /// Horizontal distance (in blocks) covered by one noise lattice cell.
    pub scale: f64,
    /// Maximum number of resident chunks.
    pub cache_capacity: usize,
    /// Radius, in chunks, of the square loaded and considered for rendering.
    pub render_distance: i32,
    /// Worker threads for generation. `None` uses the available parallelism,
    /// `Some(0)` generates synchronously on the calling thread.
    pub worker_count: Option<usize>,
    /// Longest a blocking load waits on a worker before using flat terrain.
    pub generation_timeout_ms: u64,
    /// Cap on instance transforms produced per block type.
    pub max_instances_per_type: usize,
    /// Interval between telemetry snapshots.
    pub stats_interval_ms: u64,
    /// Directory for the file-backed chunk store; in-memory when unset.
    pub persistence_dir: Option<PathBuf>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: 0,
            base_height: 64.0,
            amplitude: 24.0,
            scale: 64.0,
            cache_capacity: 256,
            render_distance: DEFAULT_RENDER_DISTANCE,
            worker_count: None,
            generation_timeout_ms: 5_000,
            max_instances_per_type: 4_096,
            stats_interval_ms: 1_000,
            persistence_dir: None,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scale must be a positive finite number, got {}",
                self.scale
            )));
        }
        if !self.base_height.is_finite() || !self.amplitude.is_finite() {
            return Err(ConfigError::Invalid(
                "base_height and amplitude must be finite".to_string(),
            ));
        }
        if self.render_distance < 0 {
            return Err(ConfigError::Invalid(format!(
                "render_distance must not be negative, got {}",
                self.render_distance
            )));
        }
        if self.max_instances_per_type == 0 {
            return Err(ConfigError::Invalid(
                "max_instances_per_type must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Terrain parameters handed to every generation task.
    pub fn terrain_params(&self) -> TerrainParams {
        TerrainParams {
            base_height: self.base_height,
            amplitude: self.amplitude,
            scale: self.scale,
        }
    }

    /// Number of worker threads to spawn.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(count) => count,
            None => thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }

    /// Bounded wait for a single chunk generation.
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    /// Interval between telemetry snapshots.
    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = WorldConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.render_distance, DEFAULT_RENDER_DISTANCE);
    }

    #[test]
    fn test_partial_json_overrides_fields() {
        let config =
            WorldConfig::from_json_str(r#"{ "seed": 9, "cache_capacity": 3, "worker_count": 0 }"#)
                .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.cache_capacity, 3);
        assert_eq!(config.resolved_worker_count(), 0);
        assert_eq!(config.base_height, 64.0);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let result = WorldConfig::from_json_str(r#"{ "cache_capacity": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_positive_scale_is_rejected() {
        let result = WorldConfig::from_json_str(r#"{ "scale": 0.0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let result = WorldConfig::from_json_str("{ seed: }");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_default_worker_count_is_at_least_one() {
        assert!(WorldConfig::default().resolved_worker_count() >= 1);
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        std::fs::write(&path, r#"{ "render_distance": 5 }"#).unwrap();

        let config = WorldConfig::from_path(&path).unwrap();
        assert_eq!(config.render_distance, 5);

        let missing = WorldConfig::from_path(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
