//! Map engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// Default cap on random tiles sampled while placing a single key.
pub const DEFAULT_KEY_PLACEMENT_ATTEMPTS: u32 = 100_000;

/// Configuration for map loading and population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Random seed for deterministic generation and placement.
    pub seed: u64,
    /// Whether ammo pickup spawners may be placed.
    pub ammo_enabled: bool,
    /// Random tiles sampled per key before key placement gives up.
    pub key_placement_attempts: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            ammo_enabled: true,
            key_placement_attempts: DEFAULT_KEY_PLACEMENT_ATTEMPTS,
        }
    }
}

impl MapConfig {
    /// Parse a config from RON. Missing fields take their defaults.
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| MapError::ParseError {
            what: "map config",
            message: e.to_string(),
        })
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable ammo spawners.
    #[must_use]
    pub const fn with_ammo(mut self, enabled: bool) -> Self {
        self.ammo_enabled = enabled;
        self
    }

    /// Set the key placement safety valve. Clamped to at least 1.
    #[must_use]
    pub fn with_key_placement_attempts(mut self, attempts: u32) -> Self {
        self.key_placement_attempts = attempts.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MapConfig::default();
        assert_eq!(config.seed, 12345);
        assert!(config.ammo_enabled);
        assert_eq!(config.key_placement_attempts, DEFAULT_KEY_PLACEMENT_ATTEMPTS);
    }

    #[test]
    fn test_from_ron_partial() {
        let config = MapConfig::from_ron("(seed: 7, ammo_enabled: false)").unwrap();
        assert_eq!(config.seed, 7);
        assert!(!config.ammo_enabled);
        assert_eq!(config.key_placement_attempts, DEFAULT_KEY_PLACEMENT_ATTEMPTS);
    }

    #[test]
    fn test_from_ron_rejects_garbage() {
        assert!(matches!(
            MapConfig::from_ron("(seed: \"x\")"),
            Err(MapError::ParseError { .. })
        ));
    }

    #[test]
    fn test_builder() {
        let config = MapConfig::default()
            .with_seed(1)
            .with_ammo(false)
            .with_key_placement_attempts(0);
        assert_eq!(config.seed, 1);
        assert!(!config.ammo_enabled);
        assert_eq!(config.key_placement_attempts, 1);
    }
}
