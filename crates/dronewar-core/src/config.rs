//! User-editable simulation parameters.
//!
//! Every field has a default, so partial JSON documents are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // --- World ---
    /// Full side length of the square map. Half-extent is `map_size / 2`.
    pub map_size: f64,
    pub obstacle_count: u32,
    pub drone_count: u32,
    pub enemy_count: u32,
    /// RNG seed. Same seed and same commands give the same run.
    pub seed: u64,

    // --- Drones ---
    /// Altitude at which drones spawn.
    pub drone_altitude: f64,
    /// Drones are pushed upward below this altitude.
    pub min_altitude: f64,
    pub drone_max_speed: f64,
    /// Drone collision diameter.
    pub drone_size: f64,
    pub drone_max_health: f64,
    /// Symmetric sensing range for drones and sentries.
    pub detection_range: f64,
    /// Allies within half of this count toward a drone's cover.
    pub communication_range: f64,

    // --- Behavior weights ---
    pub cohesion_weight: f64,
    pub separation_weight: f64,
    pub avoidance_weight: f64,
    pub search_weight: f64,
    pub search_aggressiveness: f64,

    // --- Recon ---
    /// Use quadrant formations instead of the legacy search patterns.
    pub recon_formation: bool,
    pub recon_pattern_change_ms: f64,
    pub recon_formation_spread: f64,

    // --- Combat ---
    pub collision_damage: f64,
    pub collision_cooldown_ms: f64,
    pub shooting_enabled: bool,
    pub shooting_rate_ms: f64,
    pub shooting_range: f64,
    pub shooting_damage: f64,
    /// Drones launch their missile at visible detected sentries on their own.
    pub auto_fire_missiles: bool,

    // --- Sentries ---
    pub enemy_min_speed: f64,
    pub enemy_max_speed: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map_size: 200.0,
            obstacle_count: 15,
            drone_count: 10,
            enemy_count: 5,
            seed: 42,

            drone_altitude: 30.0,
            min_altitude: 10.0,
            drone_max_speed: 0.5,
            drone_size: 1.0,
            drone_max_health: 100.0,
            detection_range: 40.0,
            communication_range: 60.0,

            cohesion_weight: 1.0,
            separation_weight: 1.5,
            avoidance_weight: 2.0,
            search_weight: 1.0,
            search_aggressiveness: 1.0,

            recon_formation: true,
            recon_pattern_change_ms: 15_000.0,
            recon_formation_spread: 10.0,

            collision_damage: 10.0,
            collision_cooldown_ms: 1_000.0,
            shooting_enabled: true,
            shooting_rate_ms: 2_000.0,
            shooting_range: 30.0,
            shooting_damage: 10.0,
            auto_fire_missiles: true,

            enemy_min_speed: 0.15,
            enemy_max_speed: 0.25,
        }
    }
}

impl SimConfig {
    /// Map half-extent on every axis.
    pub fn half_extent(&self) -> f64 {
        self.map_size / 2.0
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Reject parameters the decision layer cannot work with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("map_size", self.map_size),
            ("drone_max_speed", self.drone_max_speed),
            ("drone_size", self.drone_size),
            ("drone_max_health", self.drone_max_health),
            ("detection_range", self.detection_range),
            ("communication_range", self.communication_range),
            ("recon_pattern_change_ms", self.recon_pattern_change_ms),
            ("shooting_rate_ms", self.shooting_rate_ms),
            ("shooting_range", self.shooting_range),
            ("enemy_min_speed", self.enemy_min_speed),
            ("enemy_max_speed", self.enemy_max_speed),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        let non_negative = [
            ("drone_altitude", self.drone_altitude),
            ("min_altitude", self.min_altitude),
            ("cohesion_weight", self.cohesion_weight),
            ("separation_weight", self.separation_weight),
            ("avoidance_weight", self.avoidance_weight),
            ("search_weight", self.search_weight),
            ("search_aggressiveness", self.search_aggressiveness),
            ("recon_formation_spread", self.recon_formation_spread),
            ("collision_damage", self.collision_damage),
            ("collision_cooldown_ms", self.collision_cooldown_ms),
            ("shooting_damage", self.shooting_damage),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                });
            }
        }

        if self.enemy_min_speed > self.enemy_max_speed {
            return Err(ConfigError::Invalid {
                field: "enemy_min_speed",
                reason: format!(
                    "exceeds enemy_max_speed ({} > {})",
                    self.enemy_min_speed, self.enemy_max_speed
                ),
            });
        }

        if self.drone_altitude > self.half_extent() {
            return Err(ConfigError::Invalid {
                field: "drone_altitude",
                reason: format!(
                    "above the map ceiling ({} > {})",
                    self.drone_altitude,
                    self.half_extent()
                ),
            });
        }

        if self.min_altitude > self.half_extent() {
            return Err(ConfigError::Invalid {
                field: "min_altitude",
                reason: format!(
                    "above the map ceiling ({} > {})",
                    self.min_altitude,
                    self.half_extent()
                ),
            });
        }

        Ok(())
    }
}
