//! Village configuration
//!
//! Every tunable of the simulation in one serde struct. Missing JSON fields
//! fall back to the defaults. Quantities are written in tenths.

use hearthvale_logic::resources::{Quantity, ResourceBundle};
use serde::{Deserialize, Serialize};

use crate::construction::ConstructionSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VillageConfig {
    /// Storage every pool has before any building contributes.
    pub base_storage: Quantity,
    /// Seconds between production, repair, hazard and quest passes.
    pub production_interval_secs: f64,
    pub construction_speed: f64,
    pub auto_construct: bool,
    pub max_concurrent_constructions: usize,
    pub auto_repair: bool,
    pub repair_speed: f64,
    /// Buildings below this health fraction join the repair queue.
    pub auto_repair_threshold: f64,
    pub hazards_enabled: bool,
    /// Chance per usable building per simulated hour.
    pub hazard_chance_per_hour: f64,
    /// Seed for hazards and villager names.
    pub seed: u64,
    pub starting_resources: ResourceBundle,
    pub starting_population: u32,
}

impl Default for VillageConfig {
    fn default() -> Self {
        Self {
            base_storage: Quantity::from_units(500),
            production_interval_secs: 1.0,
            construction_speed: 1.0,
            auto_construct: true,
            max_concurrent_constructions: 3,
            auto_repair: false,
            repair_speed: 0.5,
            auto_repair_threshold: 0.5,
            hazards_enabled: false,
            hazard_chance_per_hour: 0.05,
            seed: 0x4845_4152_5448,
            starting_resources: ResourceBundle::units(100, 50, 0, 0),
            starting_population: 5,
        }
    }
}

impl VillageConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: VillageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &'static str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field: name,
                    reason: format!("must be a positive number, got {}", v),
                })
            }
        };
        let fraction = |name: &'static str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field: name,
                    reason: format!("must be within [0, 1], got {}", v),
                })
            }
        };

        positive("production_interval_secs", self.production_interval_secs)?;
        positive("construction_speed", self.construction_speed)?;
        positive("repair_speed", self.repair_speed)?;
        fraction("auto_repair_threshold", self.auto_repair_threshold)?;
        fraction("hazard_chance_per_hour", self.hazard_chance_per_hour)?;
        if self.max_concurrent_constructions == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_constructions",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn construction_settings(&self) -> ConstructionSettings {
        ConstructionSettings {
            speed: self.construction_speed,
            max_concurrent: self.max_concurrent_constructions,
            repair_speed: self.repair_speed,
            repair_threshold: self.auto_repair_threshold,
        }
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config value for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
