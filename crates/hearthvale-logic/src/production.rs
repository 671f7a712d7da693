//! Production rate tables.
//!
//! A villager assigned to a usable building produces its kind's base vector
//! scaled by the building level's multiplier. The multiplier table is shared
//! by every building kind.

use crate::resources::ProductionRates;
use crate::villagers::VillagerKind;

/// Multiplier by building level. Index 0 (ruins) keeps 1.0.
pub const LEVEL_MULTIPLIERS: [f64; 6] = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0];

/// Multiplier for a building level. Levels past the table fall back to 1.0.
pub fn level_multiplier(level: u8) -> f64 {
    LEVEL_MULTIPLIERS.get(level as usize).copied().unwrap_or(1.0)
}

/// Per-second output of one villager working at a building of `level`.
pub fn villager_output(kind: VillagerKind, building_level: u8) -> ProductionRates {
    kind.spec()
        .base_production
        .scaled(level_multiplier(building_level))
}
