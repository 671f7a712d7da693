//! Building condition banding.
//!
//! Two fixed tables govern a building's visible state:
//! - **Banding** maps a health fraction to a condition (0 / 25 / 50 / 90 %).
//! - **Seeding** maps an explicitly set condition back to a starting health
//!   (0 / 10 / 50 / 80 / 100 %).
//!
//! The tables are not inverses of each other: a building set to
//! `Good` starts at 80% health, which the band function also reads as `Good`.

use serde::{Deserialize, Serialize};

/// Discrete state of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingCondition {
    Destroyed,
    Ruined,
    Burned,
    Damaged,
    UnderConstruction,
    Good,
    Excellent,
}

impl BuildingCondition {
    /// Usable buildings house villagers, store resources and produce.
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Good | Self::Excellent | Self::Damaged)
    }

    pub fn is_under_construction(self) -> bool {
        self == Self::UnderConstruction
    }

    /// Fraction of max health assigned by an explicit `set_condition`.
    pub fn seed_fraction(self) -> f64 {
        match self {
            Self::Destroyed | Self::UnderConstruction => 0.0,
            Self::Ruined | Self::Burned => 0.1,
            Self::Damaged => 0.5,
            Self::Good => 0.8,
            Self::Excellent => 1.0,
        }
    }

    /// Starting health for this condition, rounded to the nearest point.
    pub fn seeded_health(self, max_health: u32) -> u32 {
        (max_health as f64 * self.seed_fraction()).round() as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Destroyed => "destroyed",
            Self::Ruined => "ruined",
            Self::Burned => "burned",
            Self::Damaged => "damaged",
            Self::UnderConstruction => "under construction",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

/// Condition band for a health value.
///
/// Integer comparisons keep the boundaries exact:
/// `0` Destroyed, `< 25%` Ruined, `< 50%` Damaged, `< 90%` Good, else Excellent.
/// A zero max health reads as Destroyed.
pub fn band_for_health(health: u32, max_health: u32) -> BuildingCondition {
    let h = health as u64;
    let max = max_health as u64;
    if h == 0 || max == 0 {
        BuildingCondition::Destroyed
    } else if h * 4 < max {
        BuildingCondition::Ruined
    } else if h * 2 < max {
        BuildingCondition::Damaged
    } else if h * 10 < max * 9 {
        BuildingCondition::Good
    } else {
        BuildingCondition::Excellent
    }
}

/// Health as a fraction of max, clamped to [0, 1].
pub fn health_fraction(health: u32, max_health: u32) -> f64 {
    if max_health == 0 {
        0.0
    } else {
        (health as f64 / max_health as f64).clamp(0.0, 1.0)
    }
}
