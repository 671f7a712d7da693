//! Overall village restoration progress and tier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::buildings::BuildingKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VillageTier {
    Ruins,
    Settlement,
    Village,
    Town,
    Stronghold,
    Citadel,
}

impl VillageTier {
    /// Tier for a rounded progress percentage.
    pub fn from_progress(percent: u32) -> Self {
        match percent {
            0 => Self::Ruins,
            1..=19 => Self::Settlement,
            20..=39 => Self::Village,
            40..=59 => Self::Town,
            60..=79 => Self::Stronghold,
            _ => Self::Citadel,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ruins => "ruins",
            Self::Settlement => "settlement",
            Self::Village => "village",
            Self::Town => "town",
            Self::Stronghold => "stronghold",
            Self::Citadel => "citadel",
        }
    }
}

/// Summed levels over summed max levels, as a rounded percentage.
pub fn village_progress(levels: &BTreeMap<BuildingKind, u8>) -> u32 {
    let mut total = 0u32;
    let mut max_total = 0u32;
    for kind in BuildingKind::ALL {
        let max = kind.spec().max_level as u32;
        total += levels.get(&kind).copied().unwrap_or(0).min(max as u8) as u32;
        max_total += max;
    }
    if max_total == 0 {
        return 0;
    }
    ((total as f64 / max_total as f64) * 100.0).round() as u32
}
