//! Hazards - random fires and storms that damage standing buildings
//!
//! Each check rolls once per usable building, scaled so that the configured
//! chance applies per simulated hour. At most one hazard strikes per check.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::building::{BuildingId, LifecycleEvent};
use crate::ledger::ResourceLedger;
use crate::registry::BuildingRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    Fire,
    Storm,
}

impl HazardKind {
    /// Damage range as a percentage of max health.
    pub fn damage_percent(&self) -> (u32, u32) {
        match self {
            HazardKind::Fire => (20, 45),
            HazardKind::Storm => (10, 30),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HazardKind::Fire => "A fire broke out",
            HazardKind::Storm => "A storm battered the village",
        }
    }
}

/// A hazard that struck one building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardReport {
    pub building: BuildingId,
    pub kind: HazardKind,
    pub damage: u32,
    pub events: Vec<LifecycleEvent>,
}

/// Probability that an hourly chance fires at least once in `elapsed_secs`.
pub fn strike_probability(chance_per_hour: f64, elapsed_secs: f64) -> f64 {
    if chance_per_hour <= 0.0 || elapsed_secs <= 0.0 {
        return 0.0;
    }
    let chance = chance_per_hour.min(1.0);
    (1.0 - (1.0 - chance).powf(elapsed_secs / 3600.0)).clamp(0.0, 1.0)
}

/// Roll hazards for every usable building. A fire that leaves the building
/// standing marks it Burned.
pub fn roll_hazards(
    registry: &mut BuildingRegistry,
    ledger: &mut ResourceLedger,
    chance_per_hour: f64,
    elapsed_secs: f64,
    rng: &mut impl Rng,
) -> Option<HazardReport> {
    let p = strike_probability(chance_per_hour, elapsed_secs);
    if p <= 0.0 {
        return None;
    }

    for building in registry.all() {
        if !building.is_usable() {
            continue;
        }
        if !rng.gen_bool(p) {
            continue;
        }

        let kind = if rng.gen_bool(0.5) {
            HazardKind::Fire
        } else {
            HazardKind::Storm
        };
        let (lo, hi) = kind.damage_percent();
        let percent = rng.gen_range(lo..=hi);
        let damage = (building.max_health * percent / 100).max(1);

        let mut events = registry.apply_damage(building.id, damage, ledger);
        if kind == HazardKind::Fire {
            events.extend(registry.mark_burned(building.id, ledger));
        }
        return Some(HazardReport {
            building: building.id,
            kind,
            damage,
            events,
        });
    }
    None
}
