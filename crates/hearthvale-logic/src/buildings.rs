//! Building catalog: kinds, level tables and upgrade costs.
//!
//! Every village building is one of six kinds. Each kind has a fixed
//! definition: how far it can be upgraded, how much it houses and stores per
//! level, how many villagers can work there at each level, and what each
//! upgrade costs.

use serde::{Deserialize, Serialize};

use crate::resources::ResourceBundle;

/// Kind of building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BuildingKind {
    TownHall = 0,
    Temple = 1,
    Barracks = 2,
    Workshop = 3,
    Market = 4,
    Library = 5,
}

/// Static definition for a building kind.
#[derive(Debug, Clone)]
pub struct BuildingSpec {
    pub name: &'static str,
    pub max_level: u8,
    pub max_health: u32,
    /// Seconds to finish construction at speed 1.0.
    pub build_time_secs: f32,
    /// Housing added per completed level while usable.
    pub housing_per_level: u32,
    /// Storage added to every resource pool per completed level while usable.
    pub storage_per_level: u64,
    /// Worker slots indexed by level. Levels past the table have none.
    pub worker_capacity: &'static [u32],
    /// Story scene revealed the first time this kind reaches level 1.
    pub story_scene: &'static str,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 6] = [
        BuildingKind::TownHall,
        BuildingKind::Temple,
        BuildingKind::Barracks,
        BuildingKind::Workshop,
        BuildingKind::Market,
        BuildingKind::Library,
    ];

    pub fn spec(&self) -> BuildingSpec {
        match self {
            Self::TownHall => BuildingSpec {
                name: "Town Hall",
                max_level: 5,
                max_health: 200,
                build_time_secs: 30.0,
                housing_per_level: 5,
                storage_per_level: 200,
                worker_capacity: &[0, 2, 4, 6, 8, 10],
                story_scene: "village_elder_arrives",
            },
            Self::Temple => BuildingSpec {
                name: "Veil Temple",
                max_level: 5,
                max_health: 100,
                build_time_secs: 25.0,
                housing_per_level: 2,
                storage_per_level: 0,
                worker_capacity: &[0, 2, 4, 6, 8, 10],
                story_scene: "veil_mysteries_begin",
            },
            Self::Barracks => BuildingSpec {
                name: "Barracks",
                max_level: 4,
                max_health: 100,
                build_time_secs: 20.0,
                housing_per_level: 4,
                storage_per_level: 50,
                worker_capacity: &[0, 3, 6, 9, 12],
                story_scene: "defense_training_available",
            },
            Self::Workshop => BuildingSpec {
                name: "Workshop",
                max_level: 4,
                max_health: 100,
                build_time_secs: 20.0,
                housing_per_level: 0,
                storage_per_level: 150,
                worker_capacity: &[0, 2, 4, 6, 8],
                story_scene: "master_craftsman_arrives",
            },
            Self::Market => BuildingSpec {
                name: "Market Square",
                max_level: 3,
                max_health: 100,
                build_time_secs: 15.0,
                housing_per_level: 2,
                storage_per_level: 250,
                worker_capacity: &[0, 2, 4, 6],
                story_scene: "first_traders_arrive",
            },
            Self::Library => BuildingSpec {
                name: "Library",
                max_level: 3,
                max_health: 100,
                build_time_secs: 25.0,
                housing_per_level: 1,
                storage_per_level: 50,
                worker_capacity: &[0, 2, 4, 6],
                story_scene: "scholar_arrives",
            },
        }
    }

    /// Cost to reach `target_level` (1-based). `None` past max level or for 0.
    pub fn upgrade_cost(&self, target_level: u8) -> Option<ResourceBundle> {
        let u = ResourceBundle::units;
        let cost = match (self, target_level) {
            (Self::TownHall, 1) => u(100, 0, 0, 0),
            (Self::TownHall, 2) => u(250, 50, 0, 0),
            (Self::TownHall, 3) => u(500, 100, 10, 0),
            (Self::TownHall, 4) => u(1000, 200, 50, 0),
            (Self::TownHall, 5) => u(2000, 500, 100, 10),

            (Self::Temple, 1) => u(150, 0, 0, 0),
            (Self::Temple, 2) => u(300, 75, 0, 0),
            (Self::Temple, 3) => u(600, 150, 20, 0),
            (Self::Temple, 4) => u(1200, 300, 60, 0),
            (Self::Temple, 5) => u(2500, 600, 120, 15),

            (Self::Barracks, 1) => u(100, 50, 0, 0),
            (Self::Barracks, 2) => u(250, 100, 0, 0),
            (Self::Barracks, 3) => u(500, 200, 30, 0),
            (Self::Barracks, 4) => u(1000, 400, 80, 5),

            (Self::Workshop, 1) => u(120, 60, 0, 0),
            (Self::Workshop, 2) => u(300, 150, 15, 0),
            (Self::Workshop, 3) => u(700, 350, 50, 0),
            (Self::Workshop, 4) => u(1500, 700, 100, 8),

            (Self::Market, 1) => u(80, 40, 0, 0),
            (Self::Market, 2) => u(200, 100, 10, 0),
            (Self::Market, 3) => u(500, 250, 40, 3),

            (Self::Library, 1) => u(150, 30, 0, 0),
            (Self::Library, 2) => u(350, 80, 25, 0),
            (Self::Library, 3) => u(800, 200, 60, 5),

            _ => return None,
        };
        Some(cost)
    }

    /// Kinds available for placement before any quest reward.
    pub fn initially_unlocked(&self) -> bool {
        matches!(self, Self::TownHall | Self::Temple)
    }

    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Self::TownHall),
            1 => Some(Self::Temple),
            2 => Some(Self::Barracks),
            3 => Some(Self::Workshop),
            4 => Some(Self::Market),
            5 => Some(Self::Library),
            _ => None,
        }
    }
}

/// Worker slots for a kind at a level. Level 0 always has none.
pub fn worker_capacity(kind: BuildingKind, level: u8) -> u32 {
    if level == 0 {
        return 0;
    }
    kind.spec()
        .worker_capacity
        .get(level as usize)
        .copied()
        .unwrap_or(0)
}

/// Housing contributed by a usable building at `level`.
pub fn housing_capacity(kind: BuildingKind, level: u8) -> u32 {
    kind.spec().housing_per_level * level as u32
}

/// Storage contributed to each resource pool by a usable building at `level`.
pub fn storage_capacity(kind: BuildingKind, level: u8) -> u64 {
    kind.spec().storage_per_level * level as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Quantity, ResourceType};

    #[test]
    fn test_every_level_has_a_cost() {
        for kind in BuildingKind::ALL {
            let spec = kind.spec();
            for level in 1..=spec.max_level {
                assert!(
                    kind.upgrade_cost(level).is_some(),
                    "{} missing cost for level {}",
                    spec.name,
                    level
                );
            }
            assert!(kind.upgrade_cost(0).is_none());
            assert!(kind.upgrade_cost(spec.max_level + 1).is_none());
        }
    }

    #[test]
    fn test_costs_rise_with_level() {
        for kind in BuildingKind::ALL {
            let spec = kind.spec();
            for level in 2..=spec.max_level {
                let prev = kind.upgrade_cost(level - 1).unwrap();
                let next = kind.upgrade_cost(level).unwrap();
                assert!(next.get(ResourceType::Essence) > prev.get(ResourceType::Essence));
            }
        }
    }

    #[test]
    fn test_town_hall_costs() {
        let c = BuildingKind::TownHall.upgrade_cost(5).unwrap();
        assert_eq!(c.essence, Quantity::from_units(2000));
        assert_eq!(c.legendary_materials, Quantity::from_units(10));
    }

    #[test]
    fn test_capacity_table_covers_max_level() {
        for kind in BuildingKind::ALL {
            let spec = kind.spec();
            // Index 0 is level 0, so max level needs max_level + 1 entries
            assert!(spec.worker_capacity.len() > spec.max_level as usize);
            assert!(worker_capacity(kind, spec.max_level) > 0, "{}", spec.name);
        }
    }

    #[test]
    fn test_upgrade_never_lowers_slots() {
        for kind in BuildingKind::ALL {
            for level in 1..=kind.spec().max_level {
                assert!(worker_capacity(kind, level) >= worker_capacity(kind, level - 1));
            }
        }
    }

    #[test]
    fn test_worker_capacity_lookup() {
        assert_eq!(worker_capacity(BuildingKind::Workshop, 0), 0);
        assert_eq!(worker_capacity(BuildingKind::Workshop, 1), 2);
        assert_eq!(worker_capacity(BuildingKind::Workshop, 2), 4);
        assert_eq!(worker_capacity(BuildingKind::Barracks, 3), 9);
        assert_eq!(worker_capacity(BuildingKind::Library, 9), 0);
    }

    #[test]
    fn test_housing_and_storage_scale_with_level() {
        assert_eq!(housing_capacity(BuildingKind::TownHall, 0), 0);
        assert_eq!(housing_capacity(BuildingKind::TownHall, 2), 10);
        assert_eq!(storage_capacity(BuildingKind::Market, 3), 750);
        assert_eq!(storage_capacity(BuildingKind::Temple, 5), 0);
    }

    #[test]
    fn test_initial_unlocks() {
        let unlocked: Vec<_> = BuildingKind::ALL
            .into_iter()
            .filter(|k| k.initially_unlocked())
            .collect();
        assert_eq!(unlocked, vec![BuildingKind::TownHall, BuildingKind::Temple]);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in BuildingKind::ALL {
            assert_eq!(BuildingKind::from_u8(kind as u8), Some(kind));
        }
        assert_eq!(BuildingKind::from_u8(6), None);
    }
}
