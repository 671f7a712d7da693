//! Villager catalog: kinds, base production and work sites.

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;
use crate::resources::ProductionRates;

/// Kind of villager. Specialists are bound to one or two building kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VillagerKind {
    Worker = 0,
    Miner = 1,
    Farmer = 2,
    Scholar = 3,
    Priest = 4,
    Warrior = 5,
    Merchant = 6,
    Craftsman = 7,
}

/// Static definition for a villager kind.
#[derive(Debug, Clone)]
pub struct VillagerSpec {
    pub name: &'static str,
    /// Output per second at a level-1 multiplier of 1.0.
    pub base_production: ProductionRates,
    pub works_at: &'static [BuildingKind],
    /// Building kind that must stand at level 1 or higher before recruiting.
    pub unlocked_by: BuildingKind,
}

impl VillagerKind {
    pub const ALL: [VillagerKind; 8] = [
        VillagerKind::Worker,
        VillagerKind::Miner,
        VillagerKind::Farmer,
        VillagerKind::Scholar,
        VillagerKind::Priest,
        VillagerKind::Warrior,
        VillagerKind::Merchant,
        VillagerKind::Craftsman,
    ];

    pub fn spec(&self) -> VillagerSpec {
        use BuildingKind::*;
        match self {
            Self::Worker => VillagerSpec {
                name: "Worker",
                base_production: ProductionRates::new(0.5, 1.0, 0.0, 0.0),
                works_at: &[TownHall, Workshop, Barracks, Market],
                unlocked_by: TownHall,
            },
            Self::Miner => VillagerSpec {
                name: "Miner",
                base_production: ProductionRates::new(0.0, 3.0, 0.2, 0.0),
                works_at: &[Workshop, TownHall],
                unlocked_by: TownHall,
            },
            Self::Farmer => VillagerSpec {
                name: "Farmer",
                base_production: ProductionRates::new(0.3, 2.0, 0.0, 0.0),
                works_at: &[Market, TownHall],
                unlocked_by: TownHall,
            },
            Self::Scholar => VillagerSpec {
                name: "Scholar",
                base_production: ProductionRates::new(2.0, 0.0, 0.1, 0.0),
                works_at: &[Library, Temple],
                unlocked_by: Library,
            },
            Self::Priest => VillagerSpec {
                name: "Priest",
                base_production: ProductionRates::new(3.0, 0.0, 0.0, 0.0),
                works_at: &[Temple],
                unlocked_by: Temple,
            },
            Self::Warrior => VillagerSpec {
                name: "Warrior",
                base_production: ProductionRates::new(0.0, 0.5, 0.0, 0.0),
                works_at: &[Barracks],
                unlocked_by: Barracks,
            },
            Self::Merchant => VillagerSpec {
                name: "Merchant",
                base_production: ProductionRates::new(1.0, 1.0, 0.3, 0.0),
                works_at: &[Market],
                unlocked_by: Market,
            },
            Self::Craftsman => VillagerSpec {
                name: "Craftsman",
                base_production: ProductionRates::new(0.0, 1.0, 0.5, 0.0),
                works_at: &[Workshop],
                unlocked_by: Workshop,
            },
        }
    }

    pub fn can_work_at(&self, building: BuildingKind) -> bool {
        self.spec().works_at.contains(&building)
    }

    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Self::Worker),
            1 => Some(Self::Miner),
            2 => Some(Self::Farmer),
            3 => Some(Self::Scholar),
            4 => Some(Self::Priest),
            5 => Some(Self::Warrior),
            6 => Some(Self::Merchant),
            7 => Some(Self::Craftsman),
            _ => None,
        }
    }
}

/// Given-name pool for recruited villagers.
pub const VILLAGER_NAMES: &[&str] = &[
    "Ada", "Bram", "Cora", "Dain", "Edda", "Finn", "Gisla", "Hal", "Ida", "Jory", "Kara", "Lenn",
    "Mira", "Nils", "Orla", "Piet", "Runa", "Sten", "Tova", "Ulf", "Vera", "Wynn", "Yara", "Zeb",
];
