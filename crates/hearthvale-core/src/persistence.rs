//! Save/Load functionality for persisting village state
//!
//! Uses bincode for compact binary saves and serde_json for a readable
//! key-value blob. Buildings are pulled out of the ECS world and respawned
//! on load; the event outbox is transient and never saved.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use hearthvale_logic::buildings::BuildingKind;

use crate::assignment::{Villager, VillagerAssignment, VillagerId};
use crate::building::{Building, BuildingId};
use crate::config::VillageConfig;
use crate::construction::ConstructionQueue;
use crate::engine::Village;
use crate::events::EventLog;
use crate::ledger::ResourceLedger;
use crate::quests::{QuestBook, QuestRecord};
use crate::registry::BuildingRegistry;

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the village state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulated seconds
    pub sim_time: f64,
    /// Wall-clock stamp (ms) of the last production
    pub last_tick_ms: u64,
    pub discovered: bool,
    pub config: VillageConfig,
    /// Balances and capacities
    pub ledger: ResourceLedger,
    pub buildings: Vec<Building>,
    pub unlocked_buildings: Vec<BuildingKind>,
    pub next_building_id: u32,
    pub villagers: Vec<Villager>,
    pub assignments: Vec<(VillagerId, BuildingId)>,
    pub next_villager_id: u32,
    pub quests: Vec<QuestRecord>,
    pub active_quest: Option<String>,
    pub story_scenes: Vec<String>,
    pub construction: ConstructionQueue,
}

impl SaveData {
    pub fn capture(village: &Village) -> Self {
        Self {
            version: SAVE_VERSION,
            sim_time: village.sim_time,
            last_tick_ms: village.last_tick_ms,
            discovered: village.discovered,
            config: village.config.clone(),
            ledger: village.ledger.clone(),
            buildings: village.registry.all(),
            unlocked_buildings: village.registry.unlocked_kinds(),
            next_building_id: village.registry.next_id(),
            villagers: village.villagers.villagers().cloned().collect(),
            assignments: village.villagers.assignments().collect(),
            next_villager_id: village.villagers.next_id(),
            quests: village.quests.records(),
            active_quest: village.quests.active_id().map(str::to_string),
            story_scenes: village.story_scenes.iter().cloned().collect(),
            construction: village.construction.clone(),
        }
    }

    /// Rebuild a village. Cadence timers restart at the saved sim time and
    /// the rng is reseeded from the config seed and sim time.
    pub fn restore(self) -> Result<Village, SaveError> {
        if self.version != SAVE_VERSION {
            warn!(
                "Rejected save: version {} (expected {})",
                self.version, SAVE_VERSION
            );
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }

        let mut ledger = self.ledger;
        let registry = BuildingRegistry::restore(
            self.config.base_storage,
            self.buildings,
            self.unlocked_buildings,
            self.next_building_id,
        );
        registry.recompute_capacities(&mut ledger);

        let mut quests = QuestBook::standard();
        for id in quests.restore(self.quests, self.active_quest.as_deref()) {
            warn!("Ignoring saved progress for unknown quest {}", id);
        }

        let mut construction = self.construction;
        for id in construction.active().to_vec() {
            if !registry.contains(id) {
                construction.cancel(id);
            }
        }

        let rng = StdRng::seed_from_u64(self.config.seed ^ self.sim_time.to_bits());
        let story_scenes: BTreeSet<String> = self.story_scenes.into_iter().collect();

        Ok(Village {
            villagers: VillagerAssignment::restore(
                self.villagers,
                self.assignments,
                self.next_villager_id,
            ),
            config: self.config,
            ledger,
            registry,
            quests,
            construction,
            story_scenes,
            events: EventLog::new(),
            rng,
            discovered: self.discovered,
            sim_time: self.sim_time,
            last_tick_ms: self.last_tick_ms,
            last_production_update: self.sim_time,
        })
    }
}

/// Save the complete village to a writer
pub fn save_village<W: Write>(writer: W, village: &Village) -> Result<(), SaveError> {
    bincode::serialize_into(writer, &SaveData::capture(village))?;
    Ok(())
}

/// Load a village from a reader
pub fn load_village<R: Read>(reader: R) -> Result<Village, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;
    save_data.restore()
}

pub fn save_json(village: &Village) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(&SaveData::capture(village))?)
}

pub fn load_json(json: &str) -> Result<Village, SaveError> {
    let save_data: SaveData = serde_json::from_str(json)?;
    save_data.restore()
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::Json(e) => write!(f, "JSON error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
