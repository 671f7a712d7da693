//! Village event outbox
//!
//! Every mutating village operation queues the notifications it produced
//! after the state change is complete. The presentation layer drains them.

use std::collections::VecDeque;

use hearthvale_logic::buildings::BuildingKind;
use hearthvale_logic::condition::BuildingCondition;
use hearthvale_logic::resources::ResourceBundle;
use hearthvale_logic::villagers::VillagerKind;
use serde::{Deserialize, Serialize};

use crate::assignment::VillagerId;
use crate::building::BuildingId;
use crate::hazards::HazardKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VillageEvent {
    VillageDiscovered,
    BuildingPlaced {
        id: BuildingId,
        kind: BuildingKind,
    },
    UpgradeStarted {
        id: BuildingId,
        kind: BuildingKind,
        target_level: u8,
    },
    ConstructionCompleted {
        id: BuildingId,
        kind: BuildingKind,
        level: u8,
    },
    ConditionChanged {
        id: BuildingId,
        from: BuildingCondition,
        to: BuildingCondition,
    },
    BuildingDestroyed {
        id: BuildingId,
        kind: BuildingKind,
    },
    BuildingRepaired {
        id: BuildingId,
    },
    BuildingDemolished {
        id: BuildingId,
        kind: BuildingKind,
    },
    BuildingUnlocked {
        kind: BuildingKind,
    },
    StorySceneUnlocked {
        scene: String,
    },
    VillagerRecruited {
        id: VillagerId,
        kind: VillagerKind,
    },
    VillagerAssigned {
        villager: VillagerId,
        building: BuildingId,
    },
    VillagerUnassigned {
        villager: VillagerId,
    },
    QuestUnlocked {
        id: String,
    },
    QuestStarted {
        id: String,
    },
    QuestCompleted {
        id: String,
    },
    HazardStruck {
        id: BuildingId,
        kind: HazardKind,
        damage: u32,
    },
    ResourcesGranted {
        added: ResourceBundle,
    },
    CatchUpApplied {
        elapsed_secs: u64,
        added: ResourceBundle,
    },
}

/// FIFO queue of pending events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    queue: VecDeque<VillageEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: VillageEvent) {
        self.queue.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn peek(&self) -> impl Iterator<Item = &VillageEvent> {
        self.queue.iter()
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<VillageEvent> {
        self.queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let mut log = EventLog::new();
        log.push(VillageEvent::VillageDiscovered);
        log.push(VillageEvent::QuestStarted {
            id: "discovery_begins".into(),
        });
        assert_eq!(log.len(), 2);
        let drained = log.drain();
        assert_eq!(drained[0], VillageEvent::VillageDiscovered);
        assert!(log.is_empty());
        assert!(log.drain().is_empty());
    }
}
