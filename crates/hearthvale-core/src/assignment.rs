//! Villager roster, work assignment and production
//!
//! `VillagerAssignment` is the sole owner of the villager → building
//! relation. Production is one shared rate: the sum over assigned villagers
//! at usable buildings of their base output times the building's level
//! multiplier, applied to the ledger once per tick.

use std::collections::BTreeMap;

use hearthvale_logic::production::villager_output;
use hearthvale_logic::resources::{ProductionRates, ResourceBundle};
use hearthvale_logic::villagers::VillagerKind;
use serde::{Deserialize, Serialize};

use crate::building::BuildingId;
use crate::ledger::ResourceLedger;
use crate::registry::BuildingRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VillagerId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Villager {
    pub id: VillagerId,
    pub kind: VillagerKind,
    pub name: String,
    /// Cosmetic, 0..=1.
    pub happiness: f32,
}

/// Outcome of one production tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionReport {
    pub elapsed_secs: f64,
    /// Truncated output before capacity clamping.
    pub requested: ResourceBundle,
    /// What the ledger actually accepted.
    pub added: ResourceBundle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VillagerAssignment {
    villagers: BTreeMap<VillagerId, Villager>,
    assignments: BTreeMap<VillagerId, BuildingId>,
    next_id: u32,
}

impl VillagerAssignment {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    // ========================================================================
    // ROSTER
    // ========================================================================

    pub fn recruit(&mut self, kind: VillagerKind, name: impl Into<String>) -> VillagerId {
        let id = VillagerId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.villagers.insert(
            id,
            Villager {
                id,
                kind,
                name: name.into(),
                happiness: 1.0,
            },
        );
        id
    }

    /// Remove a villager, releasing any assignment.
    pub fn dismiss(&mut self, id: VillagerId) -> Option<Villager> {
        self.assignments.remove(&id);
        self.villagers.remove(&id)
    }

    pub fn get(&self, id: VillagerId) -> Option<&Villager> {
        self.villagers.get(&id)
    }

    pub fn villagers(&self) -> impl Iterator<Item = &Villager> {
        self.villagers.values()
    }

    pub fn population(&self) -> u32 {
        self.villagers.len() as u32
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    // ========================================================================
    // ASSIGNMENT
    // ========================================================================

    /// Put a villager to work. Fails on unknown ids, a disallowed work site,
    /// or a building already full at its current level. Moving from another
    /// building releases the old slot in the same step.
    pub fn assign(
        &mut self,
        villager: VillagerId,
        building: BuildingId,
        registry: &BuildingRegistry,
    ) -> bool {
        let Some(v) = self.villagers.get(&villager) else {
            return false;
        };
        let Some(site) = registry.get(building) else {
            return false;
        };
        if !v.kind.can_work_at(site.kind) {
            return false;
        }
        if self.assignments.get(&villager) == Some(&building) {
            return true;
        }
        if self.assigned_count(building) >= site.worker_capacity() {
            return false;
        }
        self.assignments.insert(villager, building);
        true
    }

    pub fn unassign(&mut self, villager: VillagerId) -> bool {
        self.assignments.remove(&villager).is_some()
    }

    /// Release everyone working at `building`.
    pub fn release_building(&mut self, building: BuildingId) -> Vec<VillagerId> {
        let released = self.assigned_to(building);
        self.assignments.retain(|_, b| *b != building);
        released
    }

    pub fn assignment_of(&self, villager: VillagerId) -> Option<BuildingId> {
        self.assignments.get(&villager).copied()
    }

    pub fn assigned_to(&self, building: BuildingId) -> Vec<VillagerId> {
        self.assignments
            .iter()
            .filter(|(_, b)| **b == building)
            .map(|(v, _)| *v)
            .collect()
    }

    pub fn assigned_count(&self, building: BuildingId) -> u32 {
        self.assignments.values().filter(|b| **b == building).count() as u32
    }

    pub fn unassigned(&self) -> Vec<VillagerId> {
        self.villagers
            .keys()
            .filter(|id| !self.assignments.contains_key(id))
            .copied()
            .collect()
    }

    pub fn assignments(&self) -> impl Iterator<Item = (VillagerId, BuildingId)> + '_ {
        self.assignments.iter().map(|(v, b)| (*v, *b))
    }

    // ========================================================================
    // PRODUCTION
    // ========================================================================

    /// Per-second output of every assigned villager at a usable building.
    pub fn compute_total_production(&self, registry: &BuildingRegistry) -> ProductionRates {
        let mut total = ProductionRates::default();
        for (villager_id, building_id) in &self.assignments {
            let Some(villager) = self.villagers.get(villager_id) else {
                continue;
            };
            let Some(building) = registry.get(*building_id) else {
                continue;
            };
            if !building.is_usable() {
                continue;
            }
            total.accumulate(&villager_output(villager.kind, building.level));
        }
        total
    }

    /// Produce for `elapsed_secs` and deposit into the ledger.
    pub fn tick(
        &self,
        elapsed_secs: f64,
        registry: &BuildingRegistry,
        ledger: &mut ResourceLedger,
    ) -> ProductionReport {
        let elapsed_secs = if elapsed_secs.is_finite() {
            elapsed_secs.max(0.0)
        } else {
            0.0
        };
        let requested = self.compute_total_production(registry).over(elapsed_secs);
        let added = ledger.deposit_bundle(&requested);
        ProductionReport {
            elapsed_secs,
            requested,
            added,
        }
    }

    /// Rebuild from saved state. Assignments naming unknown villagers are
    /// dropped.
    pub fn restore(
        villagers: Vec<Villager>,
        assignments: Vec<(VillagerId, BuildingId)>,
        next_id: u32,
    ) -> Self {
        let villagers: BTreeMap<_, _> = villagers.into_iter().map(|v| (v.id, v)).collect();
        let assignments = assignments
            .into_iter()
            .filter(|(v, _)| villagers.contains_key(v))
            .collect();
        let max_id = villagers.keys().map(|v| v.0).max().unwrap_or(0);
        Self {
            villagers,
            assignments,
            next_id: next_id.max(max_id + 1),
        }
    }
}
