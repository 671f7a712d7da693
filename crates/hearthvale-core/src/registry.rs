//! Building registry - owns every building instance
//!
//! Buildings live as components in a `hecs::World`. The registry keeps an
//! id index and a per-kind index beside the world, tracks which kinds the
//! player may place, and pushes storage ceilings into the ledger whenever a
//! building's usability can have changed.

use std::collections::{BTreeMap, BTreeSet};

use hearthvale_logic::buildings::BuildingKind;
use hearthvale_logic::condition::BuildingCondition;
use hearthvale_logic::resources::{Quantity, ResourceType};
use hecs::{Entity, World};

use crate::building::{Building, BuildingId, LifecycleEvent};
use crate::ledger::ResourceLedger;

/// Aggregate contribution of usable buildings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapacityTotals {
    pub housing: u32,
    /// Building storage, excluding the base allowance.
    pub storage: Quantity,
}

pub struct BuildingRegistry {
    world: World,
    index: BTreeMap<BuildingId, Entity>,
    by_kind: BTreeMap<BuildingKind, Vec<BuildingId>>,
    unlocked: BTreeSet<BuildingKind>,
    next_id: u32,
    base_storage: Quantity,
}

impl BuildingRegistry {
    pub fn new(base_storage: Quantity) -> Self {
        Self {
            world: World::new(),
            index: BTreeMap::new(),
            by_kind: BTreeMap::new(),
            unlocked: BuildingKind::ALL
                .into_iter()
                .filter(|k| k.initially_unlocked())
                .collect(),
            next_id: 1,
            base_storage,
        }
    }

    /// Reserve a fresh id. Saturates at `u32::MAX`, where registering
    /// the repeated id is refused as a duplicate.
    pub fn allocate_id(&mut self) -> BuildingId {
        let id = BuildingId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn base_storage(&self) -> Quantity {
        self.base_storage
    }

    /// Add a building. Returns false (and changes nothing) on a duplicate id.
    pub fn register(&mut self, building: Building, ledger: &mut ResourceLedger) -> bool {
        if self.index.contains_key(&building.id) {
            return false;
        }
        self.insert(building);
        self.recompute_capacities(ledger);
        true
    }

    pub fn unregister(&mut self, id: BuildingId, ledger: &mut ResourceLedger) -> Option<Building> {
        let entity = self.index.remove(&id)?;
        let building = self.world.remove_one::<Building>(entity).ok()?;
        let _ = self.world.despawn(entity);
        if let Some(ids) = self.by_kind.get_mut(&building.kind) {
            ids.retain(|b| *b != id);
        }
        self.recompute_capacities(ledger);
        Some(building)
    }

    fn insert(&mut self, building: Building) {
        let id = building.id;
        let kind = building.kind;
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        let entity = self.world.spawn((building,));
        self.index.insert(id, entity);
        self.by_kind.entry(kind).or_default().push(id);
    }

    /// Sum usable contributions and set every pool to `base + storage`.
    pub fn recompute_capacities(&self, ledger: &mut ResourceLedger) -> CapacityTotals {
        let totals = self.capacity_totals();
        let ceiling = self.base_storage + totals.storage;
        for r in ResourceType::ALL {
            ledger.set_capacity(r, ceiling);
        }
        totals
    }

    pub fn capacity_totals(&self) -> CapacityTotals {
        let mut totals = CapacityTotals::default();
        for (_, building) in self.world.query::<&Building>().iter() {
            totals.housing += building.housing();
            totals.storage += Quantity::from_units(building.storage());
        }
        totals
    }

    pub fn housing_capacity(&self) -> u32 {
        self.capacity_totals().housing
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    pub fn contains(&self, id: BuildingId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Snapshot of one building.
    pub fn get(&self, id: BuildingId) -> Option<Building> {
        let entity = *self.index.get(&id)?;
        self.world
            .get::<&Building>(entity)
            .ok()
            .map(|b| (*b).clone())
    }

    /// Every building, ordered by id.
    pub fn all(&self) -> Vec<Building> {
        self.index.keys().filter_map(|id| self.get(*id)).collect()
    }

    pub fn ids(&self) -> Vec<BuildingId> {
        self.index.keys().copied().collect()
    }

    pub fn by_kind(&self, kind: BuildingKind) -> Vec<Building> {
        self.by_kind
            .get(&kind)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    pub fn usable_count_by_kind(&self, kind: BuildingKind) -> u32 {
        self.by_kind(kind).iter().filter(|b| b.is_usable()).count() as u32
    }

    /// Highest completed level among buildings of `kind`.
    pub fn level_by_kind(&self, kind: BuildingKind) -> u8 {
        self.by_kind(kind)
            .iter()
            .map(|b| b.level)
            .max()
            .unwrap_or(0)
    }

    pub fn levels(&self) -> BTreeMap<BuildingKind, u8> {
        BuildingKind::ALL
            .into_iter()
            .map(|k| (k, self.level_by_kind(k)))
            .collect()
    }

    pub fn usable_counts(&self) -> BTreeMap<BuildingKind, u32> {
        BuildingKind::ALL
            .into_iter()
            .map(|k| (k, self.usable_count_by_kind(k)))
            .collect()
    }

    // ========================================================================
    // UNLOCKS
    // ========================================================================

    /// Returns true if the kind was newly unlocked.
    pub fn unlock(&mut self, kind: BuildingKind) -> bool {
        self.unlocked.insert(kind)
    }

    pub fn is_unlocked(&self, kind: BuildingKind) -> bool {
        self.unlocked.contains(&kind)
    }

    pub fn unlocked_kinds(&self) -> Vec<BuildingKind> {
        self.unlocked.iter().copied().collect()
    }

    // ========================================================================
    // LIFECYCLE PASS-THROUGHS
    // ========================================================================

    pub fn advance_construction(
        &mut self,
        id: BuildingId,
        delta: f64,
        ledger: &mut ResourceLedger,
    ) -> Vec<LifecycleEvent> {
        self.mutate(id, ledger, |b| b.advance_construction(delta))
    }

    pub fn apply_damage(
        &mut self,
        id: BuildingId,
        amount: u32,
        ledger: &mut ResourceLedger,
    ) -> Vec<LifecycleEvent> {
        self.mutate(id, ledger, |b| b.apply_damage(amount))
    }

    pub fn repair(
        &mut self,
        id: BuildingId,
        amount: u32,
        ledger: &mut ResourceLedger,
    ) -> Vec<LifecycleEvent> {
        self.mutate(id, ledger, |b| b.repair(amount))
    }

    pub fn set_condition(
        &mut self,
        id: BuildingId,
        condition: BuildingCondition,
        ledger: &mut ResourceLedger,
    ) -> Vec<LifecycleEvent> {
        self.mutate(id, ledger, |b| b.set_condition(condition))
    }

    pub fn start_upgrade(
        &mut self,
        id: BuildingId,
        ledger: &mut ResourceLedger,
    ) -> Vec<LifecycleEvent> {
        self.mutate(id, ledger, |b| b.start_upgrade())
    }

    pub fn mark_burned(
        &mut self,
        id: BuildingId,
        ledger: &mut ResourceLedger,
    ) -> Vec<LifecycleEvent> {
        self.mutate(id, ledger, |b| b.mark_burned())
    }

    /// Apply `f` to one building, recomputing capacities when its condition
    /// or level changed. Unknown ids are a no-op.
    fn mutate<F>(
        &mut self,
        id: BuildingId,
        ledger: &mut ResourceLedger,
        f: F,
    ) -> Vec<LifecycleEvent>
    where
        F: FnOnce(&mut Building) -> Vec<LifecycleEvent>,
    {
        let Some(entity) = self.index.get(&id).copied() else {
            return Vec::new();
        };
        let (events, changed) = match self.world.get::<&mut Building>(entity) {
            Ok(mut building) => {
                let before = (building.condition, building.level);
                let events = f(&mut *building);
                (events, before != (building.condition, building.level))
            }
            Err(_) => return Vec::new(),
        };
        if changed {
            self.recompute_capacities(ledger);
        }
        events
    }

    /// Rebuild from saved state without touching any ledger.
    pub fn restore(
        base_storage: Quantity,
        buildings: Vec<Building>,
        unlocked: Vec<BuildingKind>,
        next_id: u32,
    ) -> Self {
        let mut registry = Self::new(base_storage);
        registry.unlocked = unlocked.into_iter().collect();
        for building in buildings {
            if !registry.index.contains_key(&building.id) {
                registry.insert(building);
            }
        }
        registry.next_id = registry.next_id.max(next_id);
        registry
    }
}
