//! Building instances and their lifecycle state machine
//!
//! A building is either under construction or in one of the health-banded
//! operational conditions. Every lifecycle operation mutates the building
//! fully and then returns the notifications it produced.

use hearthvale_logic::buildings::{self, BuildingKind};
use hearthvale_logic::condition::{band_for_health, health_fraction, BuildingCondition};
use serde::{Deserialize, Serialize};

/// Progress within this distance of 1.0 counts as finished.
const PROGRESS_EPSILON: f64 = 1e-9;

/// Stable building identifier, allocated by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

/// Grid cell the building occupies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Notification returned by a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    ConstructionCompleted {
        level: u8,
    },
    ConditionChanged {
        from: BuildingCondition,
        to: BuildingCondition,
    },
    Destroyed,
    FullyRepaired,
}

/// A building instance (stored as a component in the registry's world)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub position: GridPosition,
    /// Completed level. 0 means ruins.
    pub level: u8,
    /// Level reached when the current construction finishes.
    pub target_level: u8,
    pub condition: BuildingCondition,
    pub health: u32,
    pub max_health: u32,
    /// 0..=1, meaningful only while under construction.
    pub construction_progress: f64,
}

impl Building {
    /// Fresh placement: no health, building toward `target_level`.
    pub fn new_construction(
        id: BuildingId,
        kind: BuildingKind,
        position: GridPosition,
        target_level: u8,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            level: target_level.saturating_sub(1),
            target_level,
            condition: BuildingCondition::UnderConstruction,
            health: 0,
            max_health: kind.spec().max_health,
            construction_progress: 0.0,
        }
    }

    /// Pre-existing building with an explicit starting condition.
    pub fn seeded(
        id: BuildingId,
        kind: BuildingKind,
        position: GridPosition,
        level: u8,
        condition: BuildingCondition,
    ) -> Self {
        let max_health = kind.spec().max_health;
        Self {
            id,
            kind,
            position,
            level,
            target_level: level,
            condition,
            health: condition.seeded_health(max_health),
            max_health,
            construction_progress: 0.0,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.condition.is_usable()
    }

    pub fn is_under_construction(&self) -> bool {
        self.condition.is_under_construction()
    }

    pub fn is_destroyed(&self) -> bool {
        self.condition == BuildingCondition::Destroyed
    }

    pub fn health_fraction(&self) -> f64 {
        health_fraction(self.health, self.max_health)
    }

    pub fn max_level(&self) -> u8 {
        self.kind.spec().max_level
    }

    /// Housing contributed while usable.
    pub fn housing(&self) -> u32 {
        if self.is_usable() {
            buildings::housing_capacity(self.kind, self.level)
        } else {
            0
        }
    }

    /// Storage contributed to each pool while usable.
    pub fn storage(&self) -> u64 {
        if self.is_usable() {
            buildings::storage_capacity(self.kind, self.level)
        } else {
            0
        }
    }

    pub fn worker_capacity(&self) -> u32 {
        buildings::worker_capacity(self.kind, self.level)
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Advance construction by `delta` progress. No-op unless under
    /// construction. Finishing sets the target level, full health and Good.
    pub fn advance_construction(&mut self, delta: f64) -> Vec<LifecycleEvent> {
        if !self.is_under_construction() {
            return Vec::new();
        }
        let delta = if delta.is_finite() { delta } else { 0.0 };
        self.construction_progress = (self.construction_progress + delta).clamp(0.0, 1.0);
        if self.construction_progress < 1.0 - PROGRESS_EPSILON {
            return Vec::new();
        }

        self.construction_progress = 1.0;
        self.level = self.target_level;
        self.health = self.max_health;
        self.condition = BuildingCondition::Good;
        vec![
            LifecycleEvent::ConditionChanged {
                from: BuildingCondition::UnderConstruction,
                to: BuildingCondition::Good,
            },
            LifecycleEvent::ConstructionCompleted { level: self.level },
        ]
    }

    /// Remove health and re-band. No-op while under construction.
    pub fn apply_damage(&mut self, amount: u32) -> Vec<LifecycleEvent> {
        if self.is_under_construction() || amount == 0 {
            return Vec::new();
        }
        self.health = self.health.saturating_sub(amount);
        self.reband()
    }

    /// Add health and re-band. Allowed on Destroyed buildings; no-op while
    /// under construction.
    pub fn repair(&mut self, amount: u32) -> Vec<LifecycleEvent> {
        if self.is_under_construction() || amount == 0 {
            return Vec::new();
        }
        let was_full = self.health >= self.max_health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        let mut events = self.reband();
        if !was_full && self.health == self.max_health {
            events.push(LifecycleEvent::FullyRepaired);
        }
        events
    }

    /// Administrative override: seed health for `condition`.
    pub fn set_condition(&mut self, condition: BuildingCondition) -> Vec<LifecycleEvent> {
        let from = self.condition;
        self.condition = condition;
        self.health = condition.seeded_health(self.max_health);
        if condition == BuildingCondition::UnderConstruction {
            self.construction_progress = 0.0;
            self.target_level = self.target_level.max(self.level);
        }

        let mut events = Vec::new();
        if from != condition {
            events.push(LifecycleEvent::ConditionChanged {
                from,
                to: condition,
            });
            if condition == BuildingCondition::Destroyed {
                events.push(LifecycleEvent::Destroyed);
            }
        }
        events
    }

    /// Begin construction of the next level. Caller checks cost and limits.
    pub fn start_upgrade(&mut self) -> Vec<LifecycleEvent> {
        self.target_level = self.level.saturating_add(1).min(self.max_level());
        self.set_condition(BuildingCondition::UnderConstruction)
    }

    /// Fire damage that leaves the building standing marks it Burned
    /// without touching health.
    pub fn mark_burned(&mut self) -> Vec<LifecycleEvent> {
        if self.is_under_construction() || self.health == 0 {
            return Vec::new();
        }
        let from = self.condition;
        self.condition = BuildingCondition::Burned;
        if from == BuildingCondition::Burned {
            Vec::new()
        } else {
            vec![LifecycleEvent::ConditionChanged {
                from,
                to: BuildingCondition::Burned,
            }]
        }
    }

    fn reband(&mut self) -> Vec<LifecycleEvent> {
        let from = self.condition;
        let to = band_for_health(self.health, self.max_health);
        if from == to {
            return Vec::new();
        }
        self.condition = to;
        let mut events = vec![LifecycleEvent::ConditionChanged { from, to }];
        if to == BuildingCondition::Destroyed {
            events.push(LifecycleEvent::Destroyed);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BuildingCondition::*;

    fn workshop(condition: BuildingCondition) -> Building {
        Building::seeded(
            BuildingId(1),
            BuildingKind::Workshop,
            GridPosition::default(),
            1,
            condition,
        )
    }

    #[test]
    fn test_construction_completes_in_two_halves() {
        let mut b = Building::new_construction(
            BuildingId(1),
            BuildingKind::Workshop,
            GridPosition::new(2, 3),
            1,
        );
        assert_eq!(b.level, 0);
        assert!(b.advance_construction(0.5).is_empty());
        let events = b.advance_construction(0.5);
        assert_eq!(b.condition, Good);
        assert_eq!(b.health, b.max_health);
        assert_eq!(b.level, 1);
        assert!(events.contains(&LifecycleEvent::ConstructionCompleted { level: 1 }));
    }

    #[test]
    fn test_construction_accumulates_float_steps() {
        let mut b = Building::new_construction(
            BuildingId(1),
            BuildingKind::Workshop,
            GridPosition::default(),
            1,
        );
        let mut done = false;
        for _ in 0..20 {
            done |= !b.advance_construction(1.0 / 20.0).is_empty();
        }
        assert!(done);
        assert_eq!(b.condition, Good);
    }

    #[test]
    fn test_advance_construction_noop_when_operational() {
        let mut b = workshop(Damaged);
        let before = b.clone();
        assert!(b.advance_construction(1.0).is_empty());
        assert_eq!(b, before);
    }

    #[test]
    fn test_progress_clamps() {
        let mut b = Building::new_construction(
            BuildingId(1),
            BuildingKind::Market,
            GridPosition::default(),
            1,
        );
        b.advance_construction(-3.0);
        assert_eq!(b.construction_progress, 0.0);
        b.advance_construction(7.0);
        assert_eq!(b.construction_progress, 1.0);
    }

    #[test]
    fn test_damage_to_zero_destroys_once() {
        let mut b = workshop(Good);
        let events = b.apply_damage(500);
        assert_eq!(b.health, 0);
        assert_eq!(b.condition, Destroyed);
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == LifecycleEvent::Destroyed)
                .count(),
            1
        );
        assert!(b.apply_damage(10).is_empty());
    }

    #[test]
    fn test_damage_noop_under_construction() {
        let mut b = Building::new_construction(
            BuildingId(1),
            BuildingKind::Temple,
            GridPosition::default(),
            1,
        );
        assert!(b.apply_damage(50).is_empty());
        assert_eq!(b.condition, UnderConstruction);
    }

    #[test]
    fn test_damage_rebands() {
        let mut b = workshop(Excellent);
        let events = b.apply_damage(60);
        assert_eq!(b.health, 40);
        assert_eq!(b.condition, Damaged);
        assert_eq!(
            events,
            vec![LifecycleEvent::ConditionChanged {
                from: Excellent,
                to: Damaged
            }]
        );
    }

    #[test]
    fn test_repair_to_full_fires_once() {
        let mut b = workshop(Damaged);
        let events = b.repair(1000);
        assert_eq!(b.health, 100);
        assert_eq!(b.condition, Excellent);
        assert!(events.contains(&LifecycleEvent::FullyRepaired));
        assert!(b.repair(10).is_empty());
    }

    #[test]
    fn test_repair_revives_destroyed() {
        let mut b = workshop(Destroyed);
        b.repair(60);
        assert_eq!(b.condition, Good);
    }

    #[test]
    fn test_repair_noop_under_construction() {
        let mut b = workshop(Good);
        b.start_upgrade();
        assert!(b.repair(100).is_empty());
        assert_eq!(b.health, 0);
    }

    #[test]
    fn test_set_condition_seeds_health() {
        let mut b = workshop(Destroyed);
        let events = b.set_condition(Good);
        assert_eq!(b.health, 80);
        assert_eq!(band_for_health(b.health, b.max_health), Good);
        assert_eq!(events.len(), 1);
        assert!(b.set_condition(Good).is_empty());
    }

    #[test]
    fn test_set_under_construction_resets_progress() {
        let mut b = Building::new_construction(
            BuildingId(1),
            BuildingKind::Library,
            GridPosition::default(),
            1,
        );
        b.advance_construction(0.4);
        b.set_condition(UnderConstruction);
        assert_eq!(b.construction_progress, 0.0);
    }

    #[test]
    fn test_upgrade_targets_next_level() {
        let mut b = workshop(Good);
        b.start_upgrade();
        assert_eq!(b.target_level, 2);
        assert_eq!(b.level, 1);
        assert!(!b.is_usable());
        b.advance_construction(1.0);
        assert_eq!(b.level, 2);
        assert_eq!(b.worker_capacity(), 4);
    }

    #[test]
    fn test_mark_burned_keeps_health() {
        let mut b = workshop(Good);
        b.apply_damage(30);
        let events = b.mark_burned();
        assert_eq!(b.condition, Burned);
        assert_eq!(b.health, 50);
        assert_eq!(events.len(), 1);
        assert_eq!(b.storage(), 0);
        // Repair re-bands out of Burned
        b.repair(10);
        assert_eq!(b.condition, Good);
    }

    #[test]
    fn test_unusable_contributes_nothing() {
        let b = workshop(Ruined);
        assert_eq!(b.housing(), 0);
        assert_eq!(b.storage(), 0);
        let good = workshop(Good);
        assert_eq!(good.storage(), 150);
    }
}
