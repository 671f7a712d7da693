//! Construction and repair queues
//!
//! Construction advances every update: each active site gains
//! `speed / build_time` progress per second. Sites past the concurrency limit
//! wait in order. Auto-repair picks up buildings below a health threshold and
//! heals them a little each repair step.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::building::{BuildingId, LifecycleEvent};
use crate::ledger::ResourceLedger;
use crate::registry::BuildingRegistry;

/// Tuning shared by construction and repair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstructionSettings {
    pub speed: f64,
    pub max_concurrent: usize,
    pub repair_speed: f64,
    pub repair_threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructionQueue {
    active: Vec<BuildingId>,
    waiting: VecDeque<BuildingId>,
    repairs: Vec<BuildingId>,
}

impl ConstructionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[BuildingId] {
        &self.active
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    pub fn repair_queue(&self) -> &[BuildingId] {
        &self.repairs
    }

    pub fn is_queued(&self, id: BuildingId) -> bool {
        self.active.contains(&id) || self.waiting.contains(&id)
    }

    /// Queue a construction site. Returns true when it started immediately,
    /// false when it has to wait (or was already queued).
    pub fn schedule(&mut self, id: BuildingId, max_concurrent: usize) -> bool {
        if self.is_queued(id) {
            return false;
        }
        if self.active.len() < max_concurrent {
            self.active.push(id);
            true
        } else {
            self.waiting.push_back(id);
            false
        }
    }

    /// Forget a building entirely (demolished or reloaded).
    pub fn cancel(&mut self, id: BuildingId) {
        self.active.retain(|b| *b != id);
        self.waiting.retain(|b| *b != id);
        self.repairs.retain(|b| *b != id);
    }

    fn prune_and_promote(&mut self, registry: &BuildingRegistry, max_concurrent: usize) {
        let still_building = |id: &BuildingId| {
            registry
                .get(*id)
                .map(|b| b.is_under_construction())
                .unwrap_or(false)
        };
        self.active.retain(still_building);
        self.waiting.retain(still_building);
        while self.active.len() < max_concurrent {
            match self.waiting.pop_front() {
                Some(id) => self.active.push(id),
                None => break,
            }
        }
    }

    /// Progress every active site by `delta_secs`.
    pub fn advance(
        &mut self,
        registry: &mut BuildingRegistry,
        ledger: &mut ResourceLedger,
        delta_secs: f64,
        settings: &ConstructionSettings,
    ) -> Vec<(BuildingId, LifecycleEvent)> {
        self.prune_and_promote(registry, settings.max_concurrent);

        let mut out = Vec::new();
        for id in self.active.clone() {
            let Some(building) = registry.get(id) else {
                continue;
            };
            let build_time = building.kind.spec().build_time_secs as f64;
            let delta = if build_time > 0.0 {
                settings.speed * delta_secs / build_time
            } else {
                1.0
            };
            for event in registry.advance_construction(id, delta, ledger) {
                out.push((id, event));
            }
        }

        self.prune_and_promote(registry, settings.max_concurrent);
        out
    }

    /// Queue a building for auto-repair. Destroyed, full-health and
    /// under-construction buildings are refused.
    pub fn add_repair(&mut self, id: BuildingId, registry: &BuildingRegistry) -> bool {
        if self.repairs.contains(&id) {
            return false;
        }
        match registry.get(id) {
            Some(b)
                if !b.is_destroyed() && !b.is_under_construction() && b.health < b.max_health =>
            {
                self.repairs.push(id);
                true
            }
            _ => false,
        }
    }

    /// One auto-repair step over `delta_secs`.
    pub fn update_repairs(
        &mut self,
        registry: &mut BuildingRegistry,
        ledger: &mut ResourceLedger,
        delta_secs: f64,
        settings: &ConstructionSettings,
    ) -> Vec<(BuildingId, LifecycleEvent)> {
        self.repairs.retain(|id| {
            registry
                .get(*id)
                .map(|b| b.health < b.max_health && !b.is_destroyed() && !b.is_under_construction())
                .unwrap_or(false)
        });

        if self.repairs.len() < settings.max_concurrent {
            for building in registry.all() {
                if building.is_under_construction()
                    || building.is_destroyed()
                    || building.health_fraction() >= settings.repair_threshold
                {
                    continue;
                }
                self.add_repair(building.id, registry);
            }
        }

        let mut out = Vec::new();
        let count = self.repairs.len().min(settings.max_concurrent);
        for id in self.repairs[..count].to_vec() {
            let Some(building) = registry.get(id) else {
                continue;
            };
            let amount = repair_amount(
                building.max_health,
                building.kind.spec().build_time_secs as f64,
                settings.repair_speed,
                delta_secs,
            );
            for event in registry.repair(id, amount, ledger) {
                out.push((id, event));
            }
        }
        out
    }
}

/// Health restored in one step: `ceil(ceil(max / build_time) * speed * dt)`.
pub fn repair_amount(
    max_health: u32,
    build_time_secs: f64,
    repair_speed: f64,
    delta_secs: f64,
) -> u32 {
    if build_time_secs <= 0.0 {
        return max_health;
    }
    let per_second = (max_health as f64 / build_time_secs).ceil();
    let amount = (per_second * repair_speed * delta_secs).ceil();
    if amount.is_finite() && amount > 0.0 {
        amount.min(u32::MAX as f64) as u32
    } else {
        0
    }
}
