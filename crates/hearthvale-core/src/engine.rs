//! Village engine - main entry point for running the simulation
//!
//! `Village` owns every component and is the only writer. The driver calls
//! [`Village::update`] with elapsed seconds; construction advances every
//! update while production, repair, hazards and quest evaluation run on a
//! fixed cadence with the time accumulated since their last pass.

use std::collections::BTreeSet;

use hearthvale_logic::buildings::BuildingKind;
use hearthvale_logic::condition::BuildingCondition;
use hearthvale_logic::progress::{village_progress, VillageTier};
use hearthvale_logic::quests::WorldSnapshot;
use hearthvale_logic::resources::{ProductionRates, ResourceBundle};
use hearthvale_logic::villagers::{VillagerKind, VILLAGER_NAMES};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assignment::{ProductionReport, VillagerAssignment, VillagerId};
use crate::building::{Building, BuildingId, GridPosition, LifecycleEvent};
use crate::config::VillageConfig;
use crate::construction::ConstructionQueue;
use crate::events::{EventLog, VillageEvent};
use crate::hazards::roll_hazards;
use crate::ledger::ResourceLedger;
use crate::persistence::SaveError;
use crate::quests::{QuestBook, QuestCompletion, SweepResult};
use crate::registry::BuildingRegistry;

/// Main simulation context
pub struct Village {
    pub config: VillageConfig,
    pub ledger: ResourceLedger,
    pub registry: BuildingRegistry,
    pub villagers: VillagerAssignment,
    pub quests: QuestBook,
    pub construction: ConstructionQueue,
    pub(crate) story_scenes: BTreeSet<String>,
    pub(crate) events: EventLog,
    pub(crate) rng: StdRng,
    pub(crate) discovered: bool,
    /// Simulated seconds since the village was created.
    pub(crate) sim_time: f64,
    /// Wall-clock stamp (ms) of the last production, for catch-up.
    pub(crate) last_tick_ms: u64,

    // Update timing
    pub(crate) last_production_update: f64,
}

impl Village {
    pub fn new(config: VillageConfig) -> Self {
        let base = config.base_storage;
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            ledger: ResourceLedger::new(base),
            registry: BuildingRegistry::new(base),
            villagers: VillagerAssignment::new(),
            quests: QuestBook::standard(),
            construction: ConstructionQueue::new(),
            story_scenes: BTreeSet::new(),
            events: EventLog::new(),
            rng,
            discovered: false,
            sim_time: 0.0,
            last_tick_ms: 0,
            last_production_update: 0.0,
            config,
        }
    }

    /// Start a new game: ruins of every kind, starting stock and villagers,
    /// and the first quest in progress. Returns false if already discovered.
    pub fn discover(&mut self) -> bool {
        if self.discovered {
            return false;
        }
        self.discovered = true;

        for (i, kind) in BuildingKind::ALL.into_iter().enumerate() {
            let id = self.registry.allocate_id();
            let ruin = Building::seeded(
                id,
                kind,
                GridPosition::new(i as i32 * 4, 0),
                0,
                BuildingCondition::Ruined,
            );
            self.registry.register(ruin, &mut self.ledger);
        }

        let added = self.ledger.deposit_bundle(&self.config.starting_resources);
        if !added.is_empty() {
            self.events.push(VillageEvent::ResourcesGranted { added });
        }

        for _ in 0..self.config.starting_population {
            let name = self.random_name();
            let id = self.villagers.recruit(VillagerKind::Worker, name);
            self.events.push(VillageEvent::VillagerRecruited {
                id,
                kind: VillagerKind::Worker,
            });
        }

        self.events.push(VillageEvent::VillageDiscovered);
        info!(
            "Village discovered with {} villagers",
            self.villagers.population()
        );

        let snapshot = self.snapshot();
        let sweep = self.quests.unlock_sweep(&snapshot);
        self.record_sweep(sweep);
        true
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    // ========================================================================
    // UPDATE
    // ========================================================================

    /// Advance the simulation by `delta_seconds`.
    pub fn update(&mut self, delta_seconds: f64) {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return;
        }
        self.sim_time += delta_seconds;

        // Every update: construction progress
        if self.config.auto_construct {
            let settings = self.config.construction_settings();
            let events = self.construction.advance(
                &mut self.registry,
                &mut self.ledger,
                delta_seconds,
                &settings,
            );
            for (id, event) in events {
                self.record_lifecycle(id, event);
            }
        }

        // Fixed cadence: production, repair, hazards, quests
        let interval = self.config.production_interval_secs;
        if self.sim_time - self.last_production_update >= interval {
            let elapsed = self.sim_time - self.last_production_update;
            self.last_production_update = self.sim_time;
            self.cadence_pass(elapsed);
        }
    }

    fn cadence_pass(&mut self, elapsed: f64) {
        let report = self.villagers.tick(elapsed, &self.registry, &mut self.ledger);
        if !report.added.is_empty() {
            debug!(
                "Produced over {:.1}s: essence {} materials {} rare {} legendary {}",
                elapsed,
                report.added.essence,
                report.added.materials,
                report.added.rare_materials,
                report.added.legendary_materials
            );
        }

        if self.config.auto_repair {
            let settings = self.config.construction_settings();
            let events = self.construction.update_repairs(
                &mut self.registry,
                &mut self.ledger,
                elapsed,
                &settings,
            );
            for (id, event) in events {
                self.record_lifecycle(id, event);
            }
        }

        if self.config.hazards_enabled {
            if let Some(report) = roll_hazards(
                &mut self.registry,
                &mut self.ledger,
                self.config.hazard_chance_per_hour,
                elapsed,
                &mut self.rng,
            ) {
                if let Some(b) = self.registry.get(report.building) {
                    info!(
                        "{} at {} #{} ({} damage)",
                        report.kind.description(),
                        b.kind.spec().name,
                        report.building.0,
                        report.damage
                    );
                }
                self.events.push(VillageEvent::HazardStruck {
                    id: report.building,
                    kind: report.kind,
                    damage: report.damage,
                });
                for event in report.events {
                    self.record_lifecycle(report.building, event);
                }
            }
        }

        self.evaluate_quests();
    }

    /// Apply one production burst for wall-clock time since the last stamp.
    /// The first call only records the stamp.
    pub fn catch_up(&mut self, now_ms: u64) -> ProductionReport {
        if self.last_tick_ms == 0 || now_ms <= self.last_tick_ms {
            self.last_tick_ms = self.last_tick_ms.max(now_ms);
            return ProductionReport::default();
        }
        let elapsed_ms = now_ms - self.last_tick_ms;
        self.last_tick_ms = now_ms;

        let report = self.villagers.tick(
            elapsed_ms as f64 / 1000.0,
            &self.registry,
            &mut self.ledger,
        );
        info!(
            "Catch-up over {}s added essence {} materials {}",
            elapsed_ms / 1000,
            report.added.essence,
            report.added.materials
        );
        self.events.push(VillageEvent::CatchUpApplied {
            elapsed_secs: elapsed_ms / 1000,
            added: report.added,
        });
        report
    }

    /// Record the wall-clock time of the latest tick.
    pub fn stamp(&mut self, now_ms: u64) {
        self.last_tick_ms = now_ms;
    }

    pub fn last_tick_ms(&self) -> u64 {
        self.last_tick_ms
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    // ========================================================================
    // BUILDINGS
    // ========================================================================

    /// Place a new level-1 construction site. Requires the kind unlocked and
    /// the level-1 cost paid.
    pub fn place_building(
        &mut self,
        kind: BuildingKind,
        position: GridPosition,
    ) -> Option<BuildingId> {
        if !self.registry.is_unlocked(kind) {
            return None;
        }
        let cost = kind.upgrade_cost(1)?;
        if !self.ledger.spend(&cost) {
            return None;
        }

        let id = self.registry.allocate_id();
        let site = Building::new_construction(id, kind, position, 1);
        self.registry.register(site, &mut self.ledger);
        self.construction
            .schedule(id, self.config.max_concurrent_constructions);
        self.events.push(VillageEvent::BuildingPlaced { id, kind });
        info!("Placed {} #{}", kind.spec().name, id.0);
        Some(id)
    }

    /// Pay for and start the next level. Rejects max-level, destroyed,
    /// locked and already-building sites.
    pub fn upgrade_building(&mut self, id: BuildingId) -> bool {
        let Some(building) = self.registry.get(id) else {
            return false;
        };
        if building.is_under_construction()
            || building.is_destroyed()
            || building.level >= building.max_level()
            || !self.registry.is_unlocked(building.kind)
        {
            return false;
        }
        let Some(cost) = building.kind.upgrade_cost(building.level + 1) else {
            return false;
        };
        if !self.ledger.spend(&cost) {
            return false;
        }

        for event in self.registry.start_upgrade(id, &mut self.ledger) {
            self.record_lifecycle(id, event);
        }
        self.construction
            .schedule(id, self.config.max_concurrent_constructions);
        self.events.push(VillageEvent::UpgradeStarted {
            id,
            kind: building.kind,
            target_level: building.level + 1,
        });
        true
    }

    /// Remove a building, releasing its workers.
    pub fn demolish(&mut self, id: BuildingId) -> Option<Building> {
        if !self.registry.contains(id) {
            return None;
        }
        for villager in self.villagers.release_building(id) {
            self.events.push(VillageEvent::VillagerUnassigned { villager });
        }
        self.construction.cancel(id);
        let building = self.registry.unregister(id, &mut self.ledger)?;
        self.events.push(VillageEvent::BuildingDemolished {
            id,
            kind: building.kind,
        });
        info!("Demolished {} #{}", building.kind.spec().name, id.0);
        Some(building)
    }

    /// Manual repair. Returns false when nothing changed.
    pub fn repair_building(&mut self, id: BuildingId, amount: u32) -> bool {
        let before = self.registry.get(id).map(|b| b.health);
        let events = self.registry.repair(id, amount, &mut self.ledger);
        let after = self.registry.get(id).map(|b| b.health);
        for event in events {
            self.record_lifecycle(id, event);
        }
        before.is_some() && before != after
    }

    pub fn damage_building(&mut self, id: BuildingId, amount: u32) -> bool {
        let before = self.registry.get(id).map(|b| b.health);
        let events = self.registry.apply_damage(id, amount, &mut self.ledger);
        let after = self.registry.get(id).map(|b| b.health);
        for event in events {
            self.record_lifecycle(id, event);
        }
        before.is_some() && before != after
    }

    /// Administrative condition override.
    pub fn set_building_condition(&mut self, id: BuildingId, condition: BuildingCondition) -> bool {
        if !self.registry.contains(id) {
            return false;
        }
        for event in self.registry.set_condition(id, condition, &mut self.ledger) {
            self.record_lifecycle(id, event);
        }
        if condition == BuildingCondition::UnderConstruction {
            self.construction
                .schedule(id, self.config.max_concurrent_constructions);
        }
        true
    }

    // ========================================================================
    // VILLAGERS
    // ========================================================================

    /// Kind's unlock building stands at level 1 or higher.
    pub fn villager_kind_unlocked(&self, kind: VillagerKind) -> bool {
        self.registry.level_by_kind(kind.spec().unlocked_by) >= 1
    }

    /// Recruit one villager if the kind is unlocked and housing has room.
    pub fn recruit(&mut self, kind: VillagerKind) -> Option<VillagerId> {
        if !self.villager_kind_unlocked(kind) {
            return None;
        }
        if self.villagers.population() >= self.registry.housing_capacity() {
            return None;
        }
        let name = self.random_name();
        let id = self.villagers.recruit(kind, name);
        self.events.push(VillageEvent::VillagerRecruited { id, kind });
        Some(id)
    }

    pub fn assign(&mut self, villager: VillagerId, building: BuildingId) -> bool {
        let ok = self.villagers.assign(villager, building, &self.registry);
        if ok {
            self.events
                .push(VillageEvent::VillagerAssigned { villager, building });
        }
        ok
    }

    pub fn unassign(&mut self, villager: VillagerId) -> bool {
        let ok = self.villagers.unassign(villager);
        if ok {
            self.events.push(VillageEvent::VillagerUnassigned { villager });
        }
        ok
    }

    pub fn population(&self) -> u32 {
        self.villagers.population()
    }

    pub fn production_rate(&self) -> ProductionRates {
        self.villagers.compute_total_production(&self.registry)
    }

    fn random_name(&mut self) -> String {
        let i = self.rng.gen_range(0..VILLAGER_NAMES.len());
        VILLAGER_NAMES[i].to_string()
    }

    // ========================================================================
    // QUESTS
    // ========================================================================

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            levels: self.registry.levels(),
            usable: self.registry.usable_counts(),
            population: self.villagers.population(),
            resources: self.ledger.balances(),
        }
    }

    /// One evaluation pass: unlock sweep, then evaluate the active quest
    /// until nothing more completes. Rewards are applied as each quest
    /// completes.
    pub fn evaluate_quests(&mut self) -> Vec<QuestCompletion> {
        let snapshot = self.snapshot();
        let sweep = self.quests.unlock_sweep(&snapshot);
        self.record_sweep(sweep);

        let mut completed = Vec::new();
        // Each completion removes one quest from play, so this terminates.
        while let Some(active) = self.quests.active_id().map(str::to_string) {
            let snapshot = self.snapshot();
            let Some(completion) = self.quests.evaluate_objectives(&active, &snapshot) else {
                break;
            };
            self.apply_completion(&completion);
            completed.push(completion);
        }
        completed
    }

    pub fn set_active_quest(&mut self, id: &str) -> bool {
        let ok = self.quests.set_active(id);
        if ok {
            self.events.push(VillageEvent::QuestStarted { id: id.to_string() });
        }
        ok
    }

    fn apply_completion(&mut self, completion: &QuestCompletion) {
        info!("Quest completed: {}", completion.quest_id);
        self.events.push(VillageEvent::QuestCompleted {
            id: completion.quest_id.clone(),
        });

        let rewards = &completion.rewards;
        let added = self.ledger.deposit_bundle(&rewards.resources);
        if added != rewards.resources {
            warn!(
                "Quest {} reward clamped by storage capacity",
                completion.quest_id
            );
        }
        if !added.is_empty() {
            self.events.push(VillageEvent::ResourcesGranted { added });
        }
        for kind in &rewards.unlock_buildings {
            if self.registry.unlock(*kind) {
                info!("Building unlocked: {}", kind.spec().name);
                self.events.push(VillageEvent::BuildingUnlocked { kind: *kind });
            }
        }
        for scene in &rewards.story_scenes {
            self.unlock_scene(scene);
        }
        self.record_sweep(completion.sweep.clone());
    }

    fn record_sweep(&mut self, sweep: SweepResult) {
        for id in sweep.unlocked {
            info!("Quest unlocked: {}", id);
            self.events.push(VillageEvent::QuestUnlocked { id });
        }
        if let Some(id) = sweep.activated {
            self.events.push(VillageEvent::QuestStarted { id });
        }
    }

    // ========================================================================
    // STORY AND PROGRESS
    // ========================================================================

    fn unlock_scene(&mut self, scene: &str) {
        if self.story_scenes.insert(scene.to_string()) {
            self.events.push(VillageEvent::StorySceneUnlocked {
                scene: scene.to_string(),
            });
        }
    }

    pub fn is_scene_unlocked(&self, scene: &str) -> bool {
        self.story_scenes.contains(scene)
    }

    pub fn story_scenes(&self) -> impl Iterator<Item = &str> {
        self.story_scenes.iter().map(String::as_str)
    }

    /// Restoration progress as a rounded percentage.
    pub fn progress(&self) -> u32 {
        village_progress(&self.registry.levels())
    }

    pub fn tier(&self) -> VillageTier {
        VillageTier::from_progress(self.progress())
    }

    pub fn balances(&self) -> ResourceBundle {
        self.ledger.balances()
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<VillageEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn record_lifecycle(&mut self, id: BuildingId, event: LifecycleEvent) {
        let kind = match self.registry.get(id) {
            Some(b) => b.kind,
            None => return,
        };
        match event {
            LifecycleEvent::ConstructionCompleted { level } => {
                info!("{} #{} reached level {}", kind.spec().name, id.0, level);
                self.events
                    .push(VillageEvent::ConstructionCompleted { id, kind, level });
                if level == 1 {
                    self.unlock_scene(kind.spec().story_scene);
                }
            }
            LifecycleEvent::ConditionChanged { from, to } => {
                self.events
                    .push(VillageEvent::ConditionChanged { id, from, to });
            }
            LifecycleEvent::Destroyed => {
                info!("{} #{} was destroyed", kind.spec().name, id.0);
                self.events.push(VillageEvent::BuildingDestroyed { id, kind });
            }
            LifecycleEvent::FullyRepaired => {
                self.events.push(VillageEvent::BuildingRepaired { id });
            }
        }
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Save village state to a writer (bincode)
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        crate::persistence::save_village(writer, self)
    }

    /// Load village state from a reader (bincode)
    pub fn load<R: std::io::Read>(reader: R) -> Result<Self, SaveError> {
        crate::persistence::load_village(reader)
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        crate::persistence::save_json(self)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        crate::persistence::load_json(json)
    }
}

impl Default for Village {
    fn default() -> Self {
        Self::new(VillageConfig::default())
    }
}
