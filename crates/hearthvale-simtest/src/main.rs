//! Hearthvale Headless Simulation Harness
//!
//! Validates the static catalogs and drives scripted villages through the
//! engine. Runs entirely in-process with no frontend.
//!
//! Usage:
//!   cargo run -p hearthvale-simtest
//!   cargo run -p hearthvale-simtest -- --verbose
//!   cargo run -p hearthvale-simtest -- --config village.json

use hearthvale_core::prelude::*;
use hearthvale_core::persistence::SaveData;
use hearthvale_logic::buildings::{housing_capacity, storage_capacity, worker_capacity};
use hearthvale_logic::progress::VillageTier;
use hearthvale_logic::quests::{standard_chapters, standard_quests, QuestStatus};
use hearthvale_logic::villagers::VILLAGER_NAMES;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    println!("=== Hearthvale Simulation Harness ===\n");

    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => match args.get(i + 1).map(std::fs::read_to_string) {
            Some(Ok(json)) => match VillageConfig::from_json(&json) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Bad config: {}", e);
                    std::process::exit(2);
                }
            },
            Some(Err(e)) => {
                eprintln!("Cannot read config: {}", e);
                std::process::exit(2);
            }
            None => {
                eprintln!("--config needs a path");
                std::process::exit(2);
            }
        },
        None => VillageConfig::default(),
    };

    let mut results = Vec::new();

    // 1. Building catalog
    results.extend(validate_building_catalog(verbose));

    // 2. Quest catalog
    results.extend(validate_quest_catalog(verbose));

    // 3. Production arithmetic
    results.extend(validate_production(verbose));

    // 4. Scripted play-through
    results.extend(validate_autoplay(&config, verbose));

    // 5. Save/load
    results.extend(validate_persistence(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Building catalog ─────────────────────────────────────────────────

fn validate_building_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Building Catalog ---");
    let mut results = Vec::new();

    let missing: Vec<String> = BuildingKind::ALL
        .iter()
        .flat_map(|kind| {
            let spec = kind.spec();
            (1..=spec.max_level)
                .filter(move |l| kind.upgrade_cost(*l).is_none())
                .map(move |l| format!("{} L{}", spec.name, l))
        })
        .collect();
    results.push(TestResult {
        name: "catalog_costs_complete".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            "every level has a cost".into()
        } else {
            format!("missing costs: {}", missing.join(", "))
        },
    });

    let no_slots: Vec<_> = BuildingKind::ALL
        .iter()
        .filter(|k| worker_capacity(**k, 1) == 0)
        .map(|k| k.spec().name)
        .collect();
    results.push(TestResult {
        name: "catalog_level_one_has_slots".into(),
        passed: no_slots.is_empty(),
        detail: if no_slots.is_empty() {
            "every kind employs at level 1".into()
        } else {
            format!("no level-1 slots: {}", no_slots.join(", "))
        },
    });

    let total_max_levels: u32 = BuildingKind::ALL
        .iter()
        .map(|k| k.spec().max_level as u32)
        .sum();
    results.push(TestResult {
        name: "catalog_total_levels".into(),
        passed: total_max_levels == 24,
        detail: format!("{} levels across all kinds", total_max_levels),
    });

    let max_housing: u32 = BuildingKind::ALL
        .iter()
        .map(|k| housing_capacity(*k, k.spec().max_level))
        .sum();
    results.push(TestResult {
        name: "catalog_housing_reaches_final_quest".into(),
        passed: max_housing >= 50,
        detail: format!("{} housing with one of each kind maxed", max_housing),
    });

    if verbose {
        for kind in BuildingKind::ALL {
            let spec = kind.spec();
            println!(
                "  {:<14} max L{} hp {:>3} build {:>4.0}s storage/L {:>3}",
                spec.name,
                spec.max_level,
                spec.max_health,
                spec.build_time_secs,
                storage_capacity(kind, 1)
            );
        }
    }

    results
}

// ── 2. Quest catalog ────────────────────────────────────────────────────

fn validate_quest_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Quest Catalog ---");
    let mut results = Vec::new();
    let quests = standard_quests();

    let mut bad_order = Vec::new();
    for (i, q) in quests.iter().enumerate() {
        for pre in &q.prerequisites {
            if !quests[..i].iter().any(|p| &p.id == pre) {
                bad_order.push(format!("{} -> {}", q.id, pre));
            }
        }
    }
    results.push(TestResult {
        name: "quests_prerequisites_ordered".into(),
        passed: bad_order.is_empty(),
        detail: if bad_order.is_empty() {
            format!("{} quests in dependency order", quests.len())
        } else {
            format!("out of order: {}", bad_order.join(", "))
        },
    });

    let unreachable: Vec<_> = quests
        .iter()
        .flat_map(|q| q.required_levels.iter().map(move |r| (q.id.as_str(), *r)))
        .filter(|(_, (kind, level))| *level > kind.spec().max_level)
        .map(|(id, _)| id)
        .collect();
    results.push(TestResult {
        name: "quests_requirements_reachable".into(),
        passed: unreachable.is_empty(),
        detail: if unreachable.is_empty() {
            "all required levels within max".into()
        } else {
            format!("unreachable: {}", unreachable.join(", "))
        },
    });

    let chapters = standard_chapters();
    let in_chapters: usize = chapters.iter().map(|c| c.quests.len()).sum();
    results.push(TestResult {
        name: "quests_chapters_cover_catalog".into(),
        passed: in_chapters == quests.len(),
        detail: format!("{} chapters list {} quests", chapters.len(), in_chapters),
    });

    if verbose {
        for q in &quests {
            println!("  [ch{}] {} ({} objectives)", q.chapter, q.id, q.objectives.len());
        }
    }

    results
}

// ── 3. Production ───────────────────────────────────────────────────────

fn validate_production(_verbose: bool) -> Vec<TestResult> {
    println!("--- Production ---");
    let mut results = Vec::new();

    let config = VillageConfig {
        starting_resources: ResourceBundle::default(),
        ..Default::default()
    };
    let mut village = Village::new(config);
    let workshop = village.registry.allocate_id();
    village.registry.register(
        Building::seeded(
            workshop,
            BuildingKind::Workshop,
            GridPosition::new(0, 0),
            1,
            BuildingCondition::Good,
        ),
        &mut village.ledger,
    );
    let a = village.villagers.recruit(VillagerKind::Worker, VILLAGER_NAMES[0]);
    let b = village.villagers.recruit(VillagerKind::Worker, VILLAGER_NAMES[1]);
    let c = village.villagers.recruit(VillagerKind::Worker, VILLAGER_NAMES[2]);
    let assigned = village.assign(a, workshop) && village.assign(b, workshop);
    let third_rejected = !village.assign(c, workshop);
    results.push(TestResult {
        name: "production_worker_slots".into(),
        passed: assigned && third_rejected,
        detail: format!("2 assigned: {}, third rejected: {}", assigned, third_rejected),
    });

    village.update(10.0);
    let materials = village.ledger.balance(ResourceType::Materials);
    let essence = village.ledger.balance(ResourceType::Essence);
    results.push(TestResult {
        name: "production_ten_seconds".into(),
        passed: materials == Quantity::from_units(30) && essence == Quantity::from_units(15),
        detail: format!("materials {} essence {}", materials, essence),
    });

    village.set_building_condition(workshop, BuildingCondition::Ruined);
    village.update(10.0);
    results.push(TestResult {
        name: "production_stops_when_ruined".into(),
        passed: village.ledger.balance(ResourceType::Materials) == materials,
        detail: format!("materials {}", village.ledger.balance(ResourceType::Materials)),
    });

    results
}

// ── 4. Autoplay ─────────────────────────────────────────────────────────

/// Greedy driver: staff every slot, recruit when housing allows, and start
/// the cheapest affordable upgrade.
fn autoplay_step(village: &mut Village) {
    for villager in village.villagers.unassigned() {
        for building in village.registry.all() {
            if village.assign(villager, building.id) {
                break;
            }
        }
    }

    if village.recruit(VillagerKind::Worker).is_none() {
        let _ = village.recruit(VillagerKind::Miner);
    }

    let mut candidates: Vec<_> = village
        .registry
        .all()
        .into_iter()
        .filter(|b| !b.is_under_construction() && b.level < b.max_level())
        .filter_map(|b| {
            b.kind
                .upgrade_cost(b.level + 1)
                .map(|cost| (cost.essence, b.id))
        })
        .collect();
    candidates.sort();
    for (_, id) in candidates {
        if village.upgrade_building(id) {
            break;
        }
    }
}

fn validate_autoplay(config: &VillageConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Autoplay ---");
    let mut results = Vec::new();

    let mut village = Village::new(config.clone());
    village.discover();

    let hours = 4;
    let mut over_capacity = 0;
    let mut over_slots = 0;
    for second in 0..hours * 3600 {
        if second % 5 == 0 {
            autoplay_step(&mut village);
        }
        village.update(1.0);

        for resource in ResourceType::ALL {
            if village.ledger.balance(resource) > village.ledger.capacity(resource) {
                over_capacity += 1;
            }
        }
        for building in village.registry.all() {
            if village.villagers.assigned_count(building.id) > building.worker_capacity() {
                over_slots += 1;
            }
        }
        for event in village.drain_events() {
            if verbose {
                if let VillageEvent::QuestCompleted { id } = &event {
                    println!("  [{:>6.0}s] quest completed: {}", village.sim_time(), id);
                }
            }
        }
    }

    results.push(TestResult {
        name: "autoplay_storage_bounded".into(),
        passed: over_capacity == 0,
        detail: format!("{} ticks over capacity", over_capacity),
    });
    results.push(TestResult {
        name: "autoplay_slots_bounded".into(),
        passed: over_slots == 0,
        detail: format!("{} over-staffed observations", over_slots),
    });

    let first_done = village.quests.status("discovery_begins") == Some(QuestStatus::Completed);
    results.push(TestResult {
        name: "autoplay_first_quest".into(),
        passed: first_done,
        detail: format!(
            "{} quests completed, {}% of the chain",
            village.quests.completed_count(),
            village.quests.progress_percent()
        ),
    });

    let tier = village.tier();
    results.push(TestResult {
        name: "autoplay_progress".into(),
        passed: tier > VillageTier::Ruins,
        detail: format!(
            "{}% restored ({}), population {}",
            village.progress(),
            tier.label(),
            village.population()
        ),
    });

    if verbose {
        match serde_json::to_string(&village.balances()) {
            Ok(json) => println!("  final balances: {}", json),
            Err(e) => println!("  final balances unavailable: {}", e),
        }
    }

    results
}

// ── 5. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(config: &VillageConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut village = Village::new(config.clone());
    village.discover();
    for second in 0..600 {
        if second % 5 == 0 {
            autoplay_step(&mut village);
        }
        village.update(1.0);
    }

    let mut buf = Vec::new();
    let saved = village.save(&mut buf);
    let binary_ok = match saved.and_then(|_| Village::load(&buf[..])) {
        Ok(loaded) => SaveData::capture(&loaded) == SaveData::capture(&village),
        Err(e) => {
            println!("  binary round trip failed: {}", e);
            false
        }
    };
    results.push(TestResult {
        name: "persistence_binary".into(),
        passed: binary_ok,
        detail: format!("{} bytes", buf.len()),
    });

    let json_ok = match village.to_json().and_then(|j| Village::from_json(&j)) {
        Ok(loaded) => SaveData::capture(&loaded) == SaveData::capture(&village),
        Err(e) => {
            println!("  json round trip failed: {}", e);
            false
        }
    };
    results.push(TestResult {
        name: "persistence_json".into(),
        passed: json_ok,
        detail: "json blob reproduces state".into(),
    });

    results
}
