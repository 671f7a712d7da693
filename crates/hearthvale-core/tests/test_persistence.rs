//! Integration tests for saving and loading a partly restored village.

use hearthvale_core::persistence::{
    load_json, load_village, save_json, save_village, SaveData, SaveError,
};
use hearthvale_core::prelude::*;
use hearthvale_logic::quests::QuestStatus;

/// Three buildings in different conditions, partly filled pools and the
/// first quest half done.
fn mid_game_village() -> Village {
    let mut village = Village::default();
    village.discover();
    let hall = village.registry.by_kind(BuildingKind::TownHall)[0].id;
    village.upgrade_building(hall);
    for _ in 0..30 {
        village.update(1.0);
    }
    let worker = village.villagers.unassigned()[0];
    village.assign(worker, hall);
    for _ in 0..7 {
        village.update(1.0);
    }

    let market = village.registry.by_kind(BuildingKind::Market)[0].id;
    let barracks = village.registry.by_kind(BuildingKind::Barracks)[0].id;
    village.set_building_condition(market, BuildingCondition::Burned);
    village.set_building_condition(barracks, BuildingCondition::Destroyed);
    village.stamp(1_700_000_000_000);
    village.drain_events();
    village
}

#[test]
fn test_mid_game_state_is_reproduced() {
    let village = mid_game_village();
    assert_eq!(
        village.quests.status("discovery_begins"),
        Some(QuestStatus::InProgress)
    );
    assert_eq!(
        village.quests.objective_flags("discovery_begins"),
        Some(&[true, false][..])
    );
    let essence = village.ledger.balance(ResourceType::Essence);
    assert!(!essence.is_zero());
    assert!(essence < village.ledger.capacity(ResourceType::Essence));

    let mut buf = Vec::new();
    save_village(&mut buf, &village).unwrap();
    let loaded = load_village(&buf[..]).unwrap();

    assert_eq!(SaveData::capture(&loaded), SaveData::capture(&village));
    assert_eq!(loaded.quests.active_id(), Some("discovery_begins"));
    assert_eq!(
        loaded.quests.objective_flags("discovery_begins"),
        Some(&[true, false][..])
    );
    let conditions: Vec<_> = loaded.registry.all().iter().map(|b| b.condition).collect();
    assert!(conditions.contains(&BuildingCondition::Good));
    assert!(conditions.contains(&BuildingCondition::Burned));
    assert!(conditions.contains(&BuildingCondition::Destroyed));
    assert_eq!(loaded.last_tick_ms(), 1_700_000_000_000);
    assert!(loaded.is_scene_unlocked("village_elder_arrives"));
}

#[test]
fn test_json_blob_matches_binary() {
    let village = mid_game_village();
    let json = save_json(&village).unwrap();
    let from_json = load_json(&json).unwrap();

    let mut buf = Vec::new();
    save_village(&mut buf, &village).unwrap();
    let from_bin = load_village(&buf[..]).unwrap();

    assert_eq!(SaveData::capture(&from_json), SaveData::capture(&from_bin));
}

#[test]
fn test_json_keeps_fractional_clock_exact() {
    let mut village = Village::default();
    village.discover();
    let hall = village.registry.by_kind(BuildingKind::TownHall)[0].id;
    assert!(village.upgrade_building(hall));
    // Odd deltas leave sim time and construction progress off any round value
    for _ in 0..100 {
        village.update(0.0137);
    }
    assert!(village.registry.get(hall).unwrap().is_under_construction());

    let json = village.to_json().unwrap();
    let loaded = Village::from_json(&json).unwrap();
    assert_eq!(SaveData::capture(&loaded), SaveData::capture(&village));
    assert_eq!(loaded.sim_time(), village.sim_time());
}

#[test]
fn test_loaded_village_keeps_running() {
    let village = mid_game_village();
    let mut buf = Vec::new();
    village.save(&mut buf).unwrap();

    let mut original = village;
    let mut loaded = Village::load(&buf[..]).unwrap();
    for _ in 0..10 {
        original.update(1.0);
        loaded.update(1.0);
    }
    assert_eq!(loaded.balances(), original.balances());
    assert_eq!(loaded.sim_time(), original.sim_time());
}

#[test]
fn test_load_does_not_catch_up() {
    let village = mid_game_village();
    let before = village.balances();
    let json = village.to_json().unwrap();
    let mut loaded = Village::from_json(&json).unwrap();
    assert_eq!(loaded.balances(), before);

    // Catch-up is its own call
    let report = loaded.catch_up(1_700_000_010_000);
    assert_eq!(report.elapsed_secs, 10.0);
    assert!(!report.added.is_empty());
}

#[test]
fn test_future_version_is_rejected() {
    let mut data = SaveData::capture(&mid_game_village());
    data.version += 1;
    let json = serde_json::to_string(&data).unwrap();
    assert!(matches!(
        load_json(&json),
        Err(SaveError::VersionMismatch { .. })
    ));
}
