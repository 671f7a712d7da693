//! Pure village logic for Hearthvale.
//!
//! This crate holds the static tables and pure functions of the village
//! simulation. Nothing here owns state: functions take plain data and return
//! results, so the engine crate and the headless harness share one source of
//! truth for costs, capacities, rates and quest predicates.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`resources`] | Resource types, fixed-point quantities, bundles and rates |
//! | [`condition`] | Health-to-condition banding and condition seeding |
//! | [`buildings`] | Building kinds, level tables, upgrade costs |
//! | [`villagers`] | Villager kinds, base production, allowed work sites |
//! | [`production`] | Level multipliers and per-villager output |
//! | [`quests`] | Quest definitions, objective predicates, standard catalog |
//! | [`progress`] | Village restoration percentage and tier |

pub mod buildings;
pub mod condition;
pub mod production;
pub mod progress;
pub mod quests;
pub mod resources;
pub mod villagers;
