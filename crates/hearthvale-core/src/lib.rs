//! Hearthvale Core - Village Restoration Simulation Engine
//!
//! A ruined village is rebuilt one building at a time. Villagers work in
//! usable buildings and produce resources every second, construction and
//! repair advance with simulated time, and a quest chain gates which
//! building kinds can be raised.
//!
//! # Architecture
//!
//! - **Registry**: building instances live in a `hecs` world, indexed by id
//!   and kind. Storage and housing capacity follow the usable buildings.
//! - **Ledger**: four bounded resource pools.
//! - **Assignment**: villager roster and worker slots, plus the production tick.
//! - **Quests**: per-quest status and objective flags over the static catalog.
//! - **Engine**: [`engine::Village`] owns all of the above and drives them.
//!
//! # Example
//!
//! ```rust,no_run
//! use hearthvale_core::prelude::*;
//!
//! let mut village = Village::new(VillageConfig::default());
//! village.discover();
//!
//! loop {
//!     village.update(1.0);
//!     for event in village.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod assignment;
pub mod building;
pub mod config;
pub mod construction;
pub mod engine;
pub mod events;
pub mod hazards;
pub mod ledger;
pub mod persistence;
pub mod quests;
pub mod registry;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::assignment::{VillagerAssignment, VillagerId};
    pub use crate::building::{Building, BuildingId, GridPosition};
    pub use crate::config::VillageConfig;
    pub use crate::engine::Village;
    pub use crate::events::VillageEvent;
    pub use crate::ledger::ResourceLedger;
    pub use crate::persistence::SaveError;
    pub use crate::registry::BuildingRegistry;
    pub use hearthvale_logic::buildings::BuildingKind;
    pub use hearthvale_logic::condition::BuildingCondition;
    pub use hearthvale_logic::resources::{Quantity, ResourceBundle, ResourceType};
    pub use hearthvale_logic::villagers::VillagerKind;
}
