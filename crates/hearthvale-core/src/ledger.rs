//! Resource ledger - per-resource balance and capacity
//!
//! Deposits clamp silently at capacity and report what was actually added.
//! Withdrawals are all-or-nothing.

use hearthvale_logic::resources::{Quantity, ResourceBundle, ResourceType};
use serde::{Deserialize, Serialize};

/// Balance and ceiling for one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub amount: Quantity,
    pub capacity: Quantity,
}

impl ResourcePool {
    pub fn headroom(&self) -> Quantity {
        self.capacity.saturating_sub(self.amount)
    }
}

/// Village stockpile. Each resource has an independent pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub essence: ResourcePool,
    pub materials: ResourcePool,
    pub rare_materials: ResourcePool,
    pub legendary_materials: ResourcePool,
}

impl ResourceLedger {
    /// Empty ledger with every pool capped at `capacity`.
    pub fn new(capacity: Quantity) -> Self {
        let pool = ResourcePool {
            amount: Quantity::ZERO,
            capacity,
        };
        Self {
            essence: pool,
            materials: pool,
            rare_materials: pool,
            legendary_materials: pool,
        }
    }

    pub fn pool(&self, resource: ResourceType) -> &ResourcePool {
        match resource {
            ResourceType::Essence => &self.essence,
            ResourceType::Materials => &self.materials,
            ResourceType::RareMaterials => &self.rare_materials,
            ResourceType::LegendaryMaterials => &self.legendary_materials,
        }
    }

    fn pool_mut(&mut self, resource: ResourceType) -> &mut ResourcePool {
        match resource {
            ResourceType::Essence => &mut self.essence,
            ResourceType::Materials => &mut self.materials,
            ResourceType::RareMaterials => &mut self.rare_materials,
            ResourceType::LegendaryMaterials => &mut self.legendary_materials,
        }
    }

    pub fn balance(&self, resource: ResourceType) -> Quantity {
        self.pool(resource).amount
    }

    pub fn capacity(&self, resource: ResourceType) -> Quantity {
        self.pool(resource).capacity
    }

    /// Add up to the remaining headroom. Returns the amount actually added.
    pub fn deposit(&mut self, resource: ResourceType, amount: Quantity) -> Quantity {
        let pool = self.pool_mut(resource);
        let added = amount.min(pool.headroom());
        pool.amount += added;
        added
    }

    /// Remove `amount` only if the full amount is available.
    pub fn withdraw(&mut self, resource: ResourceType, amount: Quantity) -> bool {
        let pool = self.pool_mut(resource);
        match pool.amount.checked_sub(amount) {
            Some(rest) => {
                pool.amount = rest;
                true
            }
            None => false,
        }
    }

    /// Change the ceiling, clamping the balance down if it now exceeds it.
    pub fn set_capacity(&mut self, resource: ResourceType, new_max: Quantity) {
        let pool = self.pool_mut(resource);
        pool.capacity = new_max;
        if pool.amount > new_max {
            pool.amount = new_max;
        }
    }

    /// Fill level in [0, 1]. Zero-capacity pools read as empty.
    pub fn storage_percentage(&self, resource: ResourceType) -> f64 {
        let pool = self.pool(resource);
        if pool.capacity.is_zero() {
            return 0.0;
        }
        (pool.amount.tenths() as f64 / pool.capacity.tenths() as f64).clamp(0.0, 1.0)
    }

    pub fn can_afford(&self, cost: &ResourceBundle) -> bool {
        cost.iter().all(|(r, q)| self.balance(r) >= q)
    }

    /// Withdraw every line of `cost`, or nothing at all.
    pub fn spend(&mut self, cost: &ResourceBundle) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (r, q) in cost.iter() {
            self.withdraw(r, q);
        }
        true
    }

    /// Deposit every line of `bundle`; returns what was actually added.
    pub fn deposit_bundle(&mut self, bundle: &ResourceBundle) -> ResourceBundle {
        let mut added = ResourceBundle::new();
        for (r, q) in bundle.iter() {
            *added.get_mut(r) = self.deposit(r, q);
        }
        added
    }

    pub fn balances(&self) -> ResourceBundle {
        let mut out = ResourceBundle::new();
        for r in ResourceType::ALL {
            *out.get_mut(r) = self.balance(r);
        }
        out
    }

    pub fn capacities(&self) -> ResourceBundle {
        let mut out = ResourceBundle::new();
        for r in ResourceType::ALL {
            *out.get_mut(r) = self.capacity(r);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(units: u64) -> Quantity {
        Quantity::from_units(units)
    }

    #[test]
    fn test_deposit_clamps_at_capacity() {
        let mut ledger = ResourceLedger::new(q(500));
        assert_eq!(ledger.deposit(ResourceType::Essence, q(100)), q(100));
        assert_eq!(ledger.deposit(ResourceType::Essence, q(450)), q(400));
        assert_eq!(ledger.balance(ResourceType::Essence), q(500));
        assert_eq!(ledger.deposit(ResourceType::Essence, q(1)), Quantity::ZERO);
    }

    #[test]
    fn test_deposit_reports_exact_delta() {
        let mut ledger = ResourceLedger::new(q(50));
        for amount in [q(7), Quantity::from_tenths(33), q(40), q(0)] {
            let before = ledger.balance(ResourceType::Materials);
            let added = ledger.deposit(ResourceType::Materials, amount);
            let after = ledger.balance(ResourceType::Materials);
            assert_eq!(after, (before + amount).min(q(50)));
            assert_eq!(added, after.saturating_sub(before));
        }
    }

    #[test]
    fn test_withdraw_is_all_or_nothing() {
        let mut ledger = ResourceLedger::new(q(500));
        ledger.deposit(ResourceType::Materials, q(30));
        assert!(!ledger.withdraw(ResourceType::Materials, q(31)));
        assert_eq!(ledger.balance(ResourceType::Materials), q(30));
        assert!(ledger.withdraw(ResourceType::Materials, q(30)));
        assert_eq!(ledger.balance(ResourceType::Materials), Quantity::ZERO);
    }

    #[test]
    fn test_set_capacity_clamps_down() {
        let mut ledger = ResourceLedger::new(q(500));
        ledger.deposit(ResourceType::Essence, q(400));
        ledger.set_capacity(ResourceType::Essence, q(250));
        assert_eq!(ledger.balance(ResourceType::Essence), q(250));
        ledger.set_capacity(ResourceType::Essence, q(900));
        assert_eq!(ledger.balance(ResourceType::Essence), q(250));
    }

    #[test]
    fn test_pools_are_independent() {
        let mut ledger = ResourceLedger::new(q(100));
        ledger.deposit(ResourceType::Essence, q(100));
        assert_eq!(ledger.deposit(ResourceType::Materials, q(100)), q(100));
    }

    #[test]
    fn test_storage_percentage() {
        let mut ledger = ResourceLedger::new(q(200));
        ledger.deposit(ResourceType::RareMaterials, q(50));
        assert!((ledger.storage_percentage(ResourceType::RareMaterials) - 0.25).abs() < 1e-9);
        ledger.set_capacity(ResourceType::LegendaryMaterials, Quantity::ZERO);
        assert_eq!(ledger.storage_percentage(ResourceType::LegendaryMaterials), 0.0);
    }

    #[test]
    fn test_spend_is_atomic() {
        let mut ledger = ResourceLedger::new(q(500));
        ledger.deposit(ResourceType::Essence, q(300));
        ledger.deposit(ResourceType::Materials, q(10));

        let cost = ResourceBundle::units(250, 50, 0, 0);
        assert!(!ledger.can_afford(&cost));
        assert!(!ledger.spend(&cost));
        assert_eq!(ledger.balance(ResourceType::Essence), q(300));

        let cheap = ResourceBundle::units(250, 10, 0, 0);
        assert!(ledger.spend(&cheap));
        assert_eq!(ledger.balance(ResourceType::Essence), q(50));
        assert_eq!(ledger.balance(ResourceType::Materials), Quantity::ZERO);
    }

    #[test]
    fn test_deposit_bundle_reports_added() {
        let mut ledger = ResourceLedger::new(q(120));
        ledger.deposit(ResourceType::Essence, q(100));
        let added = ledger.deposit_bundle(&ResourceBundle::units(100, 50, 0, 0));
        assert_eq!(added.essence, q(20));
        assert_eq!(added.materials, q(50));
    }
}
