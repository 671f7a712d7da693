//! Resource vocabulary and fixed-point quantities.
//!
//! All stockpile arithmetic uses [`Quantity`], a non-negative fixed-point
//! value with one decimal digit (stored as tenths). Production rates are
//! fractional per second and only become quantities once truncated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Resource categories tracked by the village ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResourceType {
    Essence = 0,
    Materials = 1,
    RareMaterials = 2,
    LegendaryMaterials = 3,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Essence,
        ResourceType::Materials,
        ResourceType::RareMaterials,
        ResourceType::LegendaryMaterials,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Essence => "essence",
            Self::Materials => "materials",
            Self::RareMaterials => "rare_materials",
            Self::LegendaryMaterials => "legendary_materials",
        }
    }

    /// Dense index for array-backed storage.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Self::Essence),
            1 => Some(Self::Materials),
            2 => Some(Self::RareMaterials),
            3 => Some(Self::LegendaryMaterials),
            _ => None,
        }
    }
}

// ============================================================================
// QUANTITY
// ============================================================================

/// Non-negative amount with one decimal digit of precision.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Whole units (`from_units(5)` is 5.0).
    pub const fn from_units(units: u64) -> Self {
        Self(units * 10)
    }

    pub const fn from_tenths(tenths: u64) -> Self {
        Self(tenths)
    }

    pub const fn tenths(self) -> u64 {
        self.0
    }

    /// Floor a fractional amount to one decimal place.
    ///
    /// Negative, NaN and infinite inputs become zero. A tiny epsilon absorbs
    /// float error so that e.g. `3.0 * 1.1` does not floor to `3.2`.
    pub fn truncate_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::ZERO;
        }
        Self((value * 10.0 + 1e-9).floor() as u64)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 10.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_sub(other.0))
    }

    pub fn checked_sub(self, other: Quantity) -> Option<Quantity> {
        self.0.checked_sub(other.0).map(Quantity)
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        *self = self.saturating_add(rhs);
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

// ============================================================================
// BUNDLES AND RATES
// ============================================================================

/// One quantity per resource type: costs, rewards, snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBundle {
    pub essence: Quantity,
    pub materials: Quantity,
    pub rare_materials: Quantity,
    pub legendary_materials: Quantity,
}

impl ResourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle from whole units in ledger order.
    pub const fn units(essence: u64, materials: u64, rare: u64, legendary: u64) -> Self {
        Self {
            essence: Quantity::from_units(essence),
            materials: Quantity::from_units(materials),
            rare_materials: Quantity::from_units(rare),
            legendary_materials: Quantity::from_units(legendary),
        }
    }

    pub fn with(mut self, resource: ResourceType, amount: Quantity) -> Self {
        *self.get_mut(resource) = amount;
        self
    }

    pub fn get(&self, resource: ResourceType) -> Quantity {
        match resource {
            ResourceType::Essence => self.essence,
            ResourceType::Materials => self.materials,
            ResourceType::RareMaterials => self.rare_materials,
            ResourceType::LegendaryMaterials => self.legendary_materials,
        }
    }

    pub fn get_mut(&mut self, resource: ResourceType) -> &mut Quantity {
        match resource {
            ResourceType::Essence => &mut self.essence,
            ResourceType::Materials => &mut self.materials,
            ResourceType::RareMaterials => &mut self.rare_materials,
            ResourceType::LegendaryMaterials => &mut self.legendary_materials,
        }
    }

    /// Non-zero lines in ledger order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, Quantity)> + '_ {
        ResourceType::ALL
            .into_iter()
            .map(move |r| (r, self.get(r)))
            .filter(|(_, q)| !q.is_zero())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Per-second production rate for each resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionRates {
    pub essence: f64,
    pub materials: f64,
    pub rare_materials: f64,
    pub legendary_materials: f64,
}

impl ProductionRates {
    pub const fn new(essence: f64, materials: f64, rare: f64, legendary: f64) -> Self {
        Self {
            essence,
            materials,
            rare_materials: rare,
            legendary_materials: legendary,
        }
    }

    pub fn get(&self, resource: ResourceType) -> f64 {
        match resource {
            ResourceType::Essence => self.essence,
            ResourceType::Materials => self.materials,
            ResourceType::RareMaterials => self.rare_materials,
            ResourceType::LegendaryMaterials => self.legendary_materials,
        }
    }

    pub fn get_mut(&mut self, resource: ResourceType) -> &mut f64 {
        match resource {
            ResourceType::Essence => &mut self.essence,
            ResourceType::Materials => &mut self.materials,
            ResourceType::RareMaterials => &mut self.rare_materials,
            ResourceType::LegendaryMaterials => &mut self.legendary_materials,
        }
    }

    pub fn scaled(&self, factor: f64) -> ProductionRates {
        ProductionRates::new(
            self.essence * factor,
            self.materials * factor,
            self.rare_materials * factor,
            self.legendary_materials * factor,
        )
    }

    pub fn accumulate(&mut self, other: &ProductionRates) {
        for r in ResourceType::ALL {
            *self.get_mut(r) += other.get(r);
        }
    }

    /// Amounts produced over `elapsed_secs`, each floored to one decimal.
    pub fn over(&self, elapsed_secs: f64) -> ResourceBundle {
        let mut out = ResourceBundle::new();
        for r in ResourceType::ALL {
            *out.get_mut(r) = Quantity::truncate_f64(self.get(r) * elapsed_secs);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_units_and_display() {
        assert_eq!(Quantity::from_units(3).tenths(), 30);
        assert_eq!(Quantity::from_tenths(45).to_string(), "4.5");
        assert_eq!(Quantity::from_units(12).to_string(), "12.0");
    }

    #[test]
    fn test_truncate_floors_to_tenths() {
        assert_eq!(Quantity::truncate_f64(0.45), Quantity::from_tenths(4));
        assert_eq!(Quantity::truncate_f64(30.0), Quantity::from_units(30));
        assert_eq!(Quantity::truncate_f64(0.09), Quantity::ZERO);
    }

    #[test]
    fn test_truncate_absorbs_float_error() {
        // 0.1 * 3 = 0.30000000000000004, 0.7 * 3 = 2.0999999999999996
        assert_eq!(Quantity::truncate_f64(0.1 * 3.0), Quantity::from_tenths(3));
        assert_eq!(Quantity::truncate_f64(0.7 * 3.0), Quantity::from_tenths(21));
    }

    #[test]
    fn test_truncate_rejects_garbage() {
        assert_eq!(Quantity::truncate_f64(-5.0), Quantity::ZERO);
        assert_eq!(Quantity::truncate_f64(f64::NAN), Quantity::ZERO);
        assert_eq!(Quantity::truncate_f64(f64::INFINITY), Quantity::ZERO);
    }

    #[test]
    fn test_checked_sub() {
        let a = Quantity::from_units(5);
        assert_eq!(a.checked_sub(Quantity::from_units(2)), Some(Quantity::from_units(3)));
        assert_eq!(a.checked_sub(Quantity::from_units(6)), None);
    }

    #[test]
    fn test_bundle_iter_skips_zero() {
        let b = ResourceBundle::units(100, 0, 10, 0);
        let lines: Vec<_> = b.iter().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], (ResourceType::Essence, Quantity::from_units(100)));
        assert_eq!(lines[1], (ResourceType::RareMaterials, Quantity::from_units(10)));
        assert!(ResourceBundle::new().is_empty());
    }

    #[test]
    fn test_rates_over_elapsed() {
        let rates = ProductionRates::new(1.5, 3.0, 0.45, 0.0);
        let out = rates.over(1.0);
        assert_eq!(out.essence, Quantity::from_tenths(15));
        assert_eq!(out.materials, Quantity::from_units(3));
        assert_eq!(out.rare_materials, Quantity::from_tenths(4));
        assert!(out.legendary_materials.is_zero());
    }

    #[test]
    fn test_resource_type_roundtrip() {
        for r in ResourceType::ALL {
            assert_eq!(ResourceType::from_u8(r as u8), Some(r));
        }
        assert_eq!(ResourceType::from_u8(9), None);
    }

    #[test]
    fn test_quantity_serializes_as_tenths() {
        let json = serde_json::to_string(&Quantity::from_units(2)).unwrap();
        assert_eq!(json, "20");
    }
}
