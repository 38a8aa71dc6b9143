//! Building and upgrade definition tables.
//!
//! Definitions are immutable data threaded explicitly into every engine
//! call. Owned counts live in [`GameState`], so one `Definitions` value can
//! back any number of independent simulation runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::GameState;

/// Geometric price growth shared by every standard building.
pub const PRICE_GROWTH_FACTOR: f64 = 1.15;

/// Lifetime resource worth one cubed prestige level.
pub const PRESTIGE_BASE: f64 = 1_000_000_000_000.0;

/// Index into [`Definitions::buildings`].
pub type BuildingId = usize;

/// Index into [`Definitions::upgrades`].
pub type UpgradeId = usize;

/// A single type of passive producer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingDef {
    pub name: String,
    /// Cost of the first unit.
    pub base_price: f64,
    /// Resource per second per unit, before multipliers.
    pub base_cps: f64,
    /// Price multiplier applied per owned unit.
    pub price_growth: f64,
}

impl BuildingDef {
    pub fn new(name: &str, base_price: f64, base_cps: f64) -> Self {
        Self {
            name: name.to_string(),
            base_price,
            base_cps,
            price_growth: PRICE_GROWTH_FACTOR,
        }
    }

    /// Current cost of the next unit, given the owned count.
    pub fn price(&self, owned: u32) -> f64 {
        self.base_price * self.price_growth.powi(owned as i32)
    }

    /// Total cost of buying `amount` units one after another.
    pub fn bulk_price(&self, owned: u32, amount: u32) -> f64 {
        (0..amount).map(|i| self.price(owned + i)).sum()
    }
}

/// What an upgrade does once owned. Magnitudes are deltas composed as
/// `1 + magnitude`, so a magnitude of 1.0 is a doubling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// Multiplies the production of every building.
    ProductionMultiplier(f64),
    /// Multiplies manual click yield.
    ClickMultiplier(f64),
    /// Multiplies the production of one building type.
    BuildingMultiplier { target: BuildingId, magnitude: f64 },
}

/// When an upgrade becomes purchasable. Evaluated as a pure predicate of
/// the current state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum UnlockRule {
    Always,
    /// Requires owning at least `count` units of one building.
    BuildingCount { building: BuildingId, count: u32 },
    /// Requires a number of manual clicks.
    TotalClicks(u64),
    /// Requires a lifetime earned total.
    TotalEarned(f64),
}

impl UnlockRule {
    pub fn is_met(&self, state: &GameState) -> bool {
        match *self {
            UnlockRule::Always => true,
            UnlockRule::BuildingCount { building, count } => state.owned(building) >= count,
            UnlockRule::TotalClicks(n) => state.total_clicks >= n,
            UnlockRule::TotalEarned(amount) => state.resource_earned_total >= amount,
        }
    }
}

/// A one-time purchase with a permanent effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub name: String,
    pub price: f64,
    pub effect: UpgradeEffect,
    pub unlock: UnlockRule,
}

impl UpgradeDef {
    pub fn new(name: &str, price: f64, effect: UpgradeEffect, unlock: UnlockRule) -> Self {
        Self {
            name: name.to_string(),
            price,
            effect,
            unlock,
        }
    }
}

/// A definitions table that would break the engine's invariants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefsError {
    NonPositiveBuildingPrice(BuildingId),
    BadPriceGrowth(BuildingId),
    NonPositiveUpgradePrice(UpgradeId),
    BadUpgradeTarget(UpgradeId),
}

impl fmt::Display for DefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefsError::NonPositiveBuildingPrice(id) => {
                write!(f, "building {id} has a non-positive base price")
            }
            DefsError::BadPriceGrowth(id) => {
                write!(f, "building {id} has a price growth factor below 1")
            }
            DefsError::NonPositiveUpgradePrice(id) => {
                write!(f, "upgrade {id} has a non-positive price")
            }
            DefsError::BadUpgradeTarget(id) => {
                write!(f, "upgrade {id} refers to an unknown building")
            }
        }
    }
}

impl std::error::Error for DefsError {}

/// The immutable definition context for one game economy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Definitions {
    pub buildings: Vec<BuildingDef>,
    pub upgrades: Vec<UpgradeDef>,
}

impl Definitions {
    /// Build a validated definitions table.
    pub fn new(buildings: Vec<BuildingDef>, upgrades: Vec<UpgradeDef>) -> Result<Self, DefsError> {
        let defs = Self {
            buildings,
            upgrades,
        };
        defs.validate()?;
        Ok(defs)
    }

    /// Check the invariants the simulation relies on. Prices must be
    /// strictly positive: the auto-buy loop terminates only because every
    /// purchase costs something.
    pub fn validate(&self) -> Result<(), DefsError> {
        for (id, building) in self.buildings.iter().enumerate() {
            if !(building.base_price > 0.0) {
                return Err(DefsError::NonPositiveBuildingPrice(id));
            }
            if !(building.price_growth >= 1.0) {
                return Err(DefsError::BadPriceGrowth(id));
            }
        }
        for (id, upgrade) in self.upgrades.iter().enumerate() {
            if !(upgrade.price > 0.0) {
                return Err(DefsError::NonPositiveUpgradePrice(id));
            }
            let target = match (upgrade.effect, upgrade.unlock) {
                (UpgradeEffect::BuildingMultiplier { target, .. }, _) => Some(target),
                (_, UnlockRule::BuildingCount { building, .. }) => Some(building),
                _ => None,
            };
            if let Some(target) = target {
                if target >= self.buildings.len() {
                    return Err(DefsError::BadUpgradeTarget(id));
                }
            }
        }
        Ok(())
    }

    pub fn building(&self, id: BuildingId) -> Option<&BuildingDef> {
        self.buildings.get(id)
    }

    pub fn upgrade(&self, id: UpgradeId) -> Option<&UpgradeDef> {
        self.upgrades.get(id)
    }

    /// The classic 16-building reference table with a hand-tuned upgrade
    /// set: click doublers, per-building doublers, and global production
    /// boosts gated behind lifetime earnings.
    pub fn standard() -> Self {
        let buildings = vec![
            BuildingDef::new("Cursor", 15.0, 0.1),
            BuildingDef::new("Grandma", 100.0, 1.0),
            BuildingDef::new("Farm", 1_100.0, 8.0),
            BuildingDef::new("Mine", 12_000.0, 47.0),
            BuildingDef::new("Factory", 130_000.0, 260.0),
            BuildingDef::new("Bank", 1_400_000.0, 1_400.0),
            BuildingDef::new("Temple", 20_000_000.0, 7_800.0),
            BuildingDef::new("Wizard tower", 330_000_000.0, 44_000.0),
            BuildingDef::new("Shipment", 5_100_000_000.0, 260_000.0),
            BuildingDef::new("Alchemy lab", 75_000_000_000.0, 1_600_000.0),
            BuildingDef::new("Portal", 1e12, 10_000_000.0),
            BuildingDef::new("Time machine", 14e12, 65_000_000.0),
            BuildingDef::new("Antimatter condenser", 170e12, 430_000_000.0),
            BuildingDef::new("Prism", 2.1e15, 2_900_000_000.0),
            BuildingDef::new("Chancemaker", 26e15, 21e9),
            BuildingDef::new("Fractal engine", 310e15, 150e9),
        ];

        let click = UpgradeEffect::ClickMultiplier(1.0);
        let doubles = |target: BuildingId| UpgradeEffect::BuildingMultiplier {
            target,
            magnitude: 1.0,
        };
        let owns = |building: BuildingId, count: u32| UnlockRule::BuildingCount { building, count };

        let upgrades = vec![
            UpgradeDef::new("Reinforced index finger", 100.0, click, UnlockRule::TotalClicks(15)),
            UpgradeDef::new(
                "Carpal tunnel prevention cream",
                500.0,
                click,
                UnlockRule::TotalClicks(100),
            ),
            UpgradeDef::new("Ambidextrous", 10_000.0, click, UnlockRule::TotalClicks(1_000)),
            UpgradeDef::new("Forwards from grandma", 1_000.0, doubles(1), owns(1, 1)),
            UpgradeDef::new("Steel-plated rolling pins", 5_000.0, doubles(1), owns(1, 5)),
            UpgradeDef::new("Lubricated dentures", 50_000.0, doubles(1), owns(1, 25)),
            UpgradeDef::new("Cheap hoes", 11_000.0, doubles(2), owns(2, 1)),
            UpgradeDef::new("Fertilizer", 55_000.0, doubles(2), owns(2, 5)),
            UpgradeDef::new("Cookie trees", 550_000.0, doubles(2), owns(2, 25)),
            UpgradeDef::new("Sugar gas", 120_000.0, doubles(3), owns(3, 1)),
            UpgradeDef::new("Megadrill", 600_000.0, doubles(3), owns(3, 5)),
            UpgradeDef::new("Sturdier conveyor belts", 1_300_000.0, doubles(4), owns(4, 1)),
            UpgradeDef::new(
                "Specialized chocolate chips",
                2_000_000.0,
                UpgradeEffect::ProductionMultiplier(0.01),
                UnlockRule::TotalEarned(1e6),
            ),
            UpgradeDef::new(
                "Designer cocoa beans",
                4_000_000.0,
                UpgradeEffect::ProductionMultiplier(0.02),
                UnlockRule::TotalEarned(5e6),
            ),
            UpgradeDef::new(
                "Underworld ovens",
                8_000_000.0,
                UpgradeEffect::ProductionMultiplier(0.03),
                UnlockRule::TotalEarned(2e7),
            ),
            UpgradeDef::new(
                "Exotic nuts",
                25_000_000.0,
                UpgradeEffect::ProductionMultiplier(0.04),
                UnlockRule::TotalEarned(5e7),
            ),
            UpgradeDef::new(
                "Arcane sugar",
                50_000_000.0,
                UpgradeEffect::ProductionMultiplier(0.05),
                UnlockRule::TotalEarned(1e8),
            ),
        ];

        Self {
            buildings,
            upgrades,
        }
    }

    /// A table of `count` buildings derived entirely from the closed-form
    /// growth formulas, with no upgrades.
    pub fn generated(count: usize) -> Self {
        let buildings = (0..count)
            .map(|n| {
                BuildingDef::new(
                    &format!("Tier {n}"),
                    generated_base_price(n),
                    generated_base_cps(n),
                )
            })
            .collect();
        Self {
            buildings,
            upgrades: Vec::new(),
        }
    }
}

/// Base production for a formula-generated building. Index 0 is a fixed
/// constant; the closed form is degenerate there.
pub fn generated_base_cps(index: usize) -> f64 {
    if index == 0 {
        return 0.1;
    }
    let n = index as f64;
    (n.powf(n * 0.5 + 2.0) * 10.0).ceil() / 10.0
}

/// Base price for a formula-generated building. Super-exponential: the
/// magnitude outruns `f64` only far beyond any playable index.
pub fn generated_base_price(index: usize) -> f64 {
    let n = index as f64;
    let mut base = n + 9.0;
    if index >= 5 {
        base += (n - 5.0).powf(1.75) * 5.0;
    }
    base * 10f64.powf(n) * (n - 14.0).max(1.0)
}

/// Prestige level earned by a lifetime resource total:
/// `floor((earned / 1e12)^(1/3))`.
pub fn prestige_level_for(earned: f64) -> u32 {
    if earned <= 0.0 {
        return 0;
    }
    (earned / PRESTIGE_BASE).cbrt().floor() as u32
}
