//! An incremental-game economy simulation and optimization engine.
//!
//! Models a single scalar resource ("cookies") accruing over time from
//! purchasable production buildings with geometrically increasing prices,
//! one-shot multiplicative upgrades, prestige, and temporary buffs, and
//! drives automated play with a greedy purchase policy.
//!
//! Hosts supply an immutable [`Definitions`] table and a [`SimConfig`];
//! the engine exposes queryable [`GameState`] snapshots, per-building CPS
//! breakdowns, ranked purchase recommendations, and a versioned flat save
//! layout. Everything is single-threaded and deterministic: two runs with
//! identical inputs produce bit-identical final states.

pub mod analyzer;
pub mod cps;
pub mod defs;
pub mod logic;
pub mod optimizer;
pub mod save;
pub mod simulator;
pub mod state;

pub use analyzer::{evaluate_ascension, time_to_goal, AscensionEval};
pub use defs::{
    BuildingDef, BuildingId, Definitions, DefsError, UnlockRule, UpgradeDef, UpgradeEffect,
    UpgradeId,
};
pub use logic::PurchaseError;
pub use optimizer::{PurchaseKind, PurchaseOption};
pub use save::{LoadError, SaveData};
pub use simulator::{ConfigError, SimConfig, SimStats, Simulator};
pub use state::{Buff, GameState, LogEntry};
