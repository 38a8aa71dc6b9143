//! Game state: the single mutable aggregate owned by one simulation run.

use std::collections::BTreeSet;

use crate::defs::{BuildingId, Definitions, UpgradeId};

/// A temporary production multiplier (frenzy-style effect).
#[derive(Clone, Debug, PartialEq)]
pub struct Buff {
    pub name: String,
    /// Factor applied to total production while active (7.0 = seven times).
    pub multiplier: f64,
    /// Simulated seconds left.
    pub remaining: f64,
}

/// One line in the in-state event log.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Full state of one economy run. Created once per run, mutated in place
/// by the simulation loop and purchases, torn down by the caller.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Spendable resource. Never negative.
    pub resource: f64,
    /// Lifetime accrual; spending never reduces it.
    pub resource_earned_total: f64,
    /// Value of `resource_earned_total` at the last ascension.
    pub resource_at_last_reset: f64,
    /// Cached instantaneous rate. Recomputed by the produce phase of every
    /// tick; nothing else writes it.
    pub production_rate: f64,
    /// Resource granted per manual click.
    pub click_power: f64,
    /// Owned count per building, aligned to the definitions order.
    pub buildings: Vec<u32>,
    /// Owned upgrades by id. Membership drives effect application.
    pub upgrades_owned: BTreeSet<UpgradeId>,
    pub prestige_level: u32,
    /// Simulated seconds; grows by exactly the sum of tick deltas, across
    /// ascensions too.
    pub elapsed_time: f64,
    /// Manual clicks performed, for click-count unlock rules.
    pub total_clicks: u64,
    /// Active temporary buffs.
    pub buffs: Vec<Buff>,
    /// Recent events, capped at 50 entries. Transient: not persisted.
    pub log: Vec<LogEntry>,
}

impl GameState {
    /// Fresh state for the given definitions, everything at zero.
    pub fn new(defs: &Definitions) -> Self {
        Self {
            resource: 0.0,
            resource_earned_total: 0.0,
            resource_at_last_reset: 0.0,
            production_rate: 0.0,
            click_power: 1.0,
            buildings: vec![0; defs.buildings.len()],
            upgrades_owned: BTreeSet::new(),
            prestige_level: 0,
            elapsed_time: 0.0,
            total_clicks: 0,
            buffs: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Owned count of a building (0 for an unknown id).
    pub fn owned(&self, id: BuildingId) -> u32 {
        self.buildings.get(id).copied().unwrap_or(0)
    }

    pub fn has_upgrade(&self, id: UpgradeId) -> bool {
        self.upgrades_owned.contains(&id)
    }

    /// Total units owned across all building types.
    pub fn total_buildings(&self) -> u32 {
        self.buildings.iter().sum()
    }

    /// Lifetime resource earned since the last ascension.
    pub fn earned_since_reset(&self) -> f64 {
        self.resource_earned_total - self.resource_at_last_reset
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > 50 {
            self.log.remove(0);
        }
    }
}
