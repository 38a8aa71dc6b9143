//! Production rate: multiplier composition and per-building contributions.
//!
//! Every query here is a pure function of `(&Definitions, &GameState)`.
//! Rates are recomputed from scratch on each call; any purchase changes the
//! multiplier composition, so there is no incremental caching.

use crate::defs::{BuildingId, Definitions, UpgradeEffect, UpgradeId};
use crate::state::GameState;

/// Multiplier from the prestige level: +1% per level.
pub fn prestige_multiplier(state: &GameState) -> f64 {
    1.0 + state.prestige_level as f64 * 0.01
}

/// Combined factor of all active temporary buffs.
pub fn buff_multiplier(state: &GameState) -> f64 {
    state
        .buffs
        .iter()
        .filter(|b| b.remaining > 0.0)
        .map(|b| b.multiplier)
        .product()
}

/// Global production multiplier: prestige, owned production upgrades, and
/// buffs. Composition across sources is always multiplicative, never
/// additive; within a source kind it is commutative, so ownership order
/// cannot change the result.
pub fn global_multiplier(defs: &Definitions, state: &GameState) -> f64 {
    let mut multiplier = prestige_multiplier(state);
    for &id in &state.upgrades_owned {
        if let Some(upgrade) = defs.upgrade(id) {
            if let UpgradeEffect::ProductionMultiplier(magnitude) = upgrade.effect {
                multiplier *= 1.0 + magnitude;
            }
        }
    }
    multiplier * buff_multiplier(state)
}

/// Multiplier from owned upgrades targeting one specific building.
pub fn building_multiplier(defs: &Definitions, state: &GameState, building: BuildingId) -> f64 {
    let mut multiplier = 1.0;
    for &id in &state.upgrades_owned {
        if let Some(upgrade) = defs.upgrade(id) {
            if let UpgradeEffect::BuildingMultiplier { target, magnitude } = upgrade.effect {
                if target == building {
                    multiplier *= 1.0 + magnitude;
                }
            }
        }
    }
    multiplier
}

/// Production of one building type with all multipliers applied.
pub fn building_cps(defs: &Definitions, state: &GameState, building: BuildingId) -> f64 {
    let def = match defs.building(building) {
        Some(d) => d,
        None => return 0.0,
    };
    let count = state.owned(building);
    if count == 0 {
        return 0.0;
    }
    def.base_cps
        * count as f64
        * building_multiplier(defs, state, building)
        * global_multiplier(defs, state)
}

/// Instantaneous total production rate.
pub fn total_rate(defs: &Definitions, state: &GameState) -> f64 {
    let global = global_multiplier(defs, state);
    defs.buildings
        .iter()
        .enumerate()
        .filter(|(id, _)| state.owned(*id) > 0)
        .map(|(id, def)| {
            def.base_cps * state.owned(id) as f64 * building_multiplier(defs, state, id) * global
        })
        .sum()
}

/// What the total rate would be with `extra` additional units of one
/// building. Pure hypothetical; the state is never touched.
pub fn rate_with_extra(
    defs: &Definitions,
    state: &GameState,
    building: BuildingId,
    extra: u32,
) -> f64 {
    let global = global_multiplier(defs, state);
    defs.buildings
        .iter()
        .enumerate()
        .map(|(id, def)| {
            let mut count = state.owned(id);
            if id == building {
                count += extra;
            }
            if count == 0 {
                return 0.0;
            }
            def.base_cps * count as f64 * building_multiplier(defs, state, id) * global
        })
        .sum()
}

/// What the total rate would be if one more upgrade were owned. Closed
/// form: a production multiplier scales the whole rate, a building
/// multiplier adds that building's marginal share, and a click multiplier
/// leaves passive production unchanged.
pub fn rate_with_upgrade(defs: &Definitions, state: &GameState, upgrade: UpgradeId) -> f64 {
    let current = total_rate(defs, state);
    let def = match defs.upgrade(upgrade) {
        Some(u) => u,
        None => return current,
    };
    if state.has_upgrade(upgrade) {
        return current;
    }
    match def.effect {
        UpgradeEffect::ProductionMultiplier(magnitude) => current * (1.0 + magnitude),
        UpgradeEffect::BuildingMultiplier { target, magnitude } => {
            current + building_cps(defs, state, target) * magnitude
        }
        UpgradeEffect::ClickMultiplier(_) => current,
    }
}

/// Per-building contribution list, restricted to buildings with at least
/// one unit. Sums to [`total_rate`].
pub fn breakdown(defs: &Definitions, state: &GameState) -> Vec<(BuildingId, f64)> {
    defs.buildings
        .iter()
        .enumerate()
        .filter(|(id, _)| state.owned(*id) > 0)
        .map(|(id, _)| (id, building_cps(defs, state, id)))
        .collect()
}
