//! Manual game operations: clicking, purchasing, buffs, and ascension.
//!
//! All functions mutate the state in place. A refused purchase reports why
//! and leaves the state untouched.

use std::fmt;

use crate::defs::{prestige_level_for, BuildingId, Definitions, UpgradeEffect, UpgradeId};
use crate::state::{Buff, GameState};

/// Why a purchase was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurchaseError {
    InsufficientResource,
    AlreadyOwned,
    Locked,
    UnknownBuilding,
    UnknownUpgrade,
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            PurchaseError::InsufficientResource => "price exceeds the current resource",
            PurchaseError::AlreadyOwned => "upgrade is already owned",
            PurchaseError::Locked => "upgrade is not unlocked yet",
            PurchaseError::UnknownBuilding => "no such building",
            PurchaseError::UnknownUpgrade => "no such upgrade",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for PurchaseError {}

/// Manual click: adds the current click power.
pub fn click(state: &mut GameState) {
    let power = state.click_power;
    state.resource += power;
    state.resource_earned_total += power;
    state.total_clicks += 1;
}

/// Buy one unit of a building at its current price.
pub fn buy_building(
    defs: &Definitions,
    state: &mut GameState,
    building: BuildingId,
) -> Result<(), PurchaseError> {
    let def = defs
        .building(building)
        .ok_or(PurchaseError::UnknownBuilding)?;
    let price = def.price(state.owned(building));
    if state.resource < price {
        return Err(PurchaseError::InsufficientResource);
    }
    state.resource -= price;
    state.buildings[building] += 1;
    let text = format!(
        "Bought {} for {} ({} owned)",
        def.name,
        format_number(price),
        state.buildings[building]
    );
    state.add_log(&text, false);
    Ok(())
}

/// Buy an upgrade. Ownership is idempotent-guarded: a second purchase of
/// the same upgrade is refused.
pub fn buy_upgrade(
    defs: &Definitions,
    state: &mut GameState,
    upgrade: UpgradeId,
) -> Result<(), PurchaseError> {
    let def = defs.upgrade(upgrade).ok_or(PurchaseError::UnknownUpgrade)?;
    if state.has_upgrade(upgrade) {
        return Err(PurchaseError::AlreadyOwned);
    }
    if !def.unlock.is_met(state) {
        return Err(PurchaseError::Locked);
    }
    if state.resource < def.price {
        return Err(PurchaseError::InsufficientResource);
    }
    state.resource -= def.price;
    state.upgrades_owned.insert(upgrade);
    if let UpgradeEffect::ClickMultiplier(magnitude) = def.effect {
        state.click_power *= 1.0 + magnitude;
    }
    let text = format!("Upgrade: {} for {}", def.name, format_number(def.price));
    state.add_log(&text, true);
    Ok(())
}

/// Start a temporary production buff.
pub fn add_buff(state: &mut GameState, name: &str, multiplier: f64, duration: f64) {
    state.buffs.push(Buff {
        name: name.to_string(),
        multiplier,
        remaining: duration,
    });
    let text = format!("{} x{:.1} for {:.0}s", name, multiplier, duration);
    state.add_log(&text, true);
}

/// Prestige reset. Banks the lifetime total, raises the prestige level by
/// the gain earned this run, and zeroes the run. Returns the gain; refuses
/// with 0 when less than one whole level has been earned.
pub fn ascend(defs: &Definitions, state: &mut GameState) -> u32 {
    let candidate = prestige_level_for(state.earned_since_reset());
    let gain = candidate.saturating_sub(state.prestige_level);
    if gain == 0 {
        state.add_log("Ascension refused: no prestige level to gain", true);
        return 0;
    }

    state.prestige_level += gain;
    state.resource_at_last_reset = state.resource_earned_total;
    state.resource = 0.0;
    state.production_rate = 0.0;
    state.click_power = 1.0;
    state.buildings = vec![0; defs.buildings.len()];
    state.upgrades_owned.clear();
    state.buffs.clear();
    state.total_clicks = 0;

    let text = format!("Ascended to prestige {} (+{})", state.prestige_level, gain);
    state.add_log(&text, true);
    gain
}

/// Format a number with thousands separators (1234567 -> "1,234,567").
pub fn format_number(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    let int_part = n.floor() as u64;
    let frac = n - int_part as f64;

    let digits = int_part.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if frac > 0.05 {
        format!("{}.{}", grouped, (frac * 10.0).round() as u8)
    } else {
        grouped
    }
}
