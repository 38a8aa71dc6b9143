//! Save-data layout: a flat, versioned serialization of the game state.
//!
//! Transient fields (the event log, the cached production rate) are not
//! stored. The rate is recomputed on load, so a restored state continues a
//! run with results identical to an uninterrupted one.
//!
//! Versioning: `SAVE_VERSION` is the current format and grows on field
//! additions; `MIN_COMPATIBLE_VERSION` grows only on breaking changes.
//! Saves at or above the minimum load with missing fields defaulted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cps;
use crate::defs::Definitions;
use crate::state::{Buff, GameState};

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Oldest version still loadable.
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// Envelope around the serialized state.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub game: GameSave,
}

/// Flat serialized form of [`GameState`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSave {
    pub resource: f64,
    pub resource_earned_total: f64,
    pub resource_at_last_reset: f64,
    pub click_power: f64,
    /// Owned count per building, definitions order.
    pub buildings: Vec<u32>,
    /// Owned upgrade ids, ascending.
    pub upgrades_owned: Vec<usize>,
    pub prestige_level: u32,
    pub elapsed_time: f64,
    pub total_clicks: u64,
    /// Active buffs as (name, multiplier, remaining seconds).
    pub buffs: Vec<(String, f64, f64)>,
}

/// Why a save could not be loaded.
#[derive(Debug)]
pub enum LoadError {
    Parse(serde_json::Error),
    /// Saved with a format older than [`MIN_COMPATIBLE_VERSION`].
    IncompatibleVersion(u32),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Parse(e) => write!(f, "could not parse save data: {e}"),
            LoadError::IncompatibleVersion(v) => write!(
                f,
                "save version {v} is older than the minimum compatible version {MIN_COMPATIBLE_VERSION}"
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Parse(e) => Some(e),
            LoadError::IncompatibleVersion(_) => None,
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e)
    }
}

/// Extract the persistable fields from a state.
pub fn extract_save(state: &GameState) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        game: GameSave {
            resource: state.resource,
            resource_earned_total: state.resource_earned_total,
            resource_at_last_reset: state.resource_at_last_reset,
            click_power: state.click_power,
            buildings: state.buildings.clone(),
            upgrades_owned: state.upgrades_owned.iter().copied().collect(),
            prestige_level: state.prestige_level,
            elapsed_time: state.elapsed_time,
            total_clicks: state.total_clicks,
            buffs: state
                .buffs
                .iter()
                .map(|b| (b.name.clone(), b.multiplier, b.remaining))
                .collect(),
        },
    }
}

/// Restore a save into a fresh state for `defs`. Entries beyond the
/// current definition tables are dropped rather than rejected.
pub fn apply_save(defs: &Definitions, save: &GameSave) -> GameState {
    let mut state = GameState::new(defs);
    state.resource = save.resource;
    state.resource_earned_total = save.resource_earned_total;
    state.resource_at_last_reset = save.resource_at_last_reset;
    state.click_power = save.click_power;
    for (i, &count) in save.buildings.iter().enumerate() {
        if let Some(slot) = state.buildings.get_mut(i) {
            *slot = count;
        }
    }
    state.upgrades_owned = save
        .upgrades_owned
        .iter()
        .copied()
        .filter(|&id| id < defs.upgrades.len())
        .collect();
    state.prestige_level = save.prestige_level;
    state.elapsed_time = save.elapsed_time;
    state.total_clicks = save.total_clicks;
    state.buffs = save
        .buffs
        .iter()
        .map(|(name, multiplier, remaining)| Buff {
            name: name.clone(),
            multiplier: *multiplier,
            remaining: *remaining,
        })
        .collect();
    state.production_rate = cps::total_rate(defs, &state);
    state
}

/// Serialize a state to the JSON save format.
pub fn to_json(state: &GameState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&extract_save(state))
}

/// Restore a state from the JSON save format.
pub fn from_json(defs: &Definitions, json: &str) -> Result<GameState, LoadError> {
    let save: SaveData = serde_json::from_str(json)?;
    if save.version < MIN_COMPATIBLE_VERSION {
        return Err(LoadError::IncompatibleVersion(save.version));
    }
    Ok(apply_save(defs, &save.game))
}
