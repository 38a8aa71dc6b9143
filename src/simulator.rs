//! The fixed-timestep simulation loop.
//!
//! Each tick runs three phases in strict order: produce, purchase (when
//! auto-buy is on), advance the clock. Purchasing may spend resource
//! accrued earlier in the same tick.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cps;
use crate::defs::{Definitions, DefsError};
use crate::logic;
use crate::optimizer::{self, PurchaseKind, PurchaseOption};
use crate::state::GameState;

/// Simulation parameters supplied by the host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Tick size in simulated seconds.
    pub dt: f64,
    /// Total duration simulated by [`Simulator::run`].
    pub duration: f64,
    /// Resource granted at the start of a fresh run.
    pub initial_resource: f64,
    /// Apply the greedy purchase policy every tick.
    pub auto_buy: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            duration: 3_600.0,
            initial_resource: 0.0,
            auto_buy: true,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(ConfigError::BadTickSize(self.dt));
        }
        if !(self.duration >= 0.0 && self.duration.is_finite()) {
            return Err(ConfigError::BadDuration(self.duration));
        }
        Ok(())
    }
}

/// A configuration the simulation cannot run with.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    BadTickSize(f64),
    BadDuration(f64),
    Defs(DefsError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BadTickSize(dt) => {
                write!(f, "tick size must be a positive finite number, got {dt}")
            }
            ConfigError::BadDuration(d) => {
                write!(f, "duration must be a non-negative finite number, got {d}")
            }
            ConfigError::Defs(e) => write!(f, "invalid definitions: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Defs(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DefsError> for ConfigError {
    fn from(e: DefsError) -> Self {
        ConfigError::Defs(e)
    }
}

/// Counters accumulated across a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimStats {
    pub ticks: u64,
    pub resource_produced: f64,
    pub buildings_bought: u64,
    pub upgrades_bought: u64,
}

/// Owns one [`GameState`] and advances it tick by tick.
pub struct Simulator<'d> {
    defs: &'d Definitions,
    pub config: SimConfig,
    pub state: GameState,
    pub stats: SimStats,
}

impl<'d> Simulator<'d> {
    /// Fresh simulation. Validates the configuration and the definitions
    /// table up front; strictly positive prices are what keep the auto-buy
    /// inner loop finite.
    pub fn new(defs: &'d Definitions, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        defs.validate()?;
        let mut state = GameState::new(defs);
        state.resource = config.initial_resource;
        state.resource_earned_total = config.initial_resource;
        Ok(Self {
            defs,
            config,
            state,
            stats: SimStats::default(),
        })
    }

    /// Resume from an existing state, e.g. one restored from a save.
    pub fn with_state(
        defs: &'d Definitions,
        config: SimConfig,
        state: GameState,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        defs.validate()?;
        Ok(Self {
            defs,
            config,
            state,
            stats: SimStats::default(),
        })
    }

    pub fn defs(&self) -> &'d Definitions {
        self.defs
    }

    /// One tick of `dt` simulated seconds: produce, then purchase, then
    /// advance the clock. Non-positive deltas are ignored.
    pub fn advance(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }

        // Phase 1: produce.
        self.state.production_rate = cps::total_rate(self.defs, &self.state);
        let produced = self.state.production_rate * dt;
        self.state.resource += produced;
        self.state.resource_earned_total += produced;
        self.stats.resource_produced += produced;
        self.tick_buffs(dt);

        // Phase 2: purchase.
        if self.config.auto_buy {
            self.auto_buy();
        }

        // Phase 3: advance the clock.
        self.state.elapsed_time += dt;
        self.stats.ticks += 1;
    }

    fn tick_buffs(&mut self, dt: f64) {
        for buff in &mut self.state.buffs {
            buff.remaining -= dt;
        }
        let expired: Vec<String> = self
            .state
            .buffs
            .iter()
            .filter(|b| b.remaining <= 0.0)
            .map(|b| b.name.clone())
            .collect();
        self.state.buffs.retain(|b| b.remaining > 0.0);
        for name in expired {
            let text = format!("{} expired", name);
            self.state.add_log(&text, false);
        }
    }

    /// Apply the greedy policy until nothing affordable remains. Every
    /// purchase spends a validated-positive price while prices only grow,
    /// so the loop runs at most `resource / cheapest_price + 1` times.
    fn auto_buy(&mut self) {
        while let Some(option) = optimizer::best_option(self.defs, &self.state, self.state.resource)
        {
            let bought = match option.kind {
                PurchaseKind::Building(id) => {
                    logic::buy_building(self.defs, &mut self.state, id).is_ok()
                }
                PurchaseKind::Upgrade(id) => {
                    logic::buy_upgrade(self.defs, &mut self.state, id).is_ok()
                }
            };
            if !bought {
                break;
            }
            match option.kind {
                PurchaseKind::Building(_) => self.stats.buildings_bought += 1,
                PurchaseKind::Upgrade(_) => self.stats.upgrades_bought += 1,
            }
        }
    }

    /// Simulate `duration` seconds in fixed `dt` steps. Remainder time
    /// below one `dt` is dropped, not simulated.
    pub fn run_for(&mut self, duration: f64, dt: f64) {
        if !(dt > 0.0 && duration > 0.0) {
            return;
        }
        let steps = (duration / dt).floor() as u64;
        for _ in 0..steps {
            self.advance(dt);
        }
    }

    /// Run the configured duration at the configured tick size.
    pub fn run(&mut self) {
        let SimConfig { duration, dt, .. } = self.config;
        self.run_for(duration, dt);
    }

    /// Top-`n` purchase recommendations for display, ranked by efficiency
    /// with no budget cap (unlock rules still apply).
    pub fn recommendations(&self, n: usize) -> Vec<PurchaseOption> {
        optimizer::ranked_options(self.defs, &self.state, f64::INFINITY, n)
    }

    /// Per-building CPS contributions.
    pub fn breakdown(&self) -> Vec<(usize, f64)> {
        cps::breakdown(self.defs, &self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::BuildingDef;

    fn quiet_config() -> SimConfig {
        SimConfig {
            dt: 1.0,
            duration: 60.0,
            initial_resource: 0.0,
            auto_buy: false,
        }
    }

    #[test]
    fn rejects_bad_tick_size() {
        let defs = Definitions::standard();
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = SimConfig {
                dt,
                ..SimConfig::default()
            };
            assert!(matches!(
                Simulator::new(&defs, config),
                Err(ConfigError::BadTickSize(_))
            ));
        }
    }

    #[test]
    fn rejects_invalid_definitions() {
        let defs = Definitions {
            buildings: vec![BuildingDef::new("Free", 0.0, 1.0)],
            upgrades: Vec::new(),
        };
        assert!(matches!(
            Simulator::new(&defs, SimConfig::default()),
            Err(ConfigError::Defs(DefsError::NonPositiveBuildingPrice(0)))
        ));
    }

    #[test]
    fn initial_resource_seeds_both_counters() {
        let defs = Definitions::standard();
        let config = SimConfig {
            initial_resource: 5_000.0,
            ..quiet_config()
        };
        let sim = Simulator::new(&defs, config).unwrap();
        assert!((sim.state.resource - 5_000.0).abs() < 0.001);
        assert!((sim.state.resource_earned_total - 5_000.0).abs() < 0.001);
    }

    #[test]
    fn produce_accrues_rate_times_dt() {
        let defs = Definitions::standard();
        let mut sim = Simulator::new(&defs, quiet_config()).unwrap();
        sim.state.buildings[1] = 10; // 10/s
        sim.advance(1.0);
        assert!((sim.state.resource - 10.0).abs() < 0.001);
        assert!((sim.state.production_rate - 10.0).abs() < 0.001);
        sim.advance(0.5);
        assert!((sim.state.resource - 15.0).abs() < 0.001);
    }

    #[test]
    fn clock_advances_by_sum_of_deltas() {
        let defs = Definitions::standard();
        let mut sim = Simulator::new(&defs, quiet_config()).unwrap();
        sim.advance(1.0);
        sim.advance(2.5);
        sim.advance(0.25);
        assert!((sim.state.elapsed_time - 3.75).abs() < 1e-9);
        assert_eq!(sim.stats.ticks, 3);
    }

    #[test]
    fn non_positive_delta_is_ignored() {
        let defs = Definitions::standard();
        let mut sim = Simulator::new(&defs, quiet_config()).unwrap();
        sim.state.buildings[1] = 10;
        sim.advance(0.0);
        sim.advance(-5.0);
        assert!((sim.state.resource - 0.0).abs() < f64::EPSILON);
        assert_eq!(sim.stats.ticks, 0);
    }

    #[test]
    fn same_tick_income_funds_same_tick_purchase() {
        let defs = Definitions::standard();
        let config = SimConfig {
            auto_buy: true,
            ..quiet_config()
        };
        let mut sim = Simulator::new(&defs, config).unwrap();
        sim.state.resource = 14.5; // just short of a Cursor
        sim.state.buildings[1] = 1; // 1/s closes the gap within the tick
        sim.advance(1.0);
        assert_eq!(sim.state.buildings[0], 1);
        assert!((sim.state.resource - 0.5).abs() < 0.001);
    }

    #[test]
    fn auto_buy_drains_budget_and_terminates() {
        let defs = Definitions::standard();
        let config = SimConfig {
            dt: 1.0,
            duration: 1.0,
            initial_resource: 5_000.0,
            auto_buy: true,
        };
        let mut sim = Simulator::new(&defs, config).unwrap();
        sim.advance(1.0);
        assert!(sim.stats.buildings_bought > 0);
        assert!(sim.state.resource >= 0.0);
        // Nothing affordable remains
        assert!(optimizer::best_option(&defs, &sim.state, sim.state.resource).is_none());
    }

    #[test]
    fn auto_buy_off_never_purchases() {
        let defs = Definitions::standard();
        let config = SimConfig {
            initial_resource: 5_000.0,
            ..quiet_config()
        };
        let mut sim = Simulator::new(&defs, config).unwrap();
        sim.run_for(30.0, 1.0);
        assert_eq!(sim.state.total_buildings(), 0);
        assert_eq!(sim.stats.buildings_bought, 0);
    }

    #[test]
    fn run_for_drops_the_remainder() {
        let defs = Definitions::standard();
        let mut sim = Simulator::new(&defs, quiet_config()).unwrap();
        sim.run_for(10.7, 1.0);
        assert_eq!(sim.stats.ticks, 10);
        assert!((sim.state.elapsed_time - 10.0).abs() < 1e-9);
    }

    #[test]
    fn buffs_expire_during_ticks() {
        let defs = Definitions::standard();
        let mut sim = Simulator::new(&defs, quiet_config()).unwrap();
        sim.state.buildings[1] = 10;
        logic::add_buff(&mut sim.state, "Frenzy", 7.0, 2.0);
        sim.advance(1.0); // buffed: 70
        sim.advance(1.0); // buffed: 70, then the buff runs out
        sim.advance(1.0); // plain: 10
        assert!((sim.state.resource - 150.0).abs() < 0.001);
        assert!(sim.state.buffs.is_empty());
    }

    #[test]
    fn config_parses_from_json() {
        let json = r#"{"dt": 0.5, "duration": 7200.0, "initial_resource": 100.0, "auto_buy": false}"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert!((config.dt - 0.5).abs() < f64::EPSILON);
        assert!(!config.auto_buy);
        assert!(config.validate().is_ok());
    }
}
