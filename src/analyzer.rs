//! Derived progression queries: goal timing and ascension advice.

use crate::defs::{prestige_level_for, Definitions};
use crate::simulator::{SimConfig, Simulator};
use crate::state::GameState;

/// Upper bound for goal searches: one simulated year.
pub const GOAL_SEARCH_CEILING: f64 = 365.0 * 24.0 * 3_600.0;

/// Ascension recommendation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AscensionEval {
    pub should_reset: bool,
    pub prestige_gain: u32,
}

/// Seconds until `goal` resource is held. Returns 0 when the goal is
/// already met and infinity when it stays out of reach within one
/// simulated year. The caller's state is never mutated: every probe
/// re-simulates a deep copy.
pub fn time_to_goal(defs: &Definitions, state: &GameState, config: &SimConfig, goal: f64) -> f64 {
    time_to_goal_within(defs, state, config, goal, GOAL_SEARCH_CEILING)
}

/// [`time_to_goal`] with an explicit search ceiling. Binary search over
/// the duration, narrowing until the interval is at most one second, and
/// returning the upper bound.
pub fn time_to_goal_within(
    defs: &Definitions,
    state: &GameState,
    config: &SimConfig,
    goal: f64,
    ceiling: f64,
) -> f64 {
    if state.resource >= goal {
        return 0.0;
    }

    let reaches = |duration: f64| -> bool {
        let mut probe = match Simulator::with_state(defs, *config, state.clone()) {
            Ok(sim) => sim,
            Err(_) => return false,
        };
        probe.run_for(duration, config.dt);
        probe.state.resource >= goal
    };

    if !reaches(ceiling) {
        return f64::INFINITY;
    }

    let (mut lo, mut hi) = (0.0, ceiling);
    while hi - lo > 1.0 {
        let mid = (lo + hi) / 2.0;
        if reaches(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

/// Whether resetting now is worth it: the level recomputed from this run's
/// earnings must beat the current level by at least one whole level.
pub fn evaluate_ascension(state: &GameState) -> AscensionEval {
    let candidate = prestige_level_for(state.earned_since_reset());
    let prestige_gain = candidate.saturating_sub(state.prestige_level);
    AscensionEval {
        should_reset: prestige_gain >= 1,
        prestige_gain,
    }
}
