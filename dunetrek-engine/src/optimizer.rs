//! Engine A: the day-indexed dynamic program over resource states.
//!
//! Each day owns a table mapping `(water, food)` to the best cash achievable
//! with that inventory; absence from the table means the state is
//! unreachable. Tables are replaced wholesale on every day transition, so a
//! solve owns no state beyond its current/next pair and repeated solves over
//! the same parameters are independent.

use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::scenario::{ScenarioError, ScenarioParams};
use crate::transition::{mining_permitted, step_day};

/// Inventory key of a reachable state; the day is implied by the table.
type ResourceKey = (u32, u32);

/// Result of a completed solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolveReport {
    /// Maximum terminal wealth: cash plus salvage of leftover supplies.
    /// Zero when no terminal state is reachable.
    pub best_wealth: f64,
    /// Number of reachable states at the end of the final day.
    pub terminal_states: usize,
    /// Largest per-day table observed during the solve.
    pub peak_states: usize,
}

impl SolveReport {
    /// True when the scenario admitted no feasible trajectory at all,
    /// distinguishing a degenerate setup from a genuine zero-wealth optimum.
    #[must_use]
    pub const fn is_infeasible(&self) -> bool {
        self.terminal_states == 0
    }
}

/// Raised when an external cancellation check fires between day iterations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("solve cancelled before day {day} of {day_count}")]
pub struct SolveCancelled {
    pub day: usize,
    pub day_count: usize,
}

/// Exhaustive value iteration over the scenario's day-by-day state space.
#[derive(Debug, Clone)]
pub struct DpOptimizer<'a> {
    params: &'a ScenarioParams,
}

impl<'a> DpOptimizer<'a> {
    /// Build an optimizer over validated parameters.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError` when the parameter bundle is malformed; no
    /// iteration happens on a faulty configuration.
    pub fn new(params: &'a ScenarioParams) -> Result<Self, ScenarioError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Compute the maximum achievable terminal wealth.
    #[must_use]
    pub fn solve(&self) -> SolveReport {
        match self.solve_until(|| false) {
            Ok(report) => report,
            Err(SolveCancelled { .. }) => unreachable!("cancellation closure never fires"),
        }
    }

    /// Like [`solve`](Self::solve), but checks `cancelled` once per day so a
    /// caller can bound runtime on large state spaces.
    ///
    /// # Errors
    ///
    /// Returns `SolveCancelled` naming the day the check fired on.
    pub fn solve_until<F>(&self, cancelled: F) -> Result<SolveReport, SolveCancelled>
    where
        F: Fn() -> bool,
    {
        let params = self.params;
        let mut current: HashMap<ResourceKey, f64> = HashMap::new();
        current.insert((0, 0), params.starting_cash);
        let mut peak_states = current.len();

        // The agent's logical position is threaded through the day loop as a
        // single scalar rather than branching the state key over regions.
        let position = params.start_region;

        for day_index in 0..params.day_count {
            if cancelled() {
                return Err(SolveCancelled {
                    day: day_index,
                    day_count: params.day_count,
                });
            }
            let mut next: HashMap<ResourceKey, f64> = HashMap::with_capacity(current.len());
            for (&(water, food), &cash) in &current {
                self.expand_state(day_index, position, water, food, cash, &mut next);
            }
            debug!(
                "day {}: {} reachable states",
                day_index + 1,
                next.len()
            );
            peak_states = peak_states.max(next.len());
            current = next;
        }

        let report = self.settle_salvage(&current, peak_states);
        if report.is_infeasible() {
            warn!(
                "no state reachable after {} days; scenario is infeasible",
                params.day_count
            );
        }
        Ok(report)
    }

    /// Enumerate every feasible successor of one `(water, food)` state.
    fn expand_state(
        &self,
        day_index: usize,
        position: usize,
        water: u32,
        food: u32,
        cash: f64,
        next: &mut HashMap<ResourceKey, f64>,
    ) {
        let params = self.params;
        for destination in 0..params.region_count {
            if !params.is_adjacent(position, destination) {
                continue;
            }
            let moved = !params.mandatory_stay[day_index] && destination != position;
            let mining = mining_permitted(params, destination);
            for buy_water in 0..=params.daily_purchase_limit {
                for buy_food in 0..=params.daily_purchase_limit {
                    let Some(outcome) = step_day(
                        params, day_index, water, food, cash, moved, mining, buy_water, buy_food,
                    ) else {
                        continue;
                    };
                    next.entry((outcome.water, outcome.food))
                        .and_modify(|best| {
                            if outcome.cash > *best {
                                *best = outcome.cash;
                            }
                        })
                        .or_insert(outcome.cash);
                }
            }
        }
    }

    /// Credit salvage value to every terminal state and take the maximum.
    fn settle_salvage(
        &self,
        terminal: &HashMap<ResourceKey, f64>,
        peak_states: usize,
    ) -> SolveReport {
        let mut best_wealth = 0.0_f64;
        let mut seen = false;
        for (&(water, food), &cash) in terminal {
            let total = cash + self.params.salvage_value(f64::from(water), f64::from(food));
            if !seen || total > best_wealth {
                best_wealth = total;
                seen = true;
            }
        }
        SolveReport {
            best_wealth: if seen { best_wealth } else { 0.0 },
            terminal_states: terminal.len(),
            peak_states,
        }
    }
}
