//! Engine B: fixed-policy trajectory replay for diagnostic display.
//!
//! The simulator evaluates one deterministic, deliberately non-optimal policy
//! day by day against the same feasibility rules the optimizer uses. It
//! produces an append-only log of daily state snapshots; the log is what an
//! external renderer consumes to plot supply and cash series or overlay the
//! traversed path on a map.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

use crate::scenario::{ScenarioError, ScenarioParams};
use crate::transition::{MINING_CONSUMPTION_MULT, REST_CONSUMPTION_MULT, mining_permitted};

/// Extra consumption multiplier charged at mining time, on top of the
/// unconditional baseline deducted at the end of every day.
const MINING_EXTRA_MULT: i64 = (MINING_CONSUMPTION_MULT - REST_CONSUMPTION_MULT) as i64;

/// Actions taken during a recorded day; stored inline on the record.
pub type ActionSet = SmallVec<[DayAction; 4]>;

/// What the fixed policy did on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayAction {
    Purchase,
    Mine,
    Move,
    Stay,
}

/// Snapshot of the agent at the start of a day, before that day's actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStateRecord {
    /// One-based calendar day.
    pub day: usize,
    pub position: usize,
    pub water: i64,
    pub food: i64,
    pub money: f64,
    /// Filled in once the day's actions have resolved.
    #[serde(default)]
    pub actions: ActionSet,
}

/// The resource that went negative on a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Water,
    Food,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Water => f.write_str("water"),
            Self::Food => f.write_str("food"),
        }
    }
}

/// Fatal, non-recoverable outcome for a single run: a resource went negative.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("{resource} ran out on day {day}")]
pub struct ResourceExhaustion {
    pub day: usize,
    pub resource: ResourceKind,
}

/// Terminal outcome of one simulated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Finished at a designated end region; salvage was credited.
    ReachedEnd { salvage_credit: f64, final_cash: f64 },
    /// Finished away from every end region; leftovers went unrecovered.
    StoppedShort {
        leftover_value: f64,
        final_cash: f64,
    },
    /// A resource went negative mid-run; the log stops at that day.
    Exhausted(ResourceExhaustion),
}

/// Log plus outcome for one simulated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub records: Vec<DailyStateRecord>,
    pub outcome: RunOutcome,
}

/// Replays the fixed diagnostic policy against one scenario.
#[derive(Debug, Clone)]
pub struct TrajectorySimulator<'a> {
    params: &'a ScenarioParams,
}

impl<'a> TrajectorySimulator<'a> {
    /// Build a simulator over validated parameters.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError` when the parameter bundle is malformed.
    pub fn new(params: &'a ScenarioParams) -> Result<Self, ScenarioError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Run the fixed policy once, producing one record per day plus a final
    /// wrap-up record on success (`day_count + 1` records in total).
    #[must_use]
    pub fn run(&self) -> RunReport {
        let params = self.params;
        let mut position = params.start_region;
        let mut water: i64 = 0;
        let mut food: i64 = 0;
        let mut money = params.starting_cash;
        let mut records = Vec::with_capacity(params.day_count + 1);

        // Stock up once at the start region before the first day, when the
        // start region sells supplies at all.
        let mut opening_purchase = false;
        if params.village_region[position] {
            let (buy_water, buy_food) = self.max_purchase(water, food, money);
            if buy_water > 0 || buy_food > 0 {
                water += i64::from(buy_water);
                food += i64::from(buy_food);
                money -= f64::from(buy_water) * params.water_unit_price
                    + f64::from(buy_food) * params.food_unit_price;
                opening_purchase = true;
            }
        }

        for day_index in 0..params.day_count {
            let day = day_index + 1;
            records.push(DailyStateRecord {
                day,
                position,
                water,
                food,
                money,
                actions: ActionSet::new(),
            });
            let mut actions = ActionSet::new();
            if opening_purchase && day_index == 0 {
                actions.push(DayAction::Purchase);
            }

            // Restock at villages along the way; the start region only sells
            // during the opening purchase.
            if params.village_region[position] && position != params.start_region {
                let (buy_water, buy_food) = self.max_purchase(water, food, money);
                if buy_water > 0 || buy_food > 0 {
                    water += i64::from(buy_water);
                    food += i64::from(buy_food);
                    money -= f64::from(buy_water) * params.water_unit_price
                        + f64::from(buy_food) * params.food_unit_price;
                    actions.push(DayAction::Purchase);
                }
            }

            if mining_permitted(params, position) {
                money += params.mining_yield;
                water -= MINING_EXTRA_MULT * i64::from(params.base_water_use[day_index]);
                food -= MINING_EXTRA_MULT * i64::from(params.base_food_use[day_index]);
                actions.push(DayAction::Mine);
            }

            if params.mandatory_stay[day_index] {
                actions.push(DayAction::Stay);
            } else if let Some(destination) =
                (0..params.region_count).find(|&d| params.is_adjacent(position, d))
            {
                if destination == position {
                    actions.push(DayAction::Stay);
                } else {
                    debug!("day {day}: moving from region {position} to {destination}");
                    position = destination;
                    actions.push(DayAction::Move);
                }
            }

            // Baseline consumption applies unconditionally.
            water -= i64::from(params.base_water_use[day_index]);
            food -= i64::from(params.base_food_use[day_index]);

            if let Some(record) = records.last_mut() {
                record.actions = actions;
            }

            if water < 0 || food < 0 {
                let resource = if water < 0 {
                    ResourceKind::Water
                } else {
                    ResourceKind::Food
                };
                let exhaustion = ResourceExhaustion { day, resource };
                warn!("run failed: {exhaustion}");
                return RunReport {
                    records,
                    outcome: RunOutcome::Exhausted(exhaustion),
                };
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let salvage = params.salvage_value(water as f64, food as f64);
        let at_end = params.end_region[position];
        let outcome = if at_end {
            money += salvage;
            RunOutcome::ReachedEnd {
                salvage_credit: salvage,
                final_cash: money,
            }
        } else {
            RunOutcome::StoppedShort {
                leftover_value: salvage,
                final_cash: money,
            }
        };
        records.push(DailyStateRecord {
            day: params.day_count + 1,
            position,
            water,
            food,
            money,
            actions: ActionSet::new(),
        });
        RunReport { records, outcome }
    }

    /// Largest purchasable pair under the transaction cap, the remaining
    /// carry capacity, and the cash on hand. Water is priced out first.
    fn max_purchase(&self, water: i64, food: i64, money: f64) -> (u32, u32) {
        let params = self.params;
        #[allow(clippy::cast_precision_loss)]
        let mut free_weight = params.carry_weight_limit
            - water as f64 * params.water_unit_weight
            - food as f64 * params.food_unit_weight;
        let mut cash = money;

        let buy_water = affordable_units(
            params.daily_purchase_limit,
            params.water_unit_weight,
            params.water_unit_price,
            free_weight,
            cash,
        );
        free_weight -= f64::from(buy_water) * params.water_unit_weight;
        cash -= f64::from(buy_water) * params.water_unit_price;

        let buy_food = affordable_units(
            params.daily_purchase_limit,
            params.food_unit_weight,
            params.food_unit_price,
            free_weight,
            cash,
        );
        (buy_water, buy_food)
    }
}

/// Units purchasable given a per-transaction cap, free carry weight, and cash.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn affordable_units(cap: u32, unit_weight: f64, unit_price: f64, free_weight: f64, cash: f64) -> u32 {
    if free_weight <= 0.0 || cash <= 0.0 {
        return 0;
    }
    let by_weight = (free_weight / unit_weight).floor();
    let by_cash = (cash / unit_price).floor();
    let units = by_weight.min(by_cash).min(f64::from(cap));
    if units <= 0.0 { 0 } else { units as u32 }
}
