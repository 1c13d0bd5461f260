//! Day-transition kernel shared by the optimizer and the simulator.
//!
//! A lived day is described by whether the agent moved, whether it mined, and
//! how much water and food it bought. The kernel applies the activity
//! consumption multipliers, rejects transitions that would leave a resource
//! negative or exceed the carry-weight limit, and settles the cash delta.
//! Rejection is normal pruning, not an error.

use crate::scenario::ScenarioParams;

/// Consumption multiplier while mining.
pub const MINING_CONSUMPTION_MULT: u32 = 3;
/// Consumption multiplier while moving between regions.
pub const TRAVEL_CONSUMPTION_MULT: u32 = 2;
/// Consumption multiplier while resting in place.
pub const REST_CONSUMPTION_MULT: u32 = 1;

/// Multiplier applied to the day's base consumption rates.
///
/// A stationary non-mining day consumes less than a moving day; mining costs
/// the most regardless of movement.
#[must_use]
pub const fn consumption_multiplier(mining: bool, moved: bool) -> u32 {
    if mining {
        MINING_CONSUMPTION_MULT
    } else if moved {
        TRAVEL_CONSUMPTION_MULT
    } else {
        REST_CONSUMPTION_MULT
    }
}

/// Whether a mining action is available while spending the day in `region`.
///
/// Mining is open on every lived day of the window, including the first, so
/// availability reduces to the region flag.
#[must_use]
pub fn mining_permitted(params: &ScenarioParams, region: usize) -> bool {
    params.mine_region[region]
}

/// Successor resources and cash produced by one feasible day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayOutcome {
    pub water: u32,
    pub food: u32,
    pub cash: f64,
}

/// Apply one day of activity to `(water, food, cash)`.
///
/// `day_index` is the zero-based index into the per-day consumption tables.
/// Returns `None` when the resulting water or food would go negative or the
/// post-purchase load would exceed the carry-weight limit; such transitions
/// produce no successor state.
#[must_use]
pub fn step_day(
    params: &ScenarioParams,
    day_index: usize,
    water: u32,
    food: u32,
    cash: f64,
    moved: bool,
    mining: bool,
    buy_water: u32,
    buy_food: u32,
) -> Option<DayOutcome> {
    let mult = i64::from(consumption_multiplier(mining, moved));
    let water_after =
        i64::from(water) - mult * i64::from(params.base_water_use[day_index]) + i64::from(buy_water);
    let food_after =
        i64::from(food) - mult * i64::from(params.base_food_use[day_index]) + i64::from(buy_food);
    if water_after < 0 || food_after < 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let load = water_after as f64 * params.water_unit_weight
        + food_after as f64 * params.food_unit_weight;
    if load > params.carry_weight_limit {
        return None;
    }

    let income = if mining { params.mining_yield } else { 0.0 };
    let purchase_cost = f64::from(buy_water) * params.water_unit_price
        + f64::from(buy_food) * params.food_unit_price;

    Some(DayOutcome {
        water: u32::try_from(water_after).ok()?,
        food: u32::try_from(food_after).ok()?,
        cash: cash + income - purchase_cost,
    })
}
