//! Scenario parameter bundle and construction-time validation.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable bundle of problem constants for one traversal scenario.
///
/// All per-day arrays are sized exactly to `day_count`, all per-region arrays
/// to `region_count`. The bundle is read-only once constructed and may be
/// shared freely across independent solver and simulator runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Number of lived days in the traversal window.
    pub day_count: usize,
    /// Number of regions in the traversal graph.
    pub region_count: usize,
    /// Maximum units of water or food purchasable per transaction.
    pub daily_purchase_limit: u32,
    /// Cash gained per mining action.
    pub mining_yield: f64,
    /// Maximum combined weight of carried water and food.
    pub carry_weight_limit: f64,
    /// Initial cash at the start of the run.
    pub starting_cash: f64,
    pub water_unit_weight: f64,
    pub food_unit_weight: f64,
    pub water_unit_price: f64,
    pub food_unit_price: f64,
    /// Base water consumption per day, before activity multipliers.
    pub base_water_use: Vec<u32>,
    /// Base food consumption per day, before activity multipliers.
    pub base_food_use: Vec<u32>,
    /// Days on which movement is disallowed regardless of policy.
    pub mandatory_stay: Vec<bool>,
    /// Regions where supplies may be purchased.
    pub village_region: Vec<bool>,
    /// Regions where mining is permitted.
    pub mine_region: Vec<bool>,
    /// Designated terminal regions.
    pub end_region: Vec<bool>,
    /// Symmetric reachability matrix; `adjacency[i][i]` must hold.
    pub adjacency: Vec<Vec<bool>>,
    /// Region the agent occupies on day one.
    #[serde(default)]
    pub start_region: usize,
}

/// Configuration faults detected before any optimization or simulation runs.
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("scenario must contain at least one region")]
    NoRegions,
    #[error("{field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("adjacency row {row} has {actual} entries, expected {expected}")]
    AdjacencyRowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("adjacency is asymmetric between regions {a} and {b}")]
    AdjacencyAsymmetric { a: usize, b: usize },
    #[error("adjacency is missing the self-loop for region {region}")]
    MissingSelfLoop { region: usize },
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("start region {start} is out of range for {region_count} regions")]
    StartOutOfRange { start: usize, region_count: usize },
}

impl ScenarioParams {
    /// Validate structural invariants before any engine touches the bundle.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError` describing the first fault found: array-size
    /// mismatches, broken adjacency invariants (asymmetry or a missing
    /// self-loop), or non-positive unit weights and prices.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.region_count == 0 {
            return Err(ScenarioError::NoRegions);
        }
        if self.start_region >= self.region_count {
            return Err(ScenarioError::StartOutOfRange {
                start: self.start_region,
                region_count: self.region_count,
            });
        }
        self.validate_lengths()?;
        self.validate_scalars()?;
        self.validate_adjacency()
    }

    fn validate_lengths(&self) -> Result<(), ScenarioError> {
        for (field, actual) in [
            ("base_water_use", self.base_water_use.len()),
            ("base_food_use", self.base_food_use.len()),
            ("mandatory_stay", self.mandatory_stay.len()),
        ] {
            if actual != self.day_count {
                return Err(ScenarioError::LengthMismatch {
                    field,
                    expected: self.day_count,
                    actual,
                });
            }
        }
        for (field, actual) in [
            ("village_region", self.village_region.len()),
            ("mine_region", self.mine_region.len()),
            ("end_region", self.end_region.len()),
            ("adjacency", self.adjacency.len()),
        ] {
            if actual != self.region_count {
                return Err(ScenarioError::LengthMismatch {
                    field,
                    expected: self.region_count,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn validate_scalars(&self) -> Result<(), ScenarioError> {
        for (field, value) in [
            ("water_unit_weight", self.water_unit_weight),
            ("food_unit_weight", self.food_unit_weight),
            ("water_unit_price", self.water_unit_price),
            ("food_unit_price", self.food_unit_price),
        ] {
            if !(value > 0.0) {
                return Err(ScenarioError::NonPositive { field, value });
            }
        }
        if !(self.carry_weight_limit >= 0.0) {
            return Err(ScenarioError::Negative {
                field: "carry_weight_limit",
                value: self.carry_weight_limit,
            });
        }
        Ok(())
    }

    fn validate_adjacency(&self) -> Result<(), ScenarioError> {
        for (row, entries) in self.adjacency.iter().enumerate() {
            if entries.len() != self.region_count {
                return Err(ScenarioError::AdjacencyRowWidth {
                    row,
                    expected: self.region_count,
                    actual: entries.len(),
                });
            }
        }
        for a in 0..self.region_count {
            if !self.adjacency[a][a] {
                return Err(ScenarioError::MissingSelfLoop { region: a });
            }
            for b in (a + 1)..self.region_count {
                if self.adjacency[a][b] != self.adjacency[b][a] {
                    return Err(ScenarioError::AdjacencyAsymmetric { a, b });
                }
            }
        }
        Ok(())
    }

    /// Whether region `b` is reachable from region `a` in one day.
    #[must_use]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.adjacency[a][b]
    }

    /// Half the resale value of leftover supplies, credited at run end.
    #[must_use]
    pub fn salvage_value(&self, water: f64, food: f64) -> f64 {
        (water * self.water_unit_price + food * self.food_unit_price) / 2.0
    }
}
