//! Dunetrek Planning Engine
//!
//! Platform-agnostic core logic for the Dunetrek desert traversal planner.
//! This crate models a resource-constrained multi-day crossing: an agent
//! moves over a region graph for a fixed number of days, consuming water and
//! food, optionally mining for income or buying supplies, under a
//! carry-weight limit and a starting budget. Two engines share one
//! transition kernel: the dynamic-programming optimizer computes the maximum
//! achievable terminal wealth, and the trajectory simulator replays a fixed
//! diagnostic policy into a day-by-day log. The heave module is the
//! stand-alone physics collaborator used for wave-rig power sweeps.

pub mod heave;
pub mod optimizer;
pub mod presets;
pub mod scenario;
pub mod simulator;
pub mod transition;

// Re-export commonly used types
pub use heave::{DampingLaw, DampingSweep, HeaveError, HeaveRig, HeaveState, SweepOutcome};
pub use optimizer::{DpOptimizer, SolveCancelled, SolveReport};
pub use presets::{preset, preset_names};
pub use scenario::{ScenarioError, ScenarioParams};
pub use simulator::{
    ActionSet, DailyStateRecord, DayAction, ResourceExhaustion, ResourceKind, RunOutcome,
    RunReport, TrajectorySimulator,
};
pub use transition::{DayOutcome, consumption_multiplier, mining_permitted, step_day};
