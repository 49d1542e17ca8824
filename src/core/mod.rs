mod engine;
mod error;
mod goals;
mod inputs;
mod probability;
mod solver;
mod types;

pub use engine::{
    compute_retirement_target, run_advanced_fire, run_basic_fire, run_projection,
    simulate_trajectory,
};
pub use error::{ProjectionError, Result};
pub use goals::assess_goal;
pub use inputs::update_income_or_expenses;
pub use probability::estimate_success_probability;
pub use solver::{required_monthly_contribution, solve_goal_funding};
pub use types::{
    FireResult, GoalFundingRequest, GoalProgress, GoalStatus, IncomeField, Phase,
    ProjectionInput, ProjectionReport, RetirementTarget, TrajectoryPoint,
};
