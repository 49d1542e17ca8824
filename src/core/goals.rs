use super::error::{ProjectionError, Result, ensure_finite, ensure_non_negative};
use super::solver::solve_goal_funding;
use super::types::{GoalFundingRequest, GoalProgress, GoalStatus};

/// Progress towards a savings goal and, when a deadline is known, the
/// monthly amount still needed to meet it.
pub fn assess_goal(
    current_amount: f64,
    target_amount: f64,
    months_remaining: Option<u32>,
    annual_return_percent: f64,
) -> Result<GoalProgress> {
    let current_amount = ensure_non_negative(current_amount, "current_amount")?;
    let target_amount = ensure_finite(target_amount, "target_amount")?;
    let annual_return_percent = ensure_finite(annual_return_percent, "annual_return_percent")?;
    if target_amount <= 0.0 {
        return Err(ProjectionError::input(format!(
            "target_amount must be > 0, got {target_amount}"
        )));
    }

    let progress_percent = ((current_amount / target_amount) * 100.0).round().min(100.0) as u32;
    let status = if progress_percent >= 100 {
        GoalStatus::Completed
    } else {
        GoalStatus::Active
    };

    let required_monthly_contribution = match (status, months_remaining) {
        (GoalStatus::Completed, _) | (_, None) => None,
        (GoalStatus::Active, Some(0)) => {
            return Err(ProjectionError::horizon(
                "goal deadline has passed while the goal is still active",
            ));
        }
        (GoalStatus::Active, Some(months)) => {
            let payment = solve_goal_funding(&GoalFundingRequest {
                present_value: current_amount,
                future_value: target_amount,
                periods: months,
                periodic_rate: annual_return_percent / 100.0 / 12.0,
            })?;
            Some(payment.max(0.0))
        }
    };

    Ok(GoalProgress {
        progress_percent,
        status,
        remaining_amount: (target_amount - current_amount).max(0.0),
        required_monthly_contribution,
    })
}
