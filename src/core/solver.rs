use tracing::debug;

use super::error::{ProjectionError, Result, ensure_finite, ensure_non_negative};
use super::types::GoalFundingRequest;

const MONTHS_PER_YEAR: u32 = 12;

/// Constant end-of-period payment that grows `present_value` into
/// `future_value` over `periods` periods (ordinary annuity).
///
/// The result is signed: a negative payment means the present value alone
/// already overshoots the target at this rate.
pub fn solve_goal_funding(request: &GoalFundingRequest) -> Result<f64> {
    let present_value = ensure_non_negative(request.present_value, "present_value")?;
    let future_value = ensure_non_negative(request.future_value, "future_value")?;
    let rate = ensure_finite(request.periodic_rate, "periodic_rate")?;

    if request.periods == 0 {
        return Err(ProjectionError::horizon(
            "periods must be > 0 to solve for a payment",
        ));
    }
    let periods = f64::from(request.periods);

    if rate == 0.0 {
        return Ok((future_value - present_value) / periods);
    }

    let compound = (1.0 + rate).powf(periods);
    let annuity_factor = (compound - 1.0) / rate;
    if annuity_factor == 0.0 || !annuity_factor.is_finite() {
        return Err(ProjectionError::division(format!(
            "annuity factor degenerates at rate {rate} over {} periods",
            request.periods
        )));
    }

    let payment = (future_value - present_value * compound) / annuity_factor;
    debug!(
        periods = request.periods,
        rate, payment, "solved goal funding payment"
    );
    Ok(payment)
}

/// Monthly form used by the FIRE calculators: `years` becomes `years * 12`
/// periods and the annual percentage becomes a monthly fraction.
pub fn required_monthly_contribution(
    current_savings: f64,
    goal: f64,
    years: u32,
    annual_return_percent: f64,
) -> Result<f64> {
    let periods = years.checked_mul(MONTHS_PER_YEAR).ok_or_else(|| {
        ProjectionError::horizon(format!("{years} years overflows the period count"))
    })?;
    solve_goal_funding(&GoalFundingRequest {
        present_value: current_savings,
        future_value: goal,
        periods,
        periodic_rate: annual_return_percent / 100.0 / f64::from(MONTHS_PER_YEAR),
    })
}
