//! Deterministic retirement "success probability" score.
//!
//! This is a heuristic blend of three linear factors, not a Monte Carlo
//! estimate. The weights and clamping are fixed; changing them changes every
//! reported score.

use super::error::{ProjectionError, Result, ensure_finite};

const BASELINE_WITHDRAWAL_PERCENT: f64 = 3.0;
const WITHDRAWAL_PENALTY_PER_POINT: f64 = 10.0;
const REAL_RETURN_BONUS_PER_POINT: f64 = 5.0;
const DURATION_GRACE_YEARS: f64 = 30.0;
const DURATION_PENALTY_PER_YEAR: f64 = 1.0;

/// Returns a score in `[0, 100]`.
pub fn estimate_success_probability(
    withdrawal_rate_percent: f64,
    post_retirement_return_percent: f64,
    inflation_rate_percent: f64,
    retirement_duration_years: i64,
) -> Result<f64> {
    let withdrawal = ensure_finite(withdrawal_rate_percent, "withdrawal_rate_percent")?;
    let post_return = ensure_finite(
        post_retirement_return_percent,
        "post_retirement_return_percent",
    )?;
    let inflation = ensure_finite(inflation_rate_percent, "inflation_rate_percent")?;
    if retirement_duration_years < 0 {
        return Err(ProjectionError::horizon(format!(
            "retirement duration must be >= 0 years, got {retirement_duration_years}"
        )));
    }
    let duration = retirement_duration_years as f64;

    let withdrawal_factor =
        100.0 - (withdrawal - BASELINE_WITHDRAWAL_PERCENT) * WITHDRAWAL_PENALTY_PER_POINT;
    let return_factor = (post_return - inflation) * REAL_RETURN_BONUS_PER_POINT;
    let duration_factor =
        100.0 - ((duration - DURATION_GRACE_YEARS) * DURATION_PENALTY_PER_YEAR).max(0.0);

    let raw = (withdrawal_factor + return_factor + duration_factor) / 3.0;
    Ok(raw.clamp(0.0, 100.0))
}
