use tracing::debug;

use super::error::{ProjectionError, Result, ensure_non_negative};
use super::probability::estimate_success_probability;
use super::solver::required_monthly_contribution;
use super::types::{
    FireResult, Phase, ProjectionInput, ProjectionReport, RetirementTarget, TrajectoryPoint,
};

/// Minimum number of simulated years after the starting year, regardless of
/// life expectancy.
const MIN_PROJECTION_YEARS: u32 = 50;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Inflates today's spending to the retirement date and sizes the pot that
/// sustains it at the given withdrawal rate.
pub fn compute_retirement_target(
    annual_expenses: f64,
    inflation_rate_percent: f64,
    years_to_retirement: i64,
    withdrawal_rate_percent: f64,
) -> Result<RetirementTarget> {
    if !withdrawal_rate_percent.is_finite() || withdrawal_rate_percent <= 0.0 {
        return Err(ProjectionError::rate(format!(
            "withdrawal rate must be > 0, got {withdrawal_rate_percent}"
        )));
    }
    if !inflation_rate_percent.is_finite() || inflation_rate_percent < 0.0 {
        return Err(ProjectionError::rate(format!(
            "inflation rate must be >= 0, got {inflation_rate_percent}"
        )));
    }
    if years_to_retirement < 0 {
        return Err(ProjectionError::horizon(format!(
            "retirement age must not be before current age ({years_to_retirement} years)"
        )));
    }
    let annual_expenses = ensure_non_negative(annual_expenses, "annual_expenses")?;

    let inflation = 1.0 + inflation_rate_percent / 100.0;
    let expenses_at_retirement = annual_expenses * inflation.powf(years_to_retirement as f64);
    let savings_goal = expenses_at_retirement * (100.0 / withdrawal_rate_percent);
    let monthly_income = savings_goal * (withdrawal_rate_percent / 100.0) / MONTHS_PER_YEAR;

    Ok(RetirementTarget {
        expenses_at_retirement,
        savings_goal,
        monthly_income,
    })
}

/// Year-by-year portfolio, expenses and retirement income from the current
/// age to the terminal age, earliest first. Each point holds the values at
/// the end of that year.
pub fn simulate_trajectory(input: &ProjectionInput) -> Result<Vec<TrajectoryPoint>> {
    if input.retirement_age <= input.current_age {
        return Err(ProjectionError::horizon(format!(
            "retirement age ({}) must be after current age ({})",
            input.retirement_age, input.current_age
        )));
    }
    input.validate_amounts_and_rates()?;

    let terminal_age = terminal_age(input);
    let years = terminal_age - input.current_age;

    let pre_growth = 1.0 + input.pre_retirement_return_percent / 100.0;
    let post_growth = 1.0 + input.post_retirement_return_percent / 100.0;
    let inflation = 1.0 + input.inflation_rate_percent / 100.0;
    let withdrawal_fraction = input.withdrawal_rate_percent / 100.0;
    let annual_contribution = input.annual_income * (input.savings_rate_percent / 100.0);

    let mut portfolio = input.current_savings;
    let mut expenses = input.annual_expenses;
    let mut points = Vec::with_capacity(years as usize + 1);

    for year in 0..=years {
        let age = input.current_age + year;
        let (phase, income) = if age < input.retirement_age {
            portfolio = portfolio * pre_growth + annual_contribution;
            (Phase::Accumulation, 0.0)
        } else {
            let income = portfolio * withdrawal_fraction;
            portfolio = (portfolio - income) * post_growth;
            (Phase::Decumulation, income)
        };

        if year > 0 {
            expenses *= inflation;
        }

        points.push(TrajectoryPoint {
            age,
            year: input.current_year_index.saturating_add_unsigned(year),
            portfolio_value: portfolio,
            annual_expenses: expenses,
            retirement_income: income,
            phase,
        });
    }

    debug!(
        current_age = input.current_age,
        terminal_age,
        points = points.len(),
        "simulated trajectory"
    );
    Ok(points)
}

/// Ages are capped by validation, so the sum cannot overflow.
fn terminal_age(input: &ProjectionInput) -> u32 {
    let years = input
        .life_expectancy
        .saturating_sub(input.current_age)
        .max(MIN_PROJECTION_YEARS);
    input.current_age + years
}

/// Results panel for the single-return calculator: no success score.
pub fn run_basic_fire(input: &ProjectionInput) -> Result<FireResult> {
    summarize(input)
}

/// Results panel including the heuristic success score for the
/// post-retirement period.
pub fn run_advanced_fire(input: &ProjectionInput) -> Result<FireResult> {
    let mut result = summarize(input)?;
    let probability = estimate_success_probability(
        input.withdrawal_rate_percent,
        input.post_retirement_return_percent,
        input.inflation_rate_percent,
        input.retirement_duration_years(),
    )?;
    result.success_probability_percent = Some(probability);
    Ok(result)
}

pub fn run_projection(input: &ProjectionInput) -> Result<ProjectionReport> {
    let result = run_advanced_fire(input)?;
    let trajectory = simulate_trajectory(input)?;
    Ok(ProjectionReport { result, trajectory })
}

fn summarize(input: &ProjectionInput) -> Result<FireResult> {
    input.validate()?;

    let years_to_retirement = input.retirement_age - input.current_age;
    let target = compute_retirement_target(
        input.annual_expenses,
        input.inflation_rate_percent,
        i64::from(years_to_retirement),
        input.withdrawal_rate_percent,
    )?;
    let monthly_contribution = required_monthly_contribution(
        input.current_savings,
        target.savings_goal,
        years_to_retirement,
        input.pre_retirement_return_percent,
    )?;

    debug!(
        years_to_retirement,
        savings_goal = target.savings_goal,
        monthly_contribution,
        "computed FIRE summary"
    );
    Ok(FireResult {
        years_to_retirement,
        retirement_savings_goal: target.savings_goal,
        required_periodic_contribution: monthly_contribution,
        retirement_income_per_period: target.monthly_income,
        success_probability_percent: None,
    })
}
