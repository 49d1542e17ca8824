use super::error::{ProjectionError, Result, ensure_finite, ensure_non_negative};
use super::types::{IncomeField, ProjectionInput};

/// Oldest age any input may name.
pub(crate) const MAX_AGE: u32 = 150;

impl ProjectionInput {
    pub fn validate(&self) -> Result<()> {
        if self.retirement_age <= self.current_age {
            return Err(ProjectionError::horizon(format!(
                "retirement age ({}) must be after current age ({})",
                self.retirement_age, self.current_age
            )));
        }
        if self.life_expectancy <= self.retirement_age {
            return Err(ProjectionError::horizon(format!(
                "life expectancy ({}) must be after retirement age ({})",
                self.life_expectancy, self.retirement_age
            )));
        }
        self.validate_amounts_and_rates()
    }

    /// Age bounds plus money and rate checks shared by every calculator; age ordering is left
    /// to the caller because the trajectory tolerates a short life expectancy.
    pub(crate) fn validate_amounts_and_rates(&self) -> Result<()> {
        for (name, age) in [
            ("current_age", self.current_age),
            ("retirement_age", self.retirement_age),
            ("life_expectancy", self.life_expectancy),
        ] {
            if age > MAX_AGE {
                return Err(ProjectionError::horizon(format!(
                    "{name} must be at most {MAX_AGE}, got {age}"
                )));
            }
        }

        ensure_non_negative(self.current_savings, "current_savings")?;
        ensure_non_negative(self.annual_income, "annual_income")?;
        ensure_non_negative(self.annual_expenses, "annual_expenses")?;

        for (name, rate) in [
            ("pre_retirement_return_percent", self.pre_retirement_return_percent),
            ("post_retirement_return_percent", self.post_retirement_return_percent),
            ("inflation_rate_percent", self.inflation_rate_percent),
        ] {
            if !rate.is_finite() {
                return Err(ProjectionError::rate(format!(
                    "{name} must be finite, got {rate}"
                )));
            }
        }

        if !(0.0..=100.0).contains(&self.savings_rate_percent) {
            return Err(ProjectionError::rate(format!(
                "savings rate must be between 0 and 100, got {}",
                self.savings_rate_percent
            )));
        }
        if !self.withdrawal_rate_percent.is_finite() || self.withdrawal_rate_percent <= 0.0 {
            return Err(ProjectionError::rate(format!(
                "withdrawal rate must be > 0, got {}",
                self.withdrawal_rate_percent
            )));
        }
        Ok(())
    }

    pub fn years_to_retirement(&self) -> i64 {
        i64::from(self.retirement_age) - i64::from(self.current_age)
    }

    pub fn retirement_duration_years(&self) -> i64 {
        i64::from(self.life_expectancy) - i64::from(self.retirement_age)
    }
}

/// Applies one edit to the income/expenses/savings-rate triangle and derives
/// the dependent field, so the two never disagree.
pub fn update_income_or_expenses(
    input: &ProjectionInput,
    field: IncomeField,
    value: f64,
) -> Result<ProjectionInput> {
    let value = ensure_finite(value, "value")?;
    let mut next = input.clone();

    match field {
        IncomeField::AnnualIncome | IncomeField::AnnualExpenses => {
            let value = ensure_non_negative(value, "value")?;
            if field == IncomeField::AnnualIncome {
                next.annual_income = value;
            } else {
                next.annual_expenses = value;
            }
            next.savings_rate_percent =
                savings_rate_from(next.annual_income, next.annual_expenses);
        }
        IncomeField::SavingsRate => {
            if !(0.0..=100.0).contains(&value) {
                return Err(ProjectionError::rate(format!(
                    "savings rate must be between 0 and 100, got {value}"
                )));
            }
            next.savings_rate_percent = value;
            next.annual_expenses = next.annual_income * (1.0 - value / 100.0);
        }
    }

    Ok(next)
}

fn savings_rate_from(annual_income: f64, annual_expenses: f64) -> f64 {
    if annual_income <= 0.0 {
        return 0.0;
    }
    ((annual_income - annual_expenses) / annual_income * 100.0).clamp(0.0, 100.0)
}
