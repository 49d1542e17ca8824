use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Accumulation,
    Decumulation,
}

/// Which side of the income/expenses/savings-rate triangle a caller edited.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncomeField {
    #[serde(alias = "annualIncome", alias = "annual_income")]
    AnnualIncome,
    #[serde(alias = "annualExpenses", alias = "annual_expenses")]
    AnnualExpenses,
    #[serde(alias = "savingsRate", alias = "savings_rate")]
    SavingsRate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
}

/// Rates are percentages (`7.0` is 7%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_savings: f64,
    pub annual_income: f64,
    pub annual_expenses: f64,
    pub savings_rate_percent: f64,
    pub pre_retirement_return_percent: f64,
    pub post_retirement_return_percent: f64,
    pub withdrawal_rate_percent: f64,
    pub inflation_rate_percent: f64,
    /// Calendar year of the first simulated year.
    pub current_year_index: i32,
}

impl Default for ProjectionInput {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 45,
            life_expectancy: 90,
            current_savings: 100_000.0,
            annual_income: 80_000.0,
            annual_expenses: 50_000.0,
            savings_rate_percent: 37.5,
            pre_retirement_return_percent: 7.0,
            post_retirement_return_percent: 5.0,
            withdrawal_rate_percent: 4.0,
            inflation_rate_percent: 2.5,
            current_year_index: 2025,
        }
    }
}

impl ProjectionInput {
    /// Collapses the two return assumptions into one, as the basic
    /// calculator does.
    pub fn with_single_return(mut self, return_percent: f64) -> Self {
        self.pre_retirement_return_percent = return_percent;
        self.post_retirement_return_percent = return_percent;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalFundingRequest {
    pub present_value: f64,
    pub future_value: f64,
    pub periods: u32,
    /// Fractional rate per period, not a percentage.
    pub periodic_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementTarget {
    pub expenses_at_retirement: f64,
    pub savings_goal: f64,
    pub monthly_income: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryPoint {
    pub age: u32,
    pub year: i32,
    pub portfolio_value: f64,
    pub annual_expenses: f64,
    pub retirement_income: f64,
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireResult {
    pub years_to_retirement: u32,
    pub retirement_savings_goal: f64,
    pub required_periodic_contribution: f64,
    pub retirement_income_per_period: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_probability_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionReport {
    pub result: FireResult,
    pub trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub progress_percent: u32,
    pub status: GoalStatus,
    pub remaining_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_monthly_contribution: Option<f64>,
}
