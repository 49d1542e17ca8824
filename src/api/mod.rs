use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    FireResult, GoalFundingRequest, GoalProgress, IncomeField, ProjectionError, ProjectionInput,
    ProjectionReport, assess_goal, run_advanced_fire, run_basic_fire, run_projection,
    simulate_trajectory, solve_goal_funding, update_income_or_expenses,
};

const DEFAULT_ANNUAL_EXPENSES: f64 = 50_000.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CalculatorMode {
    Basic,
    Advanced,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCalculatorMode {
    #[serde(alias = "simple")]
    Basic,
    #[serde(alias = "full")]
    Advanced,
}

impl From<ApiCalculatorMode> for CalculatorMode {
    fn from(value: ApiCalculatorMode) -> Self {
        match value {
            ApiCalculatorMode::Basic => CalculatorMode::Basic,
            ApiCalculatorMode::Advanced => CalculatorMode::Advanced,
        }
    }
}

/// Projection assumptions shared by the command line and the HTTP payload
/// overlay. Rates are percentages.
#[derive(Args, Debug, Clone)]
pub struct ProjectionArgs {
    #[arg(long, default_value_t = 30)]
    pub current_age: u32,
    #[arg(long, default_value_t = 45)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 90)]
    pub life_expectancy: u32,
    #[arg(long, default_value_t = 100_000.0)]
    pub current_savings: f64,
    #[arg(long, default_value_t = 80_000.0)]
    pub annual_income: f64,
    #[arg(
        long,
        conflicts_with = "savings_rate",
        help = "Annual spending; the savings rate is derived from it (default 50000)"
    )]
    pub annual_expenses: Option<f64>,
    #[arg(
        long,
        help = "Savings rate in percent; annual expenses are derived from it"
    )]
    pub savings_rate: Option<f64>,
    #[arg(
        long,
        help = "Single expected annual return in percent, used before and after retirement"
    )]
    pub investment_return: Option<f64>,
    #[arg(long, default_value_t = 7.0)]
    pub pre_retirement_return: f64,
    #[arg(long, default_value_t = 5.0)]
    pub post_retirement_return: f64,
    #[arg(long, default_value_t = 4.0)]
    pub withdrawal_rate: f64,
    #[arg(long, default_value_t = 2.5)]
    pub inflation_rate: f64,
    #[arg(long, default_value_t = 2025, help = "Calendar year of the first projected year")]
    pub current_year: i32,
}

impl Default for ProjectionArgs {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 45,
            life_expectancy: 90,
            current_savings: 100_000.0,
            annual_income: 80_000.0,
            annual_expenses: None,
            savings_rate: None,
            investment_return: None,
            pre_retirement_return: 7.0,
            post_retirement_return: 5.0,
            withdrawal_rate: 4.0,
            inflation_rate: 2.5,
            current_year: 2025,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    current_savings: Option<f64>,
    annual_income: Option<f64>,
    annual_expenses: Option<f64>,
    savings_rate: Option<f64>,
    investment_return: Option<f64>,
    pre_retirement_return: Option<f64>,
    post_retirement_return: Option<f64>,
    withdrawal_rate: Option<f64>,
    inflation_rate: Option<f64>,
    current_year: Option<i32>,
    mode: Option<ApiCalculatorMode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePayload {
    #[serde(default)]
    inputs: ProjectionPayload,
    field: IncomeField,
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoalProgressPayload {
    current_amount: f64,
    target_amount: f64,
    months_remaining: Option<u32>,
    #[serde(default)]
    annual_return: f64,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: ProjectionInput,
    mode: CalculatorMode,
}

#[derive(Debug, Serialize)]
struct PaymentResponse {
    payment: f64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Turns command-line style arguments into validated engine inputs. Exactly
/// one of annual expenses and savings rate may be given; the other is
/// derived.
pub fn build_inputs(args: ProjectionArgs) -> Result<ProjectionInput, String> {
    let (pre_return, post_return) = match args.investment_return {
        Some(single) => (single, single),
        None => (args.pre_retirement_return, args.post_retirement_return),
    };

    let base = ProjectionInput {
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        life_expectancy: args.life_expectancy,
        current_savings: args.current_savings,
        annual_income: args.annual_income,
        annual_expenses: 0.0,
        savings_rate_percent: 0.0,
        pre_retirement_return_percent: pre_return,
        post_retirement_return_percent: post_return,
        withdrawal_rate_percent: args.withdrawal_rate,
        inflation_rate_percent: args.inflation_rate,
        current_year_index: args.current_year,
    };

    let inputs = match (args.annual_expenses, args.savings_rate) {
        (Some(_), Some(_)) => {
            return Err(
                "supply either --annual-expenses or --savings-rate, not both".to_string(),
            );
        }
        (None, Some(rate)) => update_income_or_expenses(&base, IncomeField::SavingsRate, rate),
        (expenses, None) => update_income_or_expenses(
            &base,
            IncomeField::AnnualExpenses,
            expenses.unwrap_or(DEFAULT_ANNUAL_EXPENSES),
        ),
    }
    .map_err(|e| e.to_string())?;

    inputs.validate().map_err(|e| e.to_string())?;
    Ok(inputs)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "FIRE projection API listening");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/fire/basic",
            get(basic_get_handler).post(basic_post_handler),
        )
        .route(
            "/api/fire/advanced",
            get(advanced_get_handler).post(advanced_post_handler),
        )
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route("/api/goal-funding", post(goal_funding_handler))
        .route("/api/inputs/update", post(update_inputs_handler))
        .route("/api/goals/progress", post(goal_progress_handler))
        .fallback(not_found_handler)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn basic_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    fire_handler_impl(payload, CalculatorMode::Basic)
}

async fn basic_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    fire_handler_impl(payload, CalculatorMode::Basic)
}

async fn advanced_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    fire_handler_impl(payload, CalculatorMode::Advanced)
}

async fn advanced_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    fire_handler_impl(payload, CalculatorMode::Advanced)
}

async fn projection_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

async fn projection_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

fn fire_handler_impl(payload: ProjectionPayload, mode: CalculatorMode) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return bad_request(&msg),
    };
    match run_fire(&request.inputs, mode) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(e) => engine_error_response(&e),
    }
}

fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return bad_request(&msg),
    };
    match build_projection_report(&request.inputs, request.mode) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(e) => engine_error_response(&e),
    }
}

async fn goal_funding_handler(Json(request): Json<GoalFundingRequest>) -> Response {
    match solve_goal_funding(&request) {
        Ok(payment) => json_response(StatusCode::OK, PaymentResponse { payment }),
        Err(e) => engine_error_response(&e),
    }
}

async fn update_inputs_handler(Json(payload): Json<UpdatePayload>) -> Response {
    let base = match api_request_from_payload(payload.inputs) {
        Ok(request) => request.inputs,
        Err(msg) => return bad_request(&msg),
    };
    match update_income_or_expenses(&base, payload.field, payload.value) {
        Ok(inputs) => json_response(StatusCode::OK, inputs),
        Err(e) => engine_error_response(&e),
    }
}

async fn goal_progress_handler(Json(payload): Json<GoalProgressPayload>) -> Response {
    match goal_progress_from_payload(&payload) {
        Ok(progress) => json_response(StatusCode::OK, progress),
        Err(e) => engine_error_response(&e),
    }
}

fn goal_progress_from_payload(
    payload: &GoalProgressPayload,
) -> Result<GoalProgress, ProjectionError> {
    assess_goal(
        payload.current_amount,
        payload.target_amount,
        payload.months_remaining,
        payload.annual_return,
    )
}

pub fn run_fire(
    inputs: &ProjectionInput,
    mode: CalculatorMode,
) -> Result<FireResult, ProjectionError> {
    match mode {
        CalculatorMode::Basic => run_basic_fire(inputs),
        CalculatorMode::Advanced => run_advanced_fire(inputs),
    }
}

/// Summary plus trajectory. The basic calculator has one return assumption,
/// so its trajectory grows retirement years at the pre-retirement return.
pub fn build_projection_report(
    inputs: &ProjectionInput,
    mode: CalculatorMode,
) -> Result<ProjectionReport, ProjectionError> {
    match mode {
        CalculatorMode::Advanced => run_projection(inputs),
        CalculatorMode::Basic => {
            let result = run_basic_fire(inputs)?;
            let single = inputs
                .clone()
                .with_single_return(inputs.pre_retirement_return_percent);
            let trajectory = simulate_trajectory(&single)?;
            Ok(ProjectionReport { result, trajectory })
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn bad_request(msg: &str) -> Response {
    warn!(error = msg, "rejected projection payload");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn engine_error_response(err: &ProjectionError) -> Response {
    warn!(error = %err, "calculation failed");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectionPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectionPayload) -> Result<ApiRequest, String> {
    let mut args = ProjectionArgs::default();
    let mut mode = CalculatorMode::Advanced;

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        args.life_expectancy = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.annual_income {
        args.annual_income = v;
    }
    if let Some(v) = payload.annual_expenses {
        args.annual_expenses = Some(v);
    }
    if let Some(v) = payload.savings_rate {
        args.savings_rate = Some(v);
    }
    if let Some(v) = payload.investment_return {
        args.investment_return = Some(v);
    }
    if let Some(v) = payload.pre_retirement_return {
        args.pre_retirement_return = v;
    }
    if let Some(v) = payload.post_retirement_return {
        args.post_retirement_return = v;
    }
    if let Some(v) = payload.withdrawal_rate {
        args.withdrawal_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        args.inflation_rate = v;
    }
    if let Some(v) = payload.current_year {
        args.current_year = v;
    }
    if let Some(v) = payload.mode {
        mode = v.into();
    }

    let inputs = build_inputs(args)?;
    debug!(?mode, "built projection request");
    Ok(ApiRequest { inputs, mode })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn build_inputs_derives_savings_rate_from_default_expenses() {
        let inputs = build_inputs(ProjectionArgs::default()).expect("valid inputs");
        assert_approx(inputs.annual_expenses, 50_000.0);
        assert_approx(inputs.savings_rate_percent, 37.5);
    }

    #[test]
    fn build_inputs_derives_expenses_from_savings_rate() {
        let args = ProjectionArgs {
            savings_rate: Some(25.0),
            ..ProjectionArgs::default()
        };
        let inputs = build_inputs(args).expect("valid inputs");
        assert_approx(inputs.annual_expenses, 60_000.0);
    }

    #[test]
    fn build_inputs_rejects_both_expenses_and_savings_rate() {
        let args = ProjectionArgs {
            annual_expenses: Some(40_000.0),
            savings_rate: Some(50.0),
            ..ProjectionArgs::default()
        };
        let err = build_inputs(args).expect_err("must reject");
        assert!(err.contains("--savings-rate"));
    }

    #[test]
    fn build_inputs_single_return_overrides_both_phases() {
        let args = ProjectionArgs {
            investment_return: Some(6.0),
            ..ProjectionArgs::default()
        };
        let inputs = build_inputs(args).expect("valid inputs");
        assert_approx(inputs.pre_retirement_return_percent, 6.0);
        assert_approx(inputs.post_retirement_return_percent, 6.0);
    }

    #[test]
    fn build_inputs_rejects_retirement_before_current_age() {
        let args = ProjectionArgs {
            retirement_age: 25,
            ..ProjectionArgs::default()
        };
        let err = build_inputs(args).expect_err("must reject");
        assert!(err.contains("retirement age"));
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "currentAge": 35,
          "retirementAge": 55,
          "lifeExpectancy": 95,
          "currentSavings": 250000,
          "annualIncome": 120000,
          "savingsRate": 40,
          "preRetirementReturn": 6.5,
          "postRetirementReturn": 4.5,
          "withdrawalRate": 3.5,
          "inflationRate": 3,
          "currentYear": 2030,
          "mode": "basic"
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let inputs = request.inputs;

        assert_eq!(request.mode, CalculatorMode::Basic);
        assert_eq!(inputs.current_age, 35);
        assert_eq!(inputs.retirement_age, 55);
        assert_eq!(inputs.life_expectancy, 95);
        assert_eq!(inputs.current_year_index, 2030);
        assert_approx(inputs.current_savings, 250_000.0);
        assert_approx(inputs.annual_expenses, 72_000.0);
        assert_approx(inputs.savings_rate_percent, 40.0);
        assert_approx(inputs.pre_retirement_return_percent, 6.5);
        assert_approx(inputs.post_retirement_return_percent, 4.5);
        assert_approx(inputs.withdrawal_rate_percent, 3.5);
        assert_approx(inputs.inflation_rate_percent, 3.0);
    }

    #[test]
    fn api_request_from_empty_json_uses_default_scenario() {
        let request = api_request_from_json("{}").expect("json should parse");
        assert_eq!(request.mode, CalculatorMode::Advanced);
        assert_eq!(request.inputs, ProjectionInput::default());
    }

    #[test]
    fn fire_result_serialization_contains_expected_fields() {
        let request = api_request_from_json("{}").expect("json should parse");
        let result = run_fire(&request.inputs, CalculatorMode::Advanced).expect("valid");
        let json = serde_json::to_string(&result).expect("result should serialize");
        assert!(json.contains("\"yearsToRetirement\":15"));
        assert!(json.contains("\"retirementSavingsGoal\""));
        assert!(json.contains("\"requiredPeriodicContribution\""));
        assert!(json.contains("\"retirementIncomePerPeriod\""));
        assert!(json.contains("\"successProbabilityPercent\""));

        let basic = run_fire(&request.inputs, CalculatorMode::Basic).expect("valid");
        let json = serde_json::to_string(&basic).expect("result should serialize");
        assert!(!json.contains("successProbabilityPercent"));
    }

    #[test]
    fn basic_projection_report_omits_success_probability() {
        let request = api_request_from_json(r#"{"mode": "basic"}"#).expect("json should parse");
        let report = build_projection_report(&request.inputs, request.mode).expect("valid");
        assert_eq!(report.result.success_probability_percent, None);
        assert_eq!(report.trajectory.len(), 61);
    }

    #[test]
    fn basic_projection_grows_retirement_years_at_single_return() {
        let request = api_request_from_json(r#"{"mode": "basic"}"#).expect("json should parse");
        let report = build_projection_report(&request.inputs, request.mode).expect("valid");
        // Age 45 is index 15; withdraw 4% then grow at the 7% pre-retirement return.
        let before = report.trajectory[15].portfolio_value;
        let after = report.trajectory[16].portfolio_value;
        assert_approx(after, before * 0.96 * 1.07);

        let advanced = build_projection_report(&request.inputs, CalculatorMode::Advanced)
            .expect("valid");
        let before = advanced.trajectory[15].portfolio_value;
        let after = advanced.trajectory[16].portfolio_value;
        assert_approx(after, before * 0.96 * 1.05);
    }

    #[test]
    fn huge_life_expectancy_is_rejected_before_projection() {
        let err = api_request_from_json(r#"{"lifeExpectancy": 4000000000}"#)
            .expect_err("must reject");
        assert!(err.starts_with("invalid horizon"));
    }

    #[test]
    fn update_payload_accepts_camel_case_field_names() {
        let payload: UpdatePayload =
            serde_json::from_str(r#"{"field": "savingsRate", "value": 50}"#).expect("parses");
        assert_eq!(payload.field, IncomeField::SavingsRate);

        let payload: UpdatePayload = serde_json::from_str(
            r#"{"inputs": {"annualIncome": 90000}, "field": "annual-expenses", "value": 45000}"#,
        )
        .expect("parses");
        assert_eq!(payload.field, IncomeField::AnnualExpenses);
        assert_eq!(payload.inputs.annual_income, Some(90_000.0));
    }

    #[tokio::test]
    async fn advanced_handler_returns_result_json() {
        let response = advanced_post_handler(Json(ProjectionPayload::default())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let body = body_json(response).await;
        assert_eq!(body["yearsToRetirement"], 15);
        assert_approx(body["successProbabilityPercent"].as_f64().expect("number"), 62.5);
    }

    #[tokio::test]
    async fn invalid_payload_maps_to_bad_request() {
        let payload = ProjectionPayload {
            withdrawal_rate: Some(0.0),
            ..ProjectionPayload::default()
        };
        let response = basic_post_handler(Json(payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .expect("error string")
                .contains("withdrawal rate")
        );
    }

    #[tokio::test]
    async fn goal_funding_handler_rejects_zero_periods() {
        let response = goal_funding_handler(Json(GoalFundingRequest {
            present_value: 0.0,
            future_value: 1_000.0,
            periods: 0,
            periodic_rate: 0.01,
        }))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .expect("error string")
                .starts_with("invalid horizon")
        );
    }

    #[tokio::test]
    async fn update_inputs_handler_derives_expenses() {
        let payload = UpdatePayload {
            inputs: ProjectionPayload::default(),
            field: IncomeField::SavingsRate,
            value: 50.0,
        };
        let response = update_inputs_handler(Json(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_approx(body["annualExpenses"].as_f64().expect("number"), 40_000.0);
        assert_approx(body["savingsRatePercent"].as_f64().expect("number"), 50.0);
    }

    #[tokio::test]
    async fn goal_progress_handler_reports_progress() {
        let payload: GoalProgressPayload = serde_json::from_str(
            r#"{"currentAmount": 5000, "targetAmount": 10000, "monthsRemaining": 10}"#,
        )
        .expect("parses");
        let response = goal_progress_handler(Json(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["progressPercent"], 50);
        assert_eq!(body["status"], "active");
        assert_approx(
            body["requiredMonthlyContribution"].as_f64().expect("number"),
            500.0,
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
