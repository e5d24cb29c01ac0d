use crate::service::{DashboardService, Dataset, HealthReport, SummaryReport};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flarewatch_analytics::{
    Forecast, IntensityDistribution, LagCorrelation, LagScan, RollingCorrelation, Scenario,
    Simulation, Trend, VolatilitySplit, MAX_HORIZON_DAYS, TREND_WINDOW,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Longest lookback or projection horizon a request may ask for.
pub const MAX_DAYS: u32 = MAX_HORIZON_DAYS;
/// Largest lag a scan may ask for.
pub const MAX_LAG: usize = 365;

/// Handler failure rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

fn check_days(name: &str, value: Option<u32>) -> Result<Option<u32>, ApiError> {
    match value {
        Some(0) => Err(ApiError::bad_request(format!("{name} must be at least 1"))),
        Some(days) if days > MAX_DAYS => Err(ApiError::bad_request(format!(
            "{name} must be at most {MAX_DAYS}"
        ))),
        other => Ok(other),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LookbackQuery {
    pub days_back: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LagQuery {
    #[serde(default)]
    pub lag: usize,
    pub days_back: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LagsQuery {
    pub max_lag: Option<usize>,
    pub days_back: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RollingQuery {
    pub window: Option<usize>,
    pub days_back: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<u32>,
    pub days_back: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SimulateQuery {
    pub scenario: Option<String>,
    pub days: Option<u32>,
    pub days_back: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingResponse {
    pub window: usize,
    pub points: Vec<RollingCorrelation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResponse {
    pub trend: Trend,
    pub window: usize,
}

pub async fn health(State(service): State<Arc<DashboardService>>) -> Json<HealthReport> {
    Json(service.health().await)
}

/// Merged records with the raw series they came from.
///
/// # Errors
/// Returns `400` if `days_back` is out of range.
pub async fn records(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<LookbackQuery>,
) -> Result<Json<Dataset>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    let dataset = service.dataset(days_back).await;
    Ok(Json(Dataset::clone(&dataset)))
}

/// # Errors
/// Returns `400` if `days_back` is out of range.
pub async fn summary(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<LookbackQuery>,
) -> Result<Json<SummaryReport>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    Ok(Json(service.summary(days_back).await))
}

/// # Errors
/// Returns `400` if `days_back` is out of range.
pub async fn distribution(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<LookbackQuery>,
) -> Result<Json<IntensityDistribution>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    Ok(Json(service.distribution(days_back).await))
}

/// # Errors
/// Returns `400` if `days_back` is out of range.
pub async fn classes(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<LookbackQuery>,
) -> Result<Json<BTreeMap<String, usize>>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    Ok(Json(service.classes(days_back).await))
}

/// # Errors
/// Returns `400` if `days_back` is out of range.
pub async fn volatility_split(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<LookbackQuery>,
) -> Result<Json<VolatilitySplit>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    Ok(Json(service.volatility_split(days_back).await))
}

/// # Errors
/// Returns `400` if `lag` or `days_back` is out of range.
pub async fn lag_correlation(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<LagQuery>,
) -> Result<Json<LagCorrelation>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    if query.lag > MAX_LAG {
        return Err(ApiError::bad_request(format!("lag must be at most {MAX_LAG}")));
    }
    Ok(Json(service.lag_correlation(query.lag, days_back).await))
}

/// # Errors
/// Returns `400` if `max_lag` or `days_back` is out of range.
pub async fn lag_scan(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<LagsQuery>,
) -> Result<Json<LagScan>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    if query.max_lag.is_some_and(|lag| lag > MAX_LAG) {
        return Err(ApiError::bad_request(format!("max_lag must be at most {MAX_LAG}")));
    }
    Ok(Json(service.lag_scan(query.max_lag, days_back).await))
}

/// # Errors
/// Returns `400` if `days_back` is out of range.
pub async fn rolling_correlation(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<RollingQuery>,
) -> Result<Json<RollingResponse>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    let (window, points) = service.rolling(query.window, days_back).await;
    Ok(Json(RollingResponse { window, points }))
}

/// # Errors
/// Returns `400` if `days_back` is out of range.
pub async fn trend(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<LookbackQuery>,
) -> Result<Json<TrendResponse>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    Ok(Json(TrendResponse {
        trend: service.trend(days_back).await,
        window: TREND_WINDOW,
    }))
}

/// # Errors
/// Returns `400` if `days` or `days_back` is out of range.
pub async fn forecast(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<Forecast>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    let days = check_days("days", query.days)?;
    Ok(Json(service.forecast(days, days_back).await))
}

/// # Errors
/// Returns `400` for an unknown scenario or out-of-range `days`/`days_back`.
pub async fn simulate(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<SimulateQuery>,
) -> Result<Json<Simulation>, ApiError> {
    let days_back = check_days("days_back", query.days_back)?;
    let days = check_days("days", query.days)?;
    let scenario = match query.scenario.as_deref() {
        Some(name) => name
            .parse::<Scenario>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => Scenario::Baseline,
    };
    Ok(Json(service.simulate(scenario, days, days_back).await))
}
