use crate::config::AppConfig;
use crate::error::AppError;
use crate::server::{run_blocking, AppState};
use crate::services::{
    self, build_chart, build_history, parse_limit, Announcement, ChartResponse, Company,
    HistoryRow, NepseIndex, Prediction,
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use axum_extra::extract::Query;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

type ApiResult<T> = std::result::Result<Json<T>, AppError>;

/// Query parameters for the chart endpoint
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Number of most recent rows to return; anything but a positive integer means all
    pub limit: Option<String>,
}

/// Handler for the chart endpoint
#[instrument(skip(config))]
pub async fn chart_handler(
    State(config): State<Arc<AppConfig>>,
    Path(symbol): Path<String>,
    Query(params): Query<ChartQuery>,
) -> ApiResult<ChartResponse> {
    let limit = parse_limit(params.limit.as_deref());
    debug!(symbol = %symbol, limit = ?limit, "Received chart request");

    let data_dir = config.data_dir.clone();
    let chart = run_blocking(move || build_chart(&data_dir, &symbol, limit)).await?;
    Ok(Json(chart))
}

/// Handler for the price history endpoint
#[instrument(skip(config))]
pub async fn history_handler(
    State(config): State<Arc<AppConfig>>,
    Path(symbol): Path<String>,
) -> ApiResult<Vec<HistoryRow>> {
    let data_dir = config.data_dir.clone();
    let rows = run_blocking(move || build_history(&data_dir, &symbol)).await?;
    Ok(Json(rows))
}

#[instrument(skip(config))]
pub async fn nepse_handler(State(config): State<Arc<AppConfig>>) -> ApiResult<NepseIndex> {
    let data_dir = config.data_dir.clone();
    let index = run_blocking(move || services::load_nepse_index(&data_dir)).await?;
    Ok(Json(index))
}

#[instrument(skip(config))]
pub async fn announcement_handler(
    State(config): State<Arc<AppConfig>>,
    Path(symbol): Path<String>,
) -> ApiResult<Vec<Announcement>> {
    let data_dir = config.data_dir.clone();
    let items = run_blocking(move || services::load_announcements(&data_dir, &symbol)).await?;
    Ok(Json(items))
}

#[instrument(skip(config))]
pub async fn prediction_handler(
    State(config): State<Arc<AppConfig>>,
    Path(symbol): Path<String>,
) -> ApiResult<Prediction> {
    let outputs_dir = config.outputs_dir.clone();
    let prediction = run_blocking(move || services::load_prediction(&outputs_dir, &symbol)).await?;
    Ok(Json(prediction))
}

#[instrument(skip(config))]
pub async fn list_companies_handler(State(config): State<Arc<AppConfig>>) -> ApiResult<Vec<Company>> {
    let data_dir = config.data_dir.clone();
    let companies = run_blocking(move || services::list_companies(&data_dir)).await?;
    Ok(Json(companies))
}

#[instrument(skip(config))]
pub async fn company_handler(
    State(config): State<Arc<AppConfig>>,
    Path(symbol): Path<String>,
) -> ApiResult<Company> {
    let data_dir = config.data_dir.clone();
    let company = run_blocking(move || services::find_company(&data_dir, &symbol)).await?;
    Ok(Json(company))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: i64,
    pub data_dir: String,
    pub outputs_dir: String,
    pub total_symbols: usize,
    pub has_nepse_index: bool,
    pub has_company_info: bool,
    pub top_movers_ttl_secs: u64,
    pub current_system_time: String,
}

/// Handler for health check endpoint
#[instrument(skip(app_state))]
pub async fn health_handler(State(app_state): State<AppState>) -> ApiResult<HealthResponse> {
    let config = app_state.config.clone();
    let data_dir = config.data_dir.clone();
    let stats = run_blocking(move || Ok(services::get_market_stats(&data_dir))).await?;

    let now = Utc::now();
    let response = HealthResponse {
        status: "ok",
        uptime_secs: (now - app_state.started_at).num_seconds(),
        data_dir: config.data_dir.display().to_string(),
        outputs_dir: config.outputs_dir.display().to_string(),
        total_symbols: stats.total_symbols,
        has_nepse_index: stats.has_nepse_index,
        has_company_info: stats.has_company_info,
        top_movers_ttl_secs: config.top_movers_ttl.as_secs(),
        current_system_time: now.to_rfc3339(),
    };

    info!(
        total_symbols = response.total_symbols,
        uptime_secs = response.uptime_secs,
        "Returning health stats"
    );

    Ok(Json(response))
}
