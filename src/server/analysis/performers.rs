//! Top gainers/losers endpoint
//!
//! Serves the ranked latest-day movers across every symbol file. The scan is
//! cached inside `TopMoversService`, so most requests never touch disk.

use crate::error::AppError;
use crate::server::run_blocking;
use crate::services::{TopMovers, TopMoversService};
use axum::{extract::State, response::Json};
use std::sync::Arc;
use tracing::{info, instrument};

/// Handler for the top movers endpoint
#[instrument(skip(service))]
pub async fn top_movers_handler(
    State(service): State<Arc<TopMoversService>>,
) -> Result<Json<TopMovers>, AppError> {
    let movers = run_blocking(move || service.get()).await?;

    info!(
        gainers = movers.top_gainers.len(),
        losers = movers.top_losers.len(),
        "Returning top movers"
    );

    Ok(Json(movers))
}
