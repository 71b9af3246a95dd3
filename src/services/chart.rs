//! Chart pipeline: Loader → Cleaner → Indicator Engine → Projector

use crate::error::Result;
use crate::services::csv_parser::load_symbol;
use crate::services::csv_validator::clean_table;
use crate::services::indicator_engine::compute_indicators;
use crate::services::projector::{project, ChartResponse};
use crate::utils::validate_symbol;
use std::path::Path;
use tracing::info;

/// Build the chart envelope for one symbol
///
/// `limit` is the already-parsed tail count (see `projector::parse_limit`).
pub fn build_chart(data_dir: &Path, symbol: &str, limit: Option<usize>) -> Result<ChartResponse> {
    let symbol = validate_symbol(symbol)?;

    let table = load_symbol(data_dir, &symbol)?;
    let series = clean_table(&symbol, &table)?;
    let total_rows = series.len();

    let with_indicators = compute_indicators(series);
    let response = project(&symbol, with_indicators, limit);

    info!(
        symbol = %symbol,
        raw_rows = table.len(),
        clean_rows = total_rows,
        returned_rows = response.chart.dates.len(),
        limit = ?limit,
        "Built chart"
    );

    Ok(response)
}
