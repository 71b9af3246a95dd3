//! Top Gainers/Losers aggregator
//!
//! Scans every symbol CSV in the data directory, takes the latest day's
//! percent change per symbol and ranks them. The ranked result is cached
//! for a configurable TTL.

use crate::constants::{csv_column, TOP_MOVERS_CACHE_KEY, TOP_MOVERS_COUNT};
use crate::error::{AppError, Result};
use crate::services::cache::{Cache, MemoryCache};
use crate::services::csv_parser::{read_csv, RawTable};
use crate::services::csv_validator::{clean_date_value, clean_numeric_value};
use crate::services::history::clean_percent_value;
use crate::utils::round2;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One ranked symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoverEntry {
    pub symbol: String,
    pub percent_change: f64,
    pub close: f64,
    pub change: f64,
}

/// Ranked gainers and losers, at most `TOP_MOVERS_COUNT` each
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopMovers {
    pub top_gainers: Vec<MoverEntry>,
    pub top_losers: Vec<MoverEntry>,
}

#[derive(Debug)]
struct DatedRow<'a> {
    date: NaiveDate,
    percent_change: f64,
    symbol: Option<&'a str>,
    close: Option<&'a str>,
}

/// Extract the latest-day entry for one symbol table
///
/// Returns `None` when the table lacks the needed columns, has fewer than
/// two usable rows, or either of the two latest closes is non-numeric.
pub fn latest_mover(table: &RawTable, fallback_symbol: &str) -> Option<MoverEntry> {
    let symbols = table.column(csv_column::SYMBOL)?;
    let percents = table.column(csv_column::PERCENT_CHANGE)?;
    let dates = table.column(csv_column::DATE)?;
    let closes = table.column(csv_column::CLOSE)?;

    let mut rows: Vec<DatedRow> = (0..table.len())
        .filter_map(|i| {
            let percent_change = percents[i].and_then(clean_percent_value)?;
            let date = dates[i].and_then(clean_date_value)?;
            Some(DatedRow {
                date,
                percent_change,
                symbol: symbols[i],
                close: closes[i],
            })
        })
        .collect();

    if rows.len() < 2 {
        return None;
    }

    // Stable: equal dates keep file order
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    let latest = &rows[0];
    let previous = &rows[1];
    let close = latest.close.and_then(clean_numeric_value)?;
    let prev_close = previous.close.and_then(clean_numeric_value)?;

    let symbol = latest
        .symbol
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback_symbol)
        .to_uppercase();

    Some(MoverEntry {
        symbol,
        percent_change: latest.percent_change,
        close,
        change: round2(close - prev_close),
    })
}

fn by_percent_desc(a: &MoverEntry, b: &MoverEntry) -> Ordering {
    b.percent_change
        .partial_cmp(&a.percent_change)
        .unwrap_or(Ordering::Equal)
}

/// Rank entries into the top gainers and top losers
///
/// Both lists are stable sorts of the input, so equal percentages keep
/// scan order in each.
pub fn rank_movers(entries: Vec<MoverEntry>, count: usize) -> TopMovers {
    let mut ascending = entries.clone();
    ascending.sort_by(|a, b| by_percent_desc(b, a));
    let top_losers: Vec<MoverEntry> = ascending.into_iter().take(count).collect();

    let mut descending = entries;
    descending.sort_by(by_percent_desc);
    let top_gainers: Vec<MoverEntry> = descending.into_iter().take(count).collect();

    TopMovers {
        top_gainers,
        top_losers,
    }
}

/// Scan `data_dir` for symbol CSVs and rank them, without caching
pub fn scan_top_movers(data_dir: &Path) -> Result<TopMovers> {
    let dir = std::fs::read_dir(data_dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound(format!("Data directory {} not found", data_dir.display()))
        }
        _ => AppError::Io(e.to_string()),
    })?;

    let mut paths: Vec<PathBuf> = dir
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    paths.sort();

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for path in &paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let table = match read_csv(path) {
            Ok(table) => table,
            Err(e) => {
                debug!(file = %path.display(), error = %e, "Skipping unreadable CSV");
                skipped += 1;
                continue;
            }
        };

        match latest_mover(&table, &stem) {
            Some(entry) => entries.push(entry),
            None => {
                debug!(file = %path.display(), "Skipping CSV without a usable latest day");
                skipped += 1;
            }
        }
    }

    info!(
        files = paths.len(),
        eligible = entries.len(),
        skipped,
        "Scanned top movers"
    );

    Ok(rank_movers(entries, TOP_MOVERS_COUNT))
}

/// Cached top movers lookup
pub struct TopMoversService {
    data_dir: PathBuf,
    ttl: Duration,
    cache: Arc<dyn Cache<TopMovers>>,
}

impl TopMoversService {
    pub fn new(data_dir: PathBuf, ttl: Duration) -> Self {
        Self::with_cache(data_dir, ttl, Arc::new(MemoryCache::<TopMovers>::new()))
    }

    pub fn with_cache(data_dir: PathBuf, ttl: Duration, cache: Arc<dyn Cache<TopMovers>>) -> Self {
        Self {
            data_dir,
            ttl,
            cache,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Cached result if fresh, otherwise rescan and store
    pub fn get(&self) -> Result<TopMovers> {
        if let Some(hit) = self.cache.get(TOP_MOVERS_CACHE_KEY) {
            debug!(key = TOP_MOVERS_CACHE_KEY, "Top movers cache hit");
            return Ok(hit);
        }

        let movers = scan_top_movers(&self.data_dir)?;
        self.cache.set(TOP_MOVERS_CACHE_KEY, movers.clone(), self.ttl);
        Ok(movers)
    }
}
