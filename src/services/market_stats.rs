use crate::constants::{COMPANY_INFO_FILE, NEPSE_INDEX_PATH};
use crate::error::Result;
use crate::services::csv_parser::load_symbol;
use crate::services::csv_validator::clean_table;
use crate::utils::{format_date, normalize_symbol, validate_symbol};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Data directory statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketStats {
    pub total_symbols: usize,
    pub has_data: bool,
    pub has_nepse_index: bool,
    pub has_company_info: bool,
}

/// Summary of one symbol's cleaned series
#[derive(Debug, Clone, Serialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub raw_rows: usize,
    pub record_count: usize,
    pub first_date: String,
    pub last_date: String,
    pub last_close: f64,
}

/// Symbols with a `<SYMBOL>.csv` directly under `data_dir`, sorted
pub fn list_symbols(data_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(data_dir) else {
        return Vec::new();
    };

    let mut symbols: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .filter_map(|p| p.file_stem().map(|s| normalize_symbol(&s.to_string_lossy())))
        .collect();
    symbols.sort();
    symbols.dedup();
    symbols
}

/// Get overall data directory statistics
pub fn get_market_stats(data_dir: &Path) -> MarketStats {
    let total_symbols = list_symbols(data_dir).len();

    MarketStats {
        total_symbols,
        has_data: total_symbols > 0,
        has_nepse_index: data_dir.join(NEPSE_INDEX_PATH).is_file(),
        has_company_info: data_dir.join(COMPANY_INFO_FILE).is_file(),
    }
}

/// Load and clean one symbol and summarize what survives
pub fn get_symbol_info(data_dir: &Path, symbol: &str) -> Result<SymbolInfo> {
    let symbol = validate_symbol(symbol)?;
    let table = load_symbol(data_dir, &symbol)?;
    let series = clean_table(&symbol, &table)?;

    // clean_table never returns an empty series
    let first = &series[0];
    let last = &series[series.len() - 1];

    Ok(SymbolInfo {
        raw_rows: table.len(),
        record_count: series.len(),
        first_date: format_date(&first.date),
        last_date: format_date(&last.date),
        last_close: last.close,
        symbol,
    })
}
