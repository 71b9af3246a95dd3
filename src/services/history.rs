//! Price history transform
//!
//! Latest-first rows with period-over-period `change` and `change_percent`.
//! Looser than the chart pipeline: rows are kept even when OHLC cells are
//! missing, and only the columns present in the source are emitted.

use crate::error::Result;
use crate::services::csv_parser::{load_symbol, RawTable};
use crate::services::csv_validator::{clean_date_value, clean_numeric_value};
use crate::utils::{format_date, round2, serialize_whole_column, validate_symbol};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Numeric columns cleaned when present, in output order after `close`
const PRICE_COLUMNS: [&str; 6] = ["close", "turnover", "volume", "open", "high", "low"];

/// `change_percent` is a formatted string ("-5.88%") when computed from
/// closes, or the cleaned number from a source `Percent Change` column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PercentValue {
    Text(String),
    Number(f64),
}

/// One history record. The outer `Option` says whether the column exists
/// in the source; the inner one is the (nullable) value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Option<PercentValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_whole_column")]
    pub turnover: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_whole_column")]
    pub volume: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Option<f64>>,
}

/// Normalize a header: trim, spaces → underscores, lower-case, and map
/// `percent_change` onto `change_percent`
pub fn normalize_header(header: &str) -> String {
    let normalized = header.trim().replace(' ', "_").to_lowercase();
    if normalized == "percent_change" {
        "change_percent".to_string()
    } else {
        normalized
    }
}

/// Clean a percent cell: drop `%` and spaces, then the usual numeric chain
pub fn clean_percent_value(value: &str) -> Option<f64> {
    let stripped: String = value.chars().filter(|c| *c != '%' && !c.is_whitespace()).collect();
    clean_numeric_value(&stripped)
}

/// Format a percent the way the history table shows it
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

#[derive(Debug, Clone)]
struct WorkingRow {
    date: Option<NaiveDate>,
    prices: [Option<f64>; 6],
    source_percent: Option<f64>,
}

/// Column presence after header normalization
#[derive(Debug, Clone, Copy)]
struct Presence {
    date: bool,
    prices: [bool; 6],
    source_percent: bool,
}

impl Presence {
    fn close(&self) -> bool {
        self.prices[0]
    }
}

/// Build latest-first history rows from a raw table
pub fn transform_history(table: &RawTable) -> Vec<HistoryRow> {
    let normalized = RawTable::new(
        table.headers.iter().map(|h| normalize_header(h)).collect(),
        table.records.clone(),
    );

    let date_col = normalized.column("date");
    let price_cols: Vec<Option<Vec<Option<&str>>>> =
        PRICE_COLUMNS.iter().map(|c| normalized.column(c)).collect();
    let percent_col = normalized.column("change_percent");

    let presence = Presence {
        date: date_col.is_some(),
        prices: std::array::from_fn(|i| price_cols[i].is_some()),
        source_percent: percent_col.is_some(),
    };

    let cell = |col: &Option<Vec<Option<&str>>>, row: usize| -> Option<String> {
        col.as_ref().and_then(|c| c[row]).map(str::to_string)
    };

    let mut rows: Vec<WorkingRow> = (0..normalized.len())
        .map(|i| WorkingRow {
            date: cell(&date_col, i).as_deref().and_then(clean_date_value),
            prices: std::array::from_fn(|p| cell(&price_cols[p], i).as_deref().and_then(clean_numeric_value)),
            source_percent: cell(&percent_col, i).as_deref().and_then(clean_percent_value),
        })
        .collect();

    if presence.date {
        rows.retain(|r| r.date.is_some());
        rows.sort_by_key(|r| r.date);
    }

    let mut out: Vec<HistoryRow> = Vec::with_capacity(rows.len());
    let mut prev_close: Option<Option<f64>> = None;

    for row in &rows {
        let mut record = HistoryRow::default();

        if presence.date {
            record.date = Some(row.date.as_ref().map(format_date));
        }

        if presence.close() {
            let close = row.prices[0];
            let (change, change_percent) = match (close, prev_close.flatten()) {
                (Some(close), Some(prev)) => {
                    let change = round2(close - prev);
                    let percent = if prev != 0.0 {
                        Some(round2(change / prev * 100.0)).filter(|p| p.is_finite())
                    } else {
                        None
                    };
                    (Some(change), percent.map(|p| PercentValue::Text(format_percent(p))))
                }
                _ => (None, None),
            };
            record.change = Some(change);
            record.change_percent = Some(change_percent);
            prev_close = Some(close);
        } else if presence.source_percent {
            record.change_percent = Some(row.source_percent.map(PercentValue::Number));
        }

        for (i, name) in PRICE_COLUMNS.iter().enumerate() {
            if !presence.prices[i] {
                continue;
            }
            let value = Some(row.prices[i]);
            match *name {
                "close" => record.close = value,
                "turnover" => record.turnover = value,
                "volume" => record.volume = value,
                "open" => record.open = value,
                "high" => record.high = value,
                "low" => record.low = value,
                _ => {}
            }
        }

        out.push(record);
    }

    out.reverse();
    out
}

/// Load `<SYMBOL>.csv` and build its latest-first history
pub fn build_history(data_dir: &Path, symbol: &str) -> Result<Vec<HistoryRow>> {
    let symbol = validate_symbol(symbol)?;
    let table = load_symbol(data_dir, &symbol)?;
    let rows = transform_history(&table);

    info!(symbol = %symbol, rows = rows.len(), "Built price history");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" Percent Change "), "change_percent");
        assert_eq!(normalize_header("Close"), "close");
        assert_eq!(normalize_header("Total Traded Quantity"), "total_traded_quantity");
    }

    #[test]
    fn test_clean_percent_value() {
        assert_eq!(clean_percent_value(" -5.88 % "), Some(-5.88));
        assert_eq!(clean_percent_value("1,2%"), Some(12.0));
        assert_eq!(clean_percent_value("-"), None);
    }

    #[test]
    fn test_change_and_latest_first_order() {
        let raw = table(
            &["Date", "Close", "Volume"],
            &[
                &["2024-01-02", "94.12", "1,000"],
                &["2024-01-01", "100", "500"],
                &["2024-01-03", "100", "-"],
            ],
        );

        let rows = transform_history(&raw);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].date, Some(Some("2024-01-03".to_string())));
        assert_eq!(rows[0].change, Some(Some(5.88)));
        assert_eq!(rows[0].change_percent, Some(Some(PercentValue::Text("6.25%".to_string()))));
        assert_eq!(rows[0].volume, Some(None));

        assert_eq!(rows[1].change, Some(Some(-5.88)));
        assert_eq!(rows[1].change_percent, Some(Some(PercentValue::Text("-5.88%".to_string()))));

        // Chronologically first row is listed last, with no change
        assert_eq!(rows[2].change, Some(None));
        assert_eq!(rows[2].change_percent, Some(None));
        assert_eq!(rows[2].volume, Some(Some(500.0)));

        // Absent columns are not emitted
        assert!(rows[0].open.is_none());
        assert!(rows[0].turnover.is_none());
    }

    #[test]
    fn test_change_percent_always_ends_with_percent_or_null() {
        let raw = table(
            &["Date", "Close"],
            &[
                &["2024-01-01", "0"],
                &["2024-01-02", "10"],
                &["2024-01-03", "N/A"],
                &["2024-01-04", "12"],
                &["2024-01-05", "15"],
            ],
        );

        for row in transform_history(&raw) {
            match row.change_percent.flatten() {
                Some(PercentValue::Text(text)) => assert!(text.ends_with('%')),
                Some(PercentValue::Number(_)) => panic!("computed percent must be text"),
                None => {}
            }
        }
    }

    #[test]
    fn test_zero_and_missing_prev_close_give_null() {
        let raw = table(
            &["Date", "Close"],
            &[&["2024-01-01", "0"], &["2024-01-02", "10"], &["2024-01-03", "-"], &["2024-01-04", "12"]],
        );
        let rows = transform_history(&raw);
        // Latest-first: 04 (prev missing), 03 (close missing), 02 (prev zero), 01 (first)
        assert_eq!(rows[0].change, Some(None));
        assert_eq!(rows[1].change, Some(None));
        assert_eq!(rows[2].change, Some(Some(10.0)));
        assert_eq!(rows[2].change_percent, Some(None));
        assert_eq!(rows[3].change, Some(None));
    }

    #[test]
    fn test_bad_dates_dropped() {
        let raw = table(&["Date", "Close"], &[&["bad", "1"], &["2024-01-01", "2"]]);
        let rows = transform_history(&raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, Some(Some(2.0)));
    }

    #[test]
    fn test_source_percent_kept_without_close() {
        let raw = table(&["Date", "Percent Change"], &[&["2024-01-01", "2.5 %"], &["2024-01-02", "-"]]);
        let rows = transform_history(&raw);
        assert_eq!(rows[0].change_percent, Some(None));
        assert_eq!(rows[1].change_percent, Some(Some(PercentValue::Number(2.5))));
        assert!(rows[0].change.is_none());
    }

    #[test]
    fn test_json_keys_follow_presence() {
        let raw = table(&["Date", "Close", "High"], &[&["2024-01-01", "5", ""]]);
        let json = serde_json::to_value(transform_history(&raw)).unwrap();
        let first = json[0].as_object().unwrap();

        assert_eq!(first["date"], "2024-01-01");
        assert!(first["change"].is_null());
        assert!(first["change_percent"].is_null());
        assert!(first["high"].is_null());
        assert!(!first.contains_key("low"));
        assert!(!first.contains_key("volume"));
    }

    #[test]
    fn test_whole_volume_serializes_as_integer() {
        let raw = table(&["Date", "Close", "Volume", "Turnover"], &[&["2024-01-01", "5", "1,000", "-"]]);
        let text = serde_json::to_string(&transform_history(&raw)).unwrap();
        assert!(text.contains(r#""close":5.0,"turnover":null,"volume":1000"#));
    }
}
