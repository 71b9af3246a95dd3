//! CSV Cleaning and Validation Service
//!
//! Turns a `RawTable` into a strictly validated, date-ascending series.
//!
//! Numeric cells go through a chain of pure steps:
//! `strip_separators` → `strip_stray_chars` → `parse_or_null`.
//! A bad cell becomes `None`; it never fails the whole series.

use crate::error::{Error, Result};
use crate::models::schema::{ColumnKind, ColumnRole, NumericField, OHLCV_SCHEMA};
use crate::models::{Ohlcv, TimeSeries};
use crate::services::csv_parser::RawTable;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

/// Date-only formats tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Date-time formats whose time part is discarded
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Remove comma thousands separators
pub fn strip_separators(value: &str) -> String {
    value.replace(',', "")
}

/// Keep only digits, `.` and `-`
pub fn strip_stray_chars(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Parse a normalized string; empty, lone dash, garbage or non-finite → `None`
pub fn parse_or_null(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() || value == "-" {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Clean one numeric cell
pub fn clean_numeric_value(value: &str) -> Option<f64> {
    parse_or_null(&strip_stray_chars(&strip_separators(value)))
}

/// Clean a whole numeric column; an absent column becomes all `None`
pub fn clean_numeric(column: Option<&[Option<&str>]>, len: usize) -> Vec<Option<f64>> {
    match column {
        Some(values) => values
            .iter()
            .map(|v| v.and_then(clean_numeric_value))
            .collect(),
        None => vec![None; len],
    }
}

/// Parse a date cell into a calendar date
pub fn clean_date_value(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // Compact YYYYMMDD
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        let year = value[0..4].parse().ok()?;
        let month = value[4..6].parse().ok()?;
        let day = value[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Clean a whole date column; an absent column becomes all `None`
pub fn clean_date(column: Option<&[Option<&str>]>, len: usize) -> Vec<Option<NaiveDate>> {
    match column {
        Some(values) => values
            .iter()
            .map(|v| v.and_then(clean_date_value))
            .collect(),
        None => vec![None; len],
    }
}

/// A row after per-column coercion, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateRow {
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub turnover: Option<f64>,
}

impl CandidateRow {
    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Open => self.open,
            NumericField::High => self.high,
            NumericField::Low => self.low,
            NumericField::Close => self.close,
            NumericField::Volume => self.volume,
            NumericField::Turnover => self.turnover,
        }
    }

    fn numeric_mut(&mut self, field: NumericField) -> &mut Option<f64> {
        match field {
            NumericField::Open => &mut self.open,
            NumericField::High => &mut self.high,
            NumericField::Low => &mut self.low,
            NumericField::Close => &mut self.close,
            NumericField::Volume => &mut self.volume,
            NumericField::Turnover => &mut self.turnover,
        }
    }

    /// Whether the row has a usable value for one schema column
    fn satisfies(&self, kind: ColumnKind) -> bool {
        match kind {
            ColumnKind::Date => self.date.is_some(),
            ColumnKind::Numeric(field) => self.numeric(field).is_some_and(f64::is_finite),
        }
    }
}

/// Coerce every schema column of the table
pub fn coerce_table(table: &RawTable) -> Vec<CandidateRow> {
    let len = table.len();
    let mut rows = vec![CandidateRow::default(); len];

    for spec in OHLCV_SCHEMA {
        let raw = table.column(spec.name);
        if raw.is_none() {
            debug!(column = spec.name, role = ?spec.role, "Column absent, filling with nulls");
        }

        match spec.kind {
            ColumnKind::Date => {
                for (row, date) in rows.iter_mut().zip(clean_date(raw.as_deref(), len)) {
                    row.date = date;
                }
            }
            ColumnKind::Numeric(field) => {
                for (row, value) in rows.iter_mut().zip(clean_numeric(raw.as_deref(), len)) {
                    *row.numeric_mut(field) = value;
                }
            }
        }
    }

    rows
}

/// Drop rows missing a required column or holding a non-finite value in one
///
/// Optional columns (volume, turnover) never cause a drop.
pub fn filter_valid(rows: Vec<CandidateRow>) -> TimeSeries {
    rows.into_iter()
        .filter(|row| {
            OHLCV_SCHEMA
                .iter()
                .filter(|spec| spec.role == ColumnRole::Required)
                .all(|spec| row.satisfies(spec.kind))
        })
        .filter_map(|row| {
            let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
            Some(Ohlcv::with_volume(
                row.date?,
                finite(row.open)?,
                finite(row.high)?,
                finite(row.low)?,
                finite(row.close)?,
                finite(row.volume),
                finite(row.turnover),
            ))
        })
        .collect()
}

/// Stable sort by date, oldest first; equal dates keep file order
pub fn sort_ascending(mut rows: TimeSeries) -> TimeSeries {
    rows.sort_by_key(|r| r.date);
    rows
}

/// Full cleaning stage: coerce, validate, sort
///
/// Returns `EmptySeries` when nothing survives.
pub fn clean_table(symbol: &str, table: &RawTable) -> Result<TimeSeries> {
    let total = table.len();
    let rows = sort_ascending(filter_valid(coerce_table(table)));

    debug!(symbol, total, kept = rows.len(), dropped = total - rows.len(), "Cleaned series");

    if rows.is_empty() {
        return Err(Error::EmptySeries(format!(
            "No valid OHLC rows for {} after cleaning",
            symbol
        )));
    }

    Ok(rows)
}
