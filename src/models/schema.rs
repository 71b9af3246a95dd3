//! Column schema for per-symbol CSV files
//!
//! Replaces ad-hoc "is this column present" checks with an explicit
//! descriptor: which columns are required for a row to be kept, which are
//! optional, and what an absent column turns into.

use crate::constants::csv_column;

/// How a column participates in cleaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Row is dropped when the value is missing or non-finite
    Required,
    /// Missing values stay null; the row survives
    Optional,
}

/// Numeric fields of a candidate row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Turnover,
}

/// Column value type after cleaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Numeric(NumericField),
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub role: ColumnRole,
}

/// Columns the chart pipeline reads. An absent column is synthesized as
/// entirely null, so a file without `Date` or `Close` cleans to zero rows.
pub const OHLCV_SCHEMA: &[ColumnSpec] = &[
    ColumnSpec { name: csv_column::DATE, kind: ColumnKind::Date, role: ColumnRole::Required },
    ColumnSpec {
        name: csv_column::OPEN,
        kind: ColumnKind::Numeric(NumericField::Open),
        role: ColumnRole::Required,
    },
    ColumnSpec {
        name: csv_column::HIGH,
        kind: ColumnKind::Numeric(NumericField::High),
        role: ColumnRole::Required,
    },
    ColumnSpec {
        name: csv_column::LOW,
        kind: ColumnKind::Numeric(NumericField::Low),
        role: ColumnRole::Required,
    },
    ColumnSpec {
        name: csv_column::CLOSE,
        kind: ColumnKind::Numeric(NumericField::Close),
        role: ColumnRole::Required,
    },
    ColumnSpec {
        name: csv_column::VOLUME,
        kind: ColumnKind::Numeric(NumericField::Volume),
        role: ColumnRole::Optional,
    },
    ColumnSpec {
        name: csv_column::TURNOVER,
        kind: ColumnKind::Numeric(NumericField::Turnover),
        role: ColumnRole::Optional,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns() {
        let required: Vec<_> = OHLCV_SCHEMA
            .iter()
            .filter(|c| c.role == ColumnRole::Required)
            .map(|c| c.name)
            .collect();
        assert_eq!(required, vec!["Date", "Open", "High", "Low", "Close"]);
    }

    #[test]
    fn test_volume_and_turnover_are_optional() {
        let optional: Vec<_> = OHLCV_SCHEMA
            .iter()
            .filter(|c| c.role == ColumnRole::Optional)
            .map(|c| c.kind)
            .collect();
        assert_eq!(
            optional,
            vec![
                ColumnKind::Numeric(NumericField::Volume),
                ColumnKind::Numeric(NumericField::Turnover)
            ]
        );
    }

    #[test]
    fn test_one_date_column() {
        let dates = OHLCV_SCHEMA.iter().filter(|c| c.kind == ColumnKind::Date).count();
        assert_eq!(dates, 1);
    }
}
