use crate::error::{AppError, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Get stock data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("STOCK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get prediction outputs directory from environment variable or use default
pub fn get_outputs_dir() -> PathBuf {
    std::env::var("STOCK_OUTPUTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("outputs"))
}

/// Normalize a requested ticker: trim and upper-case
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Normalize a requested ticker and reject anything that is not a plain
/// file stem
///
/// Accepts `[A-Z0-9._-]+` after upper-casing; `..` and path separators are
/// `InvalidInput`, so a symbol never resolves outside its directory.
pub fn validate_symbol(symbol: &str) -> Result<String> {
    let normalized = normalize_symbol(symbol);
    let valid = !normalized.is_empty()
        && !normalized.contains("..")
        && normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if valid {
        Ok(normalized)
    } else {
        Err(AppError::InvalidInput(format!("Invalid symbol '{}'", symbol.trim())))
    }
}

/// Path of the per-symbol CSV inside `data_dir`
pub fn symbol_csv_path(data_dir: &Path, symbol: &str) -> Result<PathBuf> {
    Ok(data_dir.join(format!("{}.csv", validate_symbol(symbol)?)))
}

/// Format a calendar date as YYYY-MM-DD
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Round to two decimals, the precision used by every percent field
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map NaN/Inf to None so the value serializes as JSON null
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Largest magnitude below which every whole f64 is an exact integer
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Serialize a count-like value (volume, turnover, OBV) as a JSON integer
/// when it is whole, as a float otherwise, and as null when not finite
pub fn serialize_whole<S>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match finite(*value) {
        Some(v) if v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER => serializer.serialize_i64(v as i64),
        Some(v) => serializer.serialize_f64(v),
        None => serializer.serialize_none(),
    }
}

/// `serialize_whole` for a present-but-nullable column
pub fn serialize_whole_column<S>(
    value: &Option<Option<f64>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serialize_whole(&value.flatten(), serializer)
}

/// `serialize_whole` applied to every element of an array
pub fn serialize_whole_vec<S>(values: &[Option<f64>], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    struct Whole(Option<f64>);

    impl serde::Serialize for Whole {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            serialize_whole(&self.0, serializer)
        }
    }

    serializer.collect_seq(values.iter().map(|v| Whole(*v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" nabil "), "NABIL");
        assert_eq!(symbol_csv_path(Path::new("data"), "adbl").unwrap(), PathBuf::from("data/ADBL.csv"));
    }

    #[test]
    fn test_validate_symbol() {
        assert_eq!(validate_symbol(" nabil ").unwrap(), "NABIL");
        assert_eq!(validate_symbol("NIFRA-PO").unwrap(), "NIFRA-PO");
        assert_eq!(validate_symbol("nica_b.1").unwrap(), "NICA_B.1");

        for bad in ["", "   ", "../secret", "..", "a/b", "a\\b", "/etc/passwd", "AB..CD", "NAB IL", "ÄDBL"] {
            assert!(
                matches!(validate_symbol(bad), Err(AppError::InvalidInput(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[derive(serde::Serialize)]
    struct Counts {
        #[serde(serialize_with = "serialize_whole")]
        volume: Option<f64>,
        #[serde(serialize_with = "serialize_whole_vec")]
        obv: Vec<Option<f64>>,
    }

    #[test]
    fn test_whole_counts_serialize_as_integers() {
        let counts = Counts {
            volume: Some(1000.0),
            obv: vec![None, Some(-2500.0), Some(12.5), Some(f64::NAN), Some(1e300)],
        };

        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"volume":1000,"obv":[null,-2500,12.5,null,1e300]}"#);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(5.8823529), 5.88);
        assert_eq!(round2(-5.8863), -5.89);
        assert_eq!(round2(10.0), 10.0);
    }

    #[test]
    fn test_finite() {
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(Some(f64::INFINITY)), None);
        assert_eq!(finite(Some(1.5)), Some(1.5));
        assert_eq!(finite(None), None);
    }
}
