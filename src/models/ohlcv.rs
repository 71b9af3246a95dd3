use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Validated OHLCV row (CleanRow)
///
/// Open/High/Low/Close are always finite; volume and turnover may be absent
/// without invalidating the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Trading date (no time component)
    pub date: NaiveDate,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Traded quantity
    pub volume: Option<f64>,

    /// Traded amount
    pub turnover: Option<f64>,
}

impl Ohlcv {
    /// Create a new OHLCV row with volume and turnover
    pub fn with_volume(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<f64>,
        turnover: Option<f64>,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            turnover,
        }
    }
}
