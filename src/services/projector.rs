//! Chart Projector
//!
//! Truncates the indicator series to an optional tail window and assembles
//! the chart envelope: a latest-bar snapshot plus positionally aligned
//! arrays for charting. Every float passes through `finite` so NaN/Inf
//! serialize as `null`.

use crate::models::indicators::calculate_pct_change;
use crate::models::{IndicatorSeries, StockData};
use crate::utils::{finite, format_date, serialize_whole, serialize_whole_vec};
use serde::{Deserialize, Serialize};

/// Snapshot of the last returned bar compared with the one before it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestSnapshot {
    pub date: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    #[serde(serialize_with = "serialize_whole")]
    pub volume: Option<f64>,
    #[serde(serialize_with = "serialize_whole")]
    pub turnover: Option<f64>,
    pub prev_close: Option<f64>,
    pub high_change_pct: Option<f64>,
    pub low_change_pct: Option<f64>,
}

/// Parallel arrays, one entry per returned row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartArrays {
    pub dates: Vec<String>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    #[serde(serialize_with = "serialize_whole_vec")]
    pub volume: Vec<Option<f64>>,
    #[serde(serialize_with = "serialize_whole_vec")]
    pub turnover: Vec<Option<f64>>,
    pub sma20: Vec<Option<f64>>,
    pub sma50: Vec<Option<f64>>,
    pub ema20: Vec<Option<f64>>,
    pub bb_mid: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub rsi14: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub atr14: Vec<Option<f64>>,
    #[serde(serialize_with = "serialize_whole_vec")]
    pub obv: Vec<Option<f64>>,
}

impl ChartArrays {
    fn with_capacity(n: usize) -> Self {
        Self {
            dates: Vec::with_capacity(n),
            open: Vec::with_capacity(n),
            high: Vec::with_capacity(n),
            low: Vec::with_capacity(n),
            close: Vec::with_capacity(n),
            volume: Vec::with_capacity(n),
            turnover: Vec::with_capacity(n),
            sma20: Vec::with_capacity(n),
            sma50: Vec::with_capacity(n),
            ema20: Vec::with_capacity(n),
            bb_mid: Vec::with_capacity(n),
            bb_upper: Vec::with_capacity(n),
            bb_lower: Vec::with_capacity(n),
            rsi14: Vec::with_capacity(n),
            macd: Vec::with_capacity(n),
            macd_signal: Vec::with_capacity(n),
            atr14: Vec::with_capacity(n),
            obv: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, row: &StockData) {
        let bar = &row.bar;
        self.dates.push(format_date(&bar.date));
        self.open.push(finite(Some(bar.open)));
        self.high.push(finite(Some(bar.high)));
        self.low.push(finite(Some(bar.low)));
        self.close.push(finite(Some(bar.close)));
        self.volume.push(finite(bar.volume));
        self.turnover.push(finite(bar.turnover));
        self.sma20.push(finite(row.sma20));
        self.sma50.push(finite(row.sma50));
        self.ema20.push(finite(row.ema20));
        self.bb_mid.push(finite(row.bb_mid));
        self.bb_upper.push(finite(row.bb_upper));
        self.bb_lower.push(finite(row.bb_lower));
        self.rsi14.push(finite(row.rsi14));
        self.macd.push(finite(row.macd));
        self.macd_signal.push(finite(row.macd_signal));
        self.atr14.push(finite(row.atr14));
        self.obv.push(finite(row.obv));
    }

    /// Lengths of every array, for alignment checks
    #[cfg(test)]
    pub fn lengths(&self) -> [usize; 18] {
        [
            self.dates.len(),
            self.open.len(),
            self.high.len(),
            self.low.len(),
            self.close.len(),
            self.volume.len(),
            self.turnover.len(),
            self.sma20.len(),
            self.sma50.len(),
            self.ema20.len(),
            self.bb_mid.len(),
            self.bb_upper.len(),
            self.bb_lower.len(),
            self.rsi14.len(),
            self.macd.len(),
            self.macd_signal.len(),
            self.atr14.len(),
            self.obv.len(),
        ]
    }
}

/// Chart endpoint response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResponse {
    pub symbol: String,
    pub latest: LatestSnapshot,
    pub chart: ChartArrays,
}

/// Parse the `limit` query value
///
/// Only a positive integer limits the output; absent, zero, negative or
/// non-numeric input means "no limit".
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let value = raw?.trim().parse::<i64>().ok()?;
    if value > 0 {
        usize::try_from(value).ok()
    } else {
        None
    }
}

/// Keep only the last `limit` rows
pub fn apply_limit(mut series: IndicatorSeries, limit: Option<usize>) -> IndicatorSeries {
    if let Some(limit) = limit {
        if series.len() > limit {
            series.drain(..series.len() - limit);
        }
    }
    series
}

/// Build the latest snapshot from the final two rows of the returned series
pub fn latest_snapshot(series: &[StockData]) -> LatestSnapshot {
    let Some(last) = series.last() else {
        return LatestSnapshot::default();
    };

    let prev_close = series
        .len()
        .checked_sub(2)
        .and_then(|idx| series.get(idx))
        .and_then(|prev| finite(Some(prev.bar.close)));

    let bar = &last.bar;
    let high = finite(Some(bar.high));
    let low = finite(Some(bar.low));

    LatestSnapshot {
        date: Some(format_date(&bar.date)),
        open: finite(Some(bar.open)),
        high,
        low,
        close: finite(Some(bar.close)),
        volume: finite(bar.volume),
        turnover: finite(bar.turnover),
        prev_close,
        high_change_pct: calculate_pct_change(high, prev_close),
        low_change_pct: calculate_pct_change(low, prev_close),
    }
}

/// Truncate and assemble the chart envelope
pub fn project(symbol: &str, series: IndicatorSeries, limit: Option<usize>) -> ChartResponse {
    let series = apply_limit(series, limit);

    let mut chart = ChartArrays::with_capacity(series.len());
    for row in &series {
        chart.push(row);
    }

    ChartResponse {
        symbol: symbol.to_string(),
        latest: latest_snapshot(&series),
        chart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ohlcv;
    use crate::services::indicator_engine::compute_indicators;
    use chrono::{Duration, NaiveDate};

    fn indicator_series(closes: &[f64]) -> IndicatorSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Ohlcv::with_volume(
                    start + Duration::days(i as i64),
                    c,
                    c + 2.0,
                    c - 2.0,
                    c,
                    Some(500.0),
                    Some(c * 500.0),
                )
            })
            .collect();
        compute_indicators(bars)
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(Some("10")), Some(10));
        assert_eq!(parse_limit(Some(" 3 ")), Some(3));
        assert_eq!(parse_limit(Some("0")), None);
        assert_eq!(parse_limit(Some("-5")), None);
        assert_eq!(parse_limit(Some("abc")), None);
        assert_eq!(parse_limit(Some("2.5")), None);
        assert_eq!(parse_limit(Some("")), None);
        assert_eq!(parse_limit(None), None);
    }

    #[test]
    fn test_limit_keeps_tail_of_full_series() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let full = project("ABC", indicator_series(&closes), None);
        let tail = project("ABC", indicator_series(&closes), Some(5));

        assert_eq!(tail.chart.dates.len(), 5);
        assert_eq!(tail.chart.dates[..], full.chart.dates[25..]);
        assert_eq!(tail.chart.sma20[..], full.chart.sma20[25..]);
        // Indicators come from the full history, so the tail is already warmed up
        assert!(tail.chart.sma20.iter().all(Option::is_some));
    }

    #[test]
    fn test_limit_larger_than_series() {
        let out = project("ABC", indicator_series(&[1.0, 2.0, 3.0]), Some(100));
        assert_eq!(out.chart.dates.len(), 3);
    }

    #[test]
    fn test_arrays_are_aligned() {
        let out = project("ABC", indicator_series(&[5.0; 12]), Some(7));
        assert!(out.chart.lengths().iter().all(|&len| len == 7));
    }

    #[test]
    fn test_latest_snapshot_uses_last_two_returned_rows() {
        let out = project("ABC", indicator_series(&[90.0, 100.0, 110.0]), None);
        let latest = &out.latest;

        assert_eq!(latest.date.as_deref(), Some("2024-01-03"));
        assert_eq!(latest.close, Some(110.0));
        assert_eq!(latest.prev_close, Some(100.0));
        assert_eq!(latest.high_change_pct, Some(12.0)); // 112 vs 100
        assert_eq!(latest.low_change_pct, Some(8.0)); // 108 vs 100
        assert_eq!(latest.turnover, Some(55_000.0));
    }

    #[test]
    fn test_single_row_has_no_prev_close() {
        let out = project("ABC", indicator_series(&[90.0, 100.0, 110.0]), Some(1));
        assert_eq!(out.latest.prev_close, None);
        assert_eq!(out.latest.high_change_pct, None);
        assert_eq!(out.latest.low_change_pct, None);
    }

    #[test]
    fn test_zero_prev_close_guarded() {
        let out = project("ABC", indicator_series(&[0.0, 10.0]), None);
        assert_eq!(out.latest.prev_close, Some(0.0));
        assert_eq!(out.latest.high_change_pct, None);
    }

    #[test]
    fn test_json_shape() {
        let out = project("ABC", indicator_series(&[1.0, 2.0]), None);
        let json = serde_json::to_value(&out).unwrap();

        assert_eq!(json["symbol"], "ABC");
        assert!(json["latest"]["prevClose"].is_number());
        assert!(json["latest"].get("highChangePct").is_some());
        assert!(json["chart"]["sma20"][0].is_null());
        assert_eq!(json["chart"]["dates"][1], "2024-01-02");
    }

    #[test]
    fn test_counts_render_without_fraction() {
        let out = project("ABC", indicator_series(&[1.0, 2.0]), None);
        let text = serde_json::to_string(&out).unwrap();

        assert!(text.contains(r#""volume":500,"turnover":1000,"#));
        assert!(text.contains(r#""volume":[500,500]"#));
        assert!(text.contains(r#""turnover":[500,1000]"#));
    }
}
