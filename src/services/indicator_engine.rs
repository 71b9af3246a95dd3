//! Indicator Engine
//!
//! Computes the fixed indicator battery over a cleaned, date-ascending series.
//! Runs over the full series before any truncation so that warm-up windows
//! see all available history.

use crate::constants::{
    ATR_PERIOD, BOLLINGER_PERIOD, BOLLINGER_STD_MULTIPLIER, EMA_PERIOD, MACD_FAST_PERIOD,
    MACD_SIGNAL_PERIOD, MACD_SLOW_PERIOD, RSI_PERIOD, SMA_LONG_PERIOD, SMA_SHORT_PERIOD,
};
use crate::models::indicators::{
    calculate_atr, calculate_bollinger, calculate_ema, calculate_macd, calculate_obv,
    calculate_rsi, calculate_sma,
};
use crate::models::{IndicatorSeries, StockData, TimeSeries};
use crate::utils::finite;

/// Augment every row with SMA20/50, EMA20, Bollinger, RSI14, MACD, ATR14, OBV
pub fn compute_indicators(series: TimeSeries) -> IndicatorSeries {
    let closes: Vec<f64> = series.iter().map(|r| r.close).collect();
    let highs: Vec<f64> = series.iter().map(|r| r.high).collect();
    let lows: Vec<f64> = series.iter().map(|r| r.low).collect();
    let volumes: Vec<Option<f64>> = series.iter().map(|r| r.volume).collect();

    let sma20 = calculate_sma(&closes, SMA_SHORT_PERIOD);
    let sma50 = calculate_sma(&closes, SMA_LONG_PERIOD);
    let ema20 = calculate_ema(&closes, EMA_PERIOD);
    let bands = calculate_bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_STD_MULTIPLIER);
    let rsi14 = calculate_rsi(&closes, RSI_PERIOD);
    let macd = calculate_macd(&closes, MACD_FAST_PERIOD, MACD_SLOW_PERIOD, MACD_SIGNAL_PERIOD);
    let atr14 = calculate_atr(&highs, &lows, &closes, ATR_PERIOD);
    let obv = calculate_obv(&closes, &volumes);

    series
        .into_iter()
        .enumerate()
        .map(|(i, bar)| StockData {
            bar,
            sma20: finite(sma20[i]),
            sma50: finite(sma50[i]),
            ema20: finite(Some(ema20[i])),
            bb_mid: finite(bands.mid[i]),
            bb_upper: finite(bands.upper[i]),
            bb_lower: finite(bands.lower[i]),
            rsi14: finite(rsi14[i]),
            macd: finite(Some(macd.macd[i])),
            macd_signal: finite(Some(macd.signal[i])),
            atr14: finite(atr14[i]),
            obv: finite(obv[i]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ohlcv;
    use chrono::{Duration, NaiveDate};

    fn series(closes: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Ohlcv::with_volume(
                    start + Duration::days(i as i64),
                    c,
                    c + 1.0,
                    c - 1.0,
                    c,
                    Some(1000.0),
                    None,
                )
            })
            .collect()
    }

    #[test]
    fn test_warmups_on_25_row_ramp() {
        let closes: Vec<f64> = (100..125).map(f64::from).collect();
        let rows = compute_indicators(series(&closes));

        assert_eq!(rows.len(), 25);
        assert!(rows[..19].iter().all(|r| r.sma20.is_none() && r.bb_upper.is_none()));
        assert_eq!(rows[19].sma20, Some(109.5));
        assert_eq!(rows[20].sma20, Some(110.5));
        assert_eq!(rows[19].bb_mid, rows[19].sma20);
        assert!(rows.iter().all(|r| r.sma50.is_none()));

        assert!(rows[..14].iter().all(|r| r.rsi14.is_none()));
        assert!(rows[14..].iter().all(|r| r.rsi14 == Some(100.0)));

        assert!(rows[..13].iter().all(|r| r.atr14.is_none()));
        assert!(rows[13].atr14.is_some());

        assert!(rows.iter().all(|r| r.ema20.is_some() && r.macd.is_some() && r.macd_signal.is_some()));
        assert_eq!(rows[0].ema20, Some(100.0));
    }

    #[test]
    fn test_obv_accumulates_over_series() {
        let rows = compute_indicators(series(&[10.0, 11.0, 12.0]));
        let obv: Vec<Option<f64>> = rows.iter().map(|r| r.obv).collect();
        assert_eq!(obv, vec![Some(-1000.0), Some(0.0), Some(1000.0)]);
    }

    #[test]
    fn test_empty_series() {
        assert!(compute_indicators(Vec::new()).is_empty());
    }
}
