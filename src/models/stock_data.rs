use super::Ohlcv;
use serde::{Deserialize, Serialize};

/// Stock data with OHLCV and technical indicators (one IndicatorSeries row)
///
/// Every indicator is `None` before its warm-up period completes; EMA/MACD
/// values are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockData {
    /// Validated price bar
    #[serde(flatten)]
    pub bar: Ohlcv,

    // Moving Averages
    /// 20-period simple moving average of close
    pub sma20: Option<f64>,

    /// 50-period simple moving average of close
    pub sma50: Option<f64>,

    /// 20-span exponential moving average of close
    pub ema20: Option<f64>,

    // Bollinger Bands (20, 2σ)
    pub bb_mid: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,

    // Oscillators
    /// 14-period RSI, bounded in [0, 100]
    pub rsi14: Option<f64>,

    /// EMA12 - EMA26
    pub macd: Option<f64>,

    /// EMA9 of MACD
    pub macd_signal: Option<f64>,

    // Volatility / volume flow
    /// 14-period mean of True Range
    pub atr14: Option<f64>,

    /// On-Balance Volume running total
    pub obv: Option<f64>,
}

