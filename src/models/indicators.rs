//! Technical indicators and calculations for stock data
//!
//! # Warm-up Convention
//! Rolling indicators return `None` until a **full** window is available;
//! values are never zero-filled or extrapolated. EMA-family indicators are
//! defined from the first row (seeded with the first value) but are
//! unstable for roughly one span.
//!
//! All functions take series ordered oldest → newest.

/// Calculate Simple Moving Average for a given period
///
/// # Arguments
/// * `values` - Slice of values (usually closing prices)
/// * `period` - Window length (e.g., 20, 50)
///
/// # Returns
/// * Vector aligned with `values`; the first `period - 1` entries are `None`
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut ma_values = vec![None; values.len()];

    if period == 0 || values.len() < period {
        return ma_values;
    }

    for i in (period - 1)..values.len() {
        let start_idx = i + 1 - period;
        let sum: f64 = values[start_idx..=i].iter().sum();
        ma_values[i] = Some(sum / period as f64);
    }

    ma_values
}

/// Calculate Exponential Moving Average with span-based smoothing
///
/// `alpha = 2 / (span + 1)`, seeded with the first value and no warm-up gap:
/// `ema[0] = x[0]`, `ema[t] = alpha * x[t] + (1 - alpha) * ema[t - 1]`.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return result;
    };

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = first;
    result.push(first);

    for &value in &values[1..] {
        let ema = alpha * value + (1.0 - alpha) * prev;
        result.push(ema);
        prev = ema;
    }

    result
}

/// Calculate trailing sample standard deviation (n - 1 denominator)
pub fn calculate_rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut std_values = vec![None; values.len()];

    if period < 2 || values.len() < period {
        return std_values;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        std_values[i] = Some(variance.sqrt());
    }

    std_values
}

/// Bollinger Bands aligned with the input series
#[derive(Debug, Clone, Default)]
pub struct BollingerBands {
    pub mid: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands: mid = SMA, upper/lower = mid ± k * sample std
pub fn calculate_bollinger(closes: &[f64], period: usize, std_multiplier: f64) -> BollingerBands {
    let mid = calculate_sma(closes, period);
    let std = calculate_rolling_std(closes, period);

    let (upper, lower) = mid
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + std_multiplier * s), Some(m - std_multiplier * s)),
            _ => (None, None),
        })
        .unzip();

    BollingerBands { mid, upper, lower }
}

/// Convert average gain/loss into an RSI value
///
/// * `loss == 0`, `gain > 0` → 100 (all gains)
/// * `gain == 0`, `loss == 0` → `None` (flat prices, 0/0 is undefined)
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return None;
        }
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    rsi.is_finite().then_some(rsi)
}

/// Calculate RSI using simple trailing means of gains and losses
///
/// Each value at index `i` uses the `period` deltas ending at `i`, so the
/// first defined index is `period` (delta needs the previous close).
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut rsi_values = vec![None; closes.len()];

    if period == 0 || closes.len() <= period {
        return rsi_values;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let period_f = period as f64;

    // deltas[j] is the change into closes[j + 1]
    for i in period..closes.len() {
        let window = &deltas[i - period..i];
        let (sum_gain, sum_loss) = window.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });
        rsi_values[i] = rsi_from_averages(sum_gain / period_f, sum_loss / period_f);
    }

    rsi_values
}

/// MACD line and its signal line
#[derive(Debug, Clone, Default)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// Calculate MACD = EMA(fast) - EMA(slow), signal = EMA(MACD, signal_span)
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> Macd {
    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = calculate_ema(&macd, signal_span);

    Macd { macd, signal }
}

/// Calculate True Range for each bar
///
/// `max(high - low, |high - prev_close|, |low - prev_close|)`; the first bar
/// has no previous close and uses `high - low` alone.
pub fn calculate_true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = highs.len().min(lows.len()).min(closes.len());
    let mut tr = Vec::with_capacity(n);

    for i in 0..n {
        let high_low = highs[i] - lows[i];
        if i == 0 {
            tr.push(high_low);
            continue;
        }
        let prev_close = closes[i - 1];
        let high_pc = (highs[i] - prev_close).abs();
        let low_pc = (lows[i] - prev_close).abs();
        tr.push(high_low.max(high_pc).max(low_pc));
    }

    tr
}

/// Calculate ATR as the trailing simple mean of True Range
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<Option<f64>> {
    calculate_sma(&calculate_true_range(highs, lows, closes), period)
}

/// Calculate On-Balance Volume
///
/// Each bar contributes `+volume` when its close is above the previous close
/// and `-volume` otherwise. The first bar has no previous close, so it counts
/// as a down bar. A bar with missing volume yields `None` and adds nothing to
/// the running total; later bars keep accumulating.
pub fn calculate_obv(closes: &[f64], volumes: &[Option<f64>]) -> Vec<Option<f64>> {
    let n = closes.len().min(volumes.len());
    let mut obv = Vec::with_capacity(n);
    let mut running = 0.0;

    for i in 0..n {
        let is_up = i > 0 && closes[i] > closes[i - 1];
        let sign = if is_up { 1.0 } else { -1.0 };

        match volumes[i].filter(|v| v.is_finite()) {
            Some(volume) => {
                running += sign * volume;
                obv.push(Some(running));
            }
            None => obv.push(None),
        }
    }

    obv
}

/// Percentage change rounded to 2 decimals: `(value - base) / base * 100`
///
/// Returns `None` when either side is missing or `base` is zero.
pub fn calculate_pct_change(value: Option<f64>, base: Option<f64>) -> Option<f64> {
    let (value, base) = (value?, base?);
    if base == 0.0 {
        return None;
    }
    let pct = crate::utils::round2((value - base) / base * 100.0);
    pct.is_finite().then_some(pct)
}
