//! CSV Format Constants
//!
//! Column names, indicator windows and file layout shared by the pipeline.
//!
//! ## Per-symbol CSV
//!
//! `<data_dir>/<SYMBOL>.csv` with at least `Date, Open, High, Low, Close`
//! and optionally `Volume, Turnover`. Exported files from the exchange also
//! carry `Symbol` and `Percent Change`, which the top movers scan relies on.

/// Source column names (matched case-insensitively after trimming)
pub mod csv_column {
    pub const DATE: &str = "Date";
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const VOLUME: &str = "Volume";
    pub const TURNOVER: &str = "Turnover";
    pub const SYMBOL: &str = "Symbol";
    pub const PERCENT_CHANGE: &str = "Percent Change";
}

/// Indicator windows
pub const SMA_SHORT_PERIOD: usize = 20;
pub const SMA_LONG_PERIOD: usize = 50;
pub const EMA_PERIOD: usize = 20;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_MULTIPLIER: f64 = 2.0;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;
pub const MACD_SIGNAL_PERIOD: usize = 9;
pub const ATR_PERIOD: usize = 14;

/// Largest CSV the loader reads into memory (64 MiB)
///
/// Daily files for a single symbol are a few hundred KB; anything past this
/// is treated as malformed instead of being buffered.
pub const MAX_CSV_BYTES: u64 = 64 * 1024 * 1024;

/// Number of entries on each side of the top movers board
pub const TOP_MOVERS_COUNT: usize = 5;

/// Cache key for the top movers aggregate
pub const TOP_MOVERS_CACHE_KEY: &str = "top_gainers_losers";

/// Default cache lifetime for top movers (1 hour)
pub const DEFAULT_TOP_MOVERS_TTL_SECS: u64 = 3600;

/// Auxiliary dataset locations (relative to the data dir / outputs dir)
pub const NEPSE_INDEX_PATH: &str = "nepse/nepse_index.csv";
pub const ANNOUNCEMENTS_DIR: &str = "announcements";
pub const COMPANY_INFO_FILE: &str = "company_info.json";
pub const PREDICTION_JSON_FILE: &str = "prediction.json";
pub const PREDICTION_CSV_FILE: &str = "prediction.csv";
