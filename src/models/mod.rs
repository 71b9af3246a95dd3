mod ohlcv;
mod stock_data;
pub mod indicators;
pub mod schema;

pub use ohlcv::Ohlcv;
pub use stock_data::StockData;

/// Cleaned, date-ascending series for a single symbol
pub type TimeSeries = Vec<Ohlcv>;

/// Cleaned series augmented with indicators
pub type IndicatorSeries = Vec<StockData>;
