pub mod cache;
pub mod chart;
pub mod csv_parser;
pub mod csv_validator;
pub mod datasets;
pub mod history;
pub mod indicator_engine;
pub mod market_stats;
pub mod projector;
pub mod top_movers;

pub use cache::{Cache, Clock, MemoryCache, SystemClock};
pub use chart::build_chart;
pub use datasets::{
    find_company, list_companies, load_announcements, load_nepse_index, load_prediction,
    Announcement, Company, NepseIndex, Prediction,
};
pub use history::{build_history, HistoryRow};
pub use market_stats::{get_market_stats, get_symbol_info, list_symbols, MarketStats, SymbolInfo};
pub use projector::{parse_limit, ChartResponse};
pub use top_movers::{scan_top_movers, MoverEntry, TopMovers, TopMoversService};
