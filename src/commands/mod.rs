pub mod chart;
pub mod history;
pub mod movers;
pub mod serve;
pub mod status;
