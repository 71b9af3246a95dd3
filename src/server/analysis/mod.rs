//! Cross-symbol analysis endpoints

pub mod performers;

/// Re-export handlers for easier routing
pub use performers::top_movers_handler;
