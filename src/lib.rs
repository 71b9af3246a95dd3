//! CSV-backed stock chart pipeline and API
//!
//! Loader → Cleaner → Indicator Engine → Projector for per-symbol charts,
//! plus the price history transform, the cached top gainers/losers board
//! and the auxiliary datasets (NEPSE index, announcements, predictions,
//! company directory).

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;

pub use error::{AppError, Error, Result};
