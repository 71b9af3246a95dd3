//! Runtime configuration
//!
//! Loaded once at startup from the environment (a `.env` file is honoured
//! when present). CLI flags override individual fields.

use crate::constants::DEFAULT_TOP_MOVERS_TTL_SECS;
use crate::error::{AppError, Result};
use crate::utils::{get_data_dir, get_outputs_dir};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding `<SYMBOL>.csv` files and auxiliary datasets
    pub data_dir: PathBuf,
    /// Directory holding per-symbol prediction outputs
    pub outputs_dir: PathBuf,
    /// Lifetime of the cached top movers board
    pub top_movers_ttl: Duration,
    /// HTTP listen port
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            outputs_dir: PathBuf::from("outputs"),
            top_movers_ttl: Duration::from_secs(DEFAULT_TOP_MOVERS_TTL_SECS),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let top_movers_ttl = match std::env::var("TOP_MOVERS_TTL_SECS") {
            Ok(raw) => Duration::from_secs(parse_env_number("TOP_MOVERS_TTL_SECS", &raw)?),
            Err(_) => Duration::from_secs(DEFAULT_TOP_MOVERS_TTL_SECS),
        };

        let port = match std::env::var("PORT") {
            Ok(raw) => u16::try_from(parse_env_number("PORT", &raw)?)
                .map_err(|_| AppError::Config(format!("PORT out of range: {}", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            data_dir: get_data_dir(),
            outputs_dir: get_outputs_dir(),
            top_movers_ttl,
            port,
        })
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }
}

fn parse_env_number(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| AppError::Config(format!("{} must be a non-negative integer ({}): {}", name, raw, e)))
}
