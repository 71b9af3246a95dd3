use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "nepsechart")]
#[command(about = "NEPSE stock chart data CLI and API server", long_about = None)]
pub struct Cli {
    /// Directory holding <SYMBOL>.csv files
    #[arg(long, global = true, env = "STOCK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Listen port (default: PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print chart data with indicators for a symbol
    Chart {
        symbol: String,
        /// Only the most recent N rows
        #[arg(short, long)]
        limit: Option<String>,
        /// Print the full JSON response
        #[arg(long)]
        json: bool,
    },
    /// Print latest-first price history for a symbol
    History {
        symbol: String,
        /// Rows to print
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,
        /// Print the full JSON response
        #[arg(long)]
        json: bool,
    },
    /// Print top gainers and losers
    Movers {
        /// Print the full JSON response
        #[arg(long)]
        json: bool,
    },
    /// Show data directory status, optionally for one symbol
    Status {
        symbol: Option<String>,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config.with_data_dir(cli.data_dir),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(config.with_port(port)).await;
        }
        Commands::Chart { symbol, limit, json } => {
            commands::chart::run(&config, &symbol, limit.as_deref(), json);
        }
        Commands::History { symbol, rows, json } => {
            commands::history::run(&config, &symbol, rows, json);
        }
        Commands::Movers { json } => {
            commands::movers::run(&config, json);
        }
        Commands::Status { symbol } => {
            commands::status::run(&config, symbol.as_deref());
        }
    }
}
