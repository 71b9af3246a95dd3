use crate::config::AppConfig;
use crate::server;
use crate::services;

pub async fn run(config: AppConfig) {
    println!("🚀 Starting nepsechart server on port {}", config.port);
    println!("📁 Data directory:    {}", config.data_dir.display());
    println!("📁 Outputs directory: {}", config.outputs_dir.display());

    let stats = services::get_market_stats(&config.data_dir);
    if stats.has_data {
        println!("✅ Found {} symbol files", stats.total_symbols);
    } else {
        println!("⚠️  No symbol CSVs found in {}", config.data_dir.display());
    }
    if !stats.has_nepse_index {
        println!("⚠️  NEPSE index file missing, /api/nepse/ will return 404");
    }
    println!("⏱️  Top movers cache TTL: {}s", config.top_movers_ttl.as_secs());

    if let Err(e) = server::serve(config).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
