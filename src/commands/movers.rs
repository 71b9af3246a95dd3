use crate::config::AppConfig;
use crate::services::{scan_top_movers, MoverEntry};

pub fn run(config: &AppConfig, json: bool) {
    println!("🔍 Scanning {} for top movers...\n", config.data_dir.display());

    let movers = match scan_top_movers(&config.data_dir) {
        Ok(movers) => movers,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&movers) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize movers: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if movers.top_gainers.is_empty() {
        println!("⚠️  No symbol files with at least two dated percent-change rows");
        return;
    }

    println!("🟢 Top gainers");
    print_entries(&movers.top_gainers);
    println!("\n🔴 Top losers");
    print_entries(&movers.top_losers);
}

fn print_entries(entries: &[MoverEntry]) {
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "   {}. {:<10} {:>10.2} {:>+9.2} ({:+.2}%)",
            rank + 1,
            entry.symbol,
            entry.close,
            entry.change,
            entry.percent_change
        );
    }
}
