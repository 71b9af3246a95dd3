use crate::config::AppConfig;
use crate::services::history::PercentValue;
use crate::services::{build_history, HistoryRow};

pub fn run(config: &AppConfig, symbol: &str, rows: usize, json: bool) {
    let history = match build_history(&config.data_dir, symbol) {
        Ok(history) => history,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&history) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize history: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("🕒 {} price history ({} of {} rows)\n", symbol.trim().to_uppercase(), rows.min(history.len()), history.len());
    println!("   {:<12} {:>10} {:>10} {:>10}", "Date", "Close", "Change", "Change %");
    for row in history.iter().take(rows) {
        print_row(row);
    }
}

fn print_row(row: &HistoryRow) {
    let number = |v: Option<Option<f64>>| v.flatten().map_or_else(|| "-".to_string(), |n| format!("{:.2}", n));
    let percent = match row.change_percent.clone().flatten() {
        Some(PercentValue::Text(text)) => text,
        Some(PercentValue::Number(n)) => format!("{:.2}%", n),
        None => "-".to_string(),
    };

    println!(
        "   {:<12} {:>10} {:>10} {:>10}",
        row.date.clone().flatten().unwrap_or_else(|| "-".to_string()),
        number(row.close),
        number(row.change),
        percent
    );
}
