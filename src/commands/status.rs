use crate::config::AppConfig;
use crate::services;

pub fn run(config: &AppConfig, symbol: Option<&str>) {
    println!("📊 Market Data Status\n");

    match show_status(config, symbol) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_status(config: &AppConfig, symbol: Option<&str>) -> crate::error::Result<()> {
    let stats = services::get_market_stats(&config.data_dir);

    println!("📁 Data directory: {}", config.data_dir.display());
    println!("📁 Outputs directory: {}", config.outputs_dir.display());

    if !stats.has_data {
        println!("⚠️  No symbol CSVs found. Expected <SYMBOL>.csv files in the data directory.");
        return Ok(());
    }

    println!("📈 Total Symbols: {}", format_number(stats.total_symbols));
    println!("   NEPSE index:  {}", if stats.has_nepse_index { "✅" } else { "❌" });
    println!("   Company info: {}", if stats.has_company_info { "✅" } else { "❌" });

    let symbols = match symbol {
        Some(symbol) => vec![symbol.to_string()],
        None => services::list_symbols(&config.data_dir).into_iter().take(5).collect(),
    };

    println!("\n═══════════════════════════════════════════════════════════\n");
    for symbol in &symbols {
        if let Err(e) = show_symbol(config, symbol) {
            eprintln!("⚠️  Could not read {}: {}", symbol, e);
        }
    }

    if symbol.is_none() && stats.total_symbols > symbols.len() {
        println!("\n💡 Tip: pass a symbol to inspect one of the other {} files", stats.total_symbols - symbols.len());
    }

    Ok(())
}

fn show_symbol(config: &AppConfig, symbol: &str) -> crate::error::Result<()> {
    let info = services::get_symbol_info(&config.data_dir, symbol)?;

    println!("🔹 {}", info.symbol);
    println!(
        "   Daily: {:>8} clean records of {} ({} → {})",
        format_number(info.record_count),
        format_number(info.raw_rows),
        info.first_date,
        info.last_date
    );
    println!("          Latest close: {:.2}", info.last_close);

    Ok(())
}

fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
