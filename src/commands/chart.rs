use crate::config::AppConfig;
use crate::services::{build_chart, parse_limit, ChartResponse};

pub fn run(config: &AppConfig, symbol: &str, limit: Option<&str>, json: bool) {
    let limit = parse_limit(limit);

    let chart = match build_chart(&config.data_dir, symbol, limit) {
        Ok(chart) => chart,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&chart) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize chart: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    print_summary(&chart);
}

fn print_summary(chart: &ChartResponse) {
    let latest = &chart.latest;
    let rows = chart.chart.dates.len();

    println!("📈 {} ({} rows)\n", chart.symbol, rows);
    println!("   Date:       {}", latest.date.as_deref().unwrap_or("N/A"));
    println!("   Close:      {}", fmt(latest.close));
    println!("   Prev close: {}", fmt(latest.prev_close));
    println!("   High:       {} ({}%)", fmt(latest.high), fmt(latest.high_change_pct));
    println!("   Low:        {} ({}%)", fmt(latest.low), fmt(latest.low_change_pct));
    println!("   Volume:     {}", fmt(latest.volume));

    let Some(last) = rows.checked_sub(1) else {
        return;
    };
    let c = &chart.chart;
    println!("\n📊 Indicators on {}", c.dates[last]);
    println!("   SMA20 {}  SMA50 {}  EMA20 {}", fmt(c.sma20[last]), fmt(c.sma50[last]), fmt(c.ema20[last]));
    println!("   BB    {} / {} / {}", fmt(c.bb_lower[last]), fmt(c.bb_mid[last]), fmt(c.bb_upper[last]));
    println!("   RSI14 {}  ATR14 {}", fmt(c.rsi14[last]), fmt(c.atr14[last]));
    println!("   MACD  {}  signal {}", fmt(c.macd[last]), fmt(c.macd_signal[last]));
    println!("   OBV   {}", fmt(c.obv[last]));
}

fn fmt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v))
}
