//! Auxiliary datasets served next to the chart: NEPSE index, announcements,
//! model predictions and the company directory.

use crate::constants::{
    csv_column, ANNOUNCEMENTS_DIR, COMPANY_INFO_FILE, NEPSE_INDEX_PATH, PREDICTION_CSV_FILE,
    PREDICTION_JSON_FILE,
};
use crate::error::{AppError, Result};
use crate::services::csv_parser::{read_csv, RawTable};
use crate::services::csv_validator::{clean_date_value, parse_or_null};
use crate::utils::{format_date, validate_symbol};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// NEPSE index
// ---------------------------------------------------------------------------

/// `{ "data": [ {column: value, ...}, ... ] }`, ascending by date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NepseIndex {
    pub data: Vec<Map<String, Value>>,
}

/// Strict numeric parse for index cells: separators, `%` and spaces are
/// tolerated, anything else keeps the cell as text
fn numeric_cell(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| *c != ',' && *c != '%' && !c.is_whitespace())
        .collect();
    parse_or_null(&stripped)
}

fn cell_value(raw: Option<&str>) -> Value {
    let Some(raw) = raw.map(str::trim) else {
        return Value::Null;
    };
    if raw.is_empty() || raw == "-" {
        return Value::Null;
    }
    match numeric_cell(raw) {
        Some(n) => serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number),
        None => Value::String(raw.to_string()),
    }
}

/// Turn the index table into row objects keyed by the source headers
pub fn index_rows(table: &RawTable) -> Result<Vec<Map<String, Value>>> {
    let date_idx = table.column_index(csv_column::DATE).ok_or_else(|| {
        AppError::MalformedInput("NEPSE index has no Date column".to_string())
    })?;

    let mut dated: Vec<(chrono::NaiveDate, Map<String, Value>)> = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let Some(date) = table.cell(row, date_idx).and_then(clean_date_value) else {
            continue;
        };

        let mut object = Map::new();
        for (col, header) in table.headers.iter().enumerate() {
            let value = if col == date_idx {
                Value::String(format_date(&date))
            } else {
                cell_value(table.cell(row, col))
            };
            object.insert(header.trim().to_string(), value);
        }
        dated.push((date, object));
    }

    dated.sort_by_key(|(date, _)| *date);
    Ok(dated.into_iter().map(|(_, object)| object).collect())
}

/// Load `<data>/nepse/nepse_index.csv`
pub fn load_nepse_index(data_dir: &Path) -> Result<NepseIndex> {
    let path = data_dir.join(NEPSE_INDEX_PATH);
    let table = read_csv(&path)?;
    let data = index_rows(&table)?;

    info!(rows = data.len(), "Loaded NEPSE index");
    Ok(NepseIndex { data })
}

// ---------------------------------------------------------------------------
// Announcements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub date: Option<String>,
    pub headline: Option<String>,
    pub link: Option<String>,
}

/// Announcements for a symbol, in file order
///
/// A symbol without an announcements file has none; that is not an error.
pub fn load_announcements(data_dir: &Path, symbol: &str) -> Result<Vec<Announcement>> {
    let symbol = validate_symbol(symbol)?;
    let path = data_dir.join(ANNOUNCEMENTS_DIR).join(format!("{}.csv", symbol));

    if !path.exists() {
        debug!(symbol = %symbol, "No announcements file");
        return Ok(Vec::new());
    }

    let table = read_csv(&path)?;
    let dates = table.column("date");
    let headlines = table.column("headline");
    let links = table.column("link");

    let text = |col: &Option<Vec<Option<&str>>>, row: usize| -> Option<String> {
        col.as_ref()
            .and_then(|c| c[row])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let announcements: Vec<Announcement> = (0..table.len())
        .map(|i| Announcement {
            date: text(&dates, i).map(|d| match clean_date_value(&d) {
                Some(parsed) => format_date(&parsed),
                None => d,
            }),
            headline: text(&headlines, i),
            link: text(&links, i),
        })
        .collect();

    info!(symbol = %symbol, count = announcements.len(), "Loaded announcements");
    Ok(announcements)
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

/// Summary written by the forecasting job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    #[serde(default)]
    pub next_day_price: Option<f64>,
    #[serde(default)]
    pub movement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: String,
    pub actual: Option<f64>,
    pub predicted: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub symbol: String,
    pub next_day_price: Option<f64>,
    pub movement: Option<String>,
    pub series: Vec<PredictionPoint>,
}

fn prediction_series(table: &RawTable) -> Vec<PredictionPoint> {
    let dates = table.column("date");
    let actual = table.column("actual");
    let predicted = table.column("predicted");

    let number = |col: &Option<Vec<Option<&str>>>, row: usize| {
        col.as_ref().and_then(|c| c[row]).and_then(numeric_cell)
    };

    let mut points: Vec<(chrono::NaiveDate, PredictionPoint)> = (0..table.len())
        .filter_map(|i| {
            let date = dates.as_ref()?.get(i).copied().flatten().and_then(clean_date_value)?;
            Some((
                date,
                PredictionPoint {
                    date: format_date(&date),
                    actual: number(&actual, i),
                    predicted: number(&predicted, i),
                },
            ))
        })
        .collect();

    points.sort_by_key(|(date, _)| *date);
    points.into_iter().map(|(_, p)| p).collect()
}

/// Merge `<outputs>/<SYMBOL>/prediction.json` with its `prediction.csv`
pub fn load_prediction(outputs_dir: &Path, symbol: &str) -> Result<Prediction> {
    let symbol = validate_symbol(symbol)?;
    let dir = outputs_dir.join(&symbol);
    let json_path = dir.join(PREDICTION_JSON_FILE);

    let content = std::fs::read_to_string(&json_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound(format!("Prediction for {} not found", symbol))
        }
        _ => AppError::from(e),
    })?;
    let summary: PredictionSummary = serde_json::from_str(&content)?;

    let csv_path = dir.join(PREDICTION_CSV_FILE);
    let series = if csv_path.exists() {
        prediction_series(&read_csv(&csv_path)?)
    } else {
        debug!(symbol = %symbol, "Prediction has no series file");
        Vec::new()
    };

    Ok(Prediction {
        symbol,
        next_day_price: summary.next_day_price,
        movement: summary.movement,
        series,
    })
}

// ---------------------------------------------------------------------------
// Company directory
// ---------------------------------------------------------------------------

/// Directory entry; fields beyond `symbol` pass through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub symbol: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

fn read_companies(data_dir: &Path) -> Result<Vec<Company>> {
    let path = data_dir.join(COMPANY_INFO_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound("Company info file not found".to_string())
        }
        _ => AppError::from(e),
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// All companies sorted by symbol
///
/// The directory listing degrades to empty when the file is missing or
/// unreadable; only the single-company lookup reports it.
pub fn list_companies(data_dir: &Path) -> Result<Vec<Company>> {
    let mut companies = match read_companies(data_dir) {
        Ok(companies) => companies,
        Err(e) => {
            warn!(error = %e, "Company directory unavailable, listing none");
            return Ok(Vec::new());
        }
    };
    companies.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Ok(companies)
}

/// One company, matched case-insensitively
pub fn find_company(data_dir: &Path, symbol: &str) -> Result<Company> {
    let wanted = symbol.trim();
    read_companies(data_dir)?
        .into_iter()
        .find(|c| c.symbol.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))
}
