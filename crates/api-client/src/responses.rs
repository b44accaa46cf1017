//! Raw response shapes of the Yahoo Finance endpoints and their conversion
//! into `core-types` structures.

use crate::error::ApiError;
use chrono::{DateTime, NaiveDate};
use core_types::{DailyClose, Statement};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};

// --- Chart endpoint (`/v8/finance/chart/{symbol}`) ---

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Seconds east of UTC for the listing exchange.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Option<Vec<AdjCloseBlock>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Error object shared by the chart and quoteSummary endpoints.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub description: String,
}

/// Parses a chart response into daily closes, dated in the exchange's local time.
///
/// Split- and dividend-adjusted closes are preferred when the response carries
/// them. Bars without a close are skipped.
pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<DailyClose>, ApiError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if let Some(error) = envelope.chart.error {
        return Err(ApiError::Provider {
            symbol: symbol.to_string(),
            message: format!("{}: {}", error.code, error.description),
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ApiError::NoData(symbol.to_string()))?;

    // A listing with no trades in the requested range has no timestamps at all.
    let timestamps = result.timestamp.unwrap_or_default();
    let adjusted = result
        .indicators
        .adjclose
        .and_then(|blocks| blocks.into_iter().next())
        .map(|block| block.adjclose)
        .filter(|closes| closes.len() == timestamps.len());
    let closes = match adjusted {
        Some(closes) => closes,
        None => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let mut daily = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close else { continue };
        let local = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
            .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {ts}")))?;
        daily.push(DailyClose {
            date: local.date_naive(),
            close,
        });
    }

    Ok(daily)
}

// --- Fundamentals timeseries (`/ws/fundamentals-timeseries/...`) ---

/// Parses an annual fundamentals-timeseries response into a statement.
///
/// Line items follow the order of `keys` (each without the `annual` prefix);
/// items with no reported value are left out. Period-end dates are ordered
/// newest first.
pub fn parse_timeseries(symbol: &str, body: &str, keys: &[&str]) -> Result<Statement, ApiError> {
    let root: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    let timeseries = root
        .get("timeseries")
        .ok_or_else(|| ApiError::Deserialization("missing 'timeseries' object".to_string()))?;

    if let Some(error) = timeseries.get("error").filter(|e| !e.is_null()) {
        return Err(ApiError::Provider {
            symbol: symbol.to_string(),
            message: error_message(error),
        });
    }

    let mut reported: HashMap<String, Vec<(NaiveDate, f64)>> = HashMap::new();
    let results = timeseries
        .get("result")
        .and_then(Value::as_array)
        .map(|a| a.as_slice())
        .unwrap_or_default();

    for series in results {
        let Some(series_type) = series
            .pointer("/meta/type/0")
            .and_then(Value::as_str)
        else {
            continue;
        };
        let Some(entries) = series.get(series_type).and_then(Value::as_array) else {
            continue;
        };
        let item = series_type.strip_prefix("annual").unwrap_or(series_type);

        for entry in entries.iter().filter(|e| !e.is_null()) {
            let as_of = entry
                .get("asOfDate")
                .and_then(Value::as_str)
                .ok_or_else(|| ApiError::InvalidData(format!("{series_type}: missing asOfDate")))?;
            let date = NaiveDate::parse_from_str(as_of, "%Y-%m-%d")
                .map_err(|e| ApiError::InvalidData(format!("{series_type}: {as_of}: {e}")))?;
            if let Some(value) = entry.pointer("/reportedValue/raw").and_then(Value::as_f64) {
                reported.entry(item.to_string()).or_default().push((date, value));
            }
        }
    }

    let periods: BTreeSet<NaiveDate> = reported
        .values()
        .flat_map(|points| points.iter().map(|(date, _)| *date))
        .collect();
    let period_ends: Vec<NaiveDate> = periods.into_iter().rev().collect();

    let mut statement = Statement {
        line_items: Vec::new(),
        period_ends,
        values: Vec::new(),
    };
    for key in keys {
        let Some(points) = reported.get(*key) else { continue };
        let row = statement
            .period_ends
            .iter()
            .map(|period| points.iter().find(|(d, _)| d == period).map(|(_, v)| *v))
            .collect();
        statement.line_items.push((*key).to_string());
        statement.values.push(row);
    }

    Ok(statement)
}

// --- quoteSummary (`/v10/finance/quoteSummary/{symbol}`) ---

/// Parses a quoteSummary response into a flat list of `(key, value)` pairs.
///
/// Every module's fields are merged into one list; the first module that
/// defines a key wins. Formatted numbers (`{"raw": .., "fmt": ..}`) are reduced
/// to their raw value and empty objects to `null`.
pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<Vec<(String, Value)>, ApiError> {
    let root: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    let summary = root
        .get("quoteSummary")
        .ok_or_else(|| ApiError::Deserialization("missing 'quoteSummary' object".to_string()))?;

    if let Some(error) = summary.get("error").filter(|e| !e.is_null()) {
        return Err(ApiError::Provider {
            symbol: symbol.to_string(),
            message: error_message(error),
        });
    }

    let modules = summary
        .pointer("/result/0")
        .and_then(Value::as_object)
        .ok_or_else(|| ApiError::NoData(symbol.to_string()))?;

    let mut seen = HashSet::new();
    let mut info = Vec::new();
    for module in modules.values().filter_map(Value::as_object) {
        for (key, value) in module {
            if key == "maxAge" || !seen.insert(key.clone()) {
                continue;
            }
            info.push((key.clone(), flatten_value(value)));
        }
    }

    Ok(info)
}

fn flatten_value(value: &Value) -> Value {
    match value {
        Value::Object(map) if map.is_empty() => Value::Null,
        Value::Object(map) => match (map.get("raw"), map.get("fmt")) {
            (Some(raw), _) => raw.clone(),
            (None, Some(fmt)) => fmt.clone(),
            _ => Value::Object(Map::clone(map)),
        },
        other => other.clone(),
    }
}

fn error_message(error: &Value) -> String {
    match serde_json::from_value::<ErrorBody>(error.clone()) {
        Ok(body) => format!("{}: {}", body.code, body.description),
        Err(_) => error.to_string(),
    }
}
