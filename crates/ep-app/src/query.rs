//! Query helpers for charting and summarising prediction history.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ep_client::HistoryRecord;
use ep_core::coerce_number;
use ep_store::PredictionRecord;

/// One chart point.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value_kwh: f64,
}

/// One dashboard table row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub date: String,
    pub house_id: String,
    pub value_kwh: Option<f64>,
}

/// Local history chart: oldest first, labelled by timestamp.
pub fn local_series(history: &[PredictionRecord]) -> Vec<SeriesPoint> {
    history
        .iter()
        .rev()
        .map(|r| SeriesPoint {
            label: r.timestamp.clone(),
            value_kwh: finite_or_zero(r.predicted_value_kwh),
        })
        .collect()
}

/// View a locally cached prediction as a history record.
pub fn from_local(record: &PredictionRecord) -> HistoryRecord {
    let appliance_usage = if record.appliance_usage.is_empty() {
        None
    } else {
        Some(
            record
                .appliance_usage
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                .collect(),
        )
    };
    HistoryRecord {
        predicted_value_kwh: Some(record.predicted_value_kwh),
        model: Some(record.model.clone()),
        house_id: record.house_id.clone(),
        timestamp: Some(record.timestamp.clone()),
        date: record.date.clone(),
        features: record.features.clone(),
        total_consumption_kwh: None,
        estimated_kwh: None,
        appliance_usage,
    }
}

pub fn history_rows(records: &[HistoryRecord]) -> Vec<HistoryRow> {
    records
        .iter()
        .map(|r| HistoryRow {
            date: r.date.clone().unwrap_or_default(),
            house_id: r.house_id.clone().unwrap_or_default(),
            value_kwh: r.predicted_value_kwh.or(r.total_consumption_kwh),
        })
        .collect()
}

/// Trend series sorted by date (or timestamp) ascending. Records without
/// a readable date sort first.
pub fn trend_series(records: &[HistoryRecord]) -> Vec<SeriesPoint> {
    let mut sorted: Vec<&HistoryRecord> = records.iter().collect();
    sorted.sort_by_key(|r| record_instant(r));
    sorted
        .into_iter()
        .map(|r| SeriesPoint {
            label: trend_label(r),
            value_kwh: r.energy_kwh(),
        })
        .collect()
}

/// Total usage per appliance across records, in first-seen order.
pub fn appliance_breakdown(records: &[HistoryRecord]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for usage in records.iter().filter_map(|r| r.appliance_usage.as_ref()) {
        for (name, value) in usage {
            let value = usage_value(value);
            match totals.iter_mut().find(|(n, _)| n == name) {
                Some((_, total)) => *total += value,
                None => totals.push((name.clone(), value)),
            }
        }
    }
    totals
}

fn usage_value(value: &serde_json::Value) -> f64 {
    let v = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => coerce_number(s),
        _ => None,
    };
    finite_or_zero(v.unwrap_or(0.0))
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn record_instant(r: &HistoryRecord) -> Option<NaiveDateTime> {
    non_empty(&r.date)
        .or_else(|| non_empty(&r.timestamp))
        .and_then(parse_instant)
}

fn trend_label(r: &HistoryRecord) -> String {
    if let Some(date) = non_empty(&r.date) {
        return date.to_string();
    }
    non_empty(&r.timestamp)
        .and_then(parse_instant)
        .map(|t| t.date().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// RFC 3339, naive ISO 8601 (as stored by the service) or a bare date.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.naive_utc());
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(t);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
