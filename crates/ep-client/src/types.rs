//! Wire types for the prediction service.

use ep_features::{FeatureOrder, FeatureVector};
use serde::{Deserialize, Serialize};

/// `GET /predict/models`: model key to display label, in service order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: serde_json::Map<String, serde_json::Value>,
}

impl ModelsResponse {
    /// `(key, label)` pairs. Non-string labels are rendered as JSON text.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.models
            .iter()
            .map(|(key, label)| {
                let label = match label {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), label)
            })
            .collect()
    }
}

/// `GET /predict/feature_order` answers either `{"feature_order": [...]}`
/// or a bare array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FeatureOrderResponse {
    Wrapped { feature_order: FeatureOrder },
    Bare(FeatureOrder),
}

impl FeatureOrderResponse {
    pub fn into_order(self) -> FeatureOrder {
        match self {
            FeatureOrderResponse::Wrapped { feature_order } => feature_order,
            FeatureOrderResponse::Bare(order) => order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictRequest {
    pub house_id: String,
    pub model: String,
    pub features: FeatureVector,
    pub meta: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionResponse {
    pub predicted_value_kwh: f64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub house_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub features: Vec<f64>,
}

/// Filters accepted by `GET /predict/history`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
    pub model: Option<String>,
}

/// One stored prediction as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryRecord {
    #[serde(default, alias = "predicted_kwh")]
    pub predicted_value_kwh: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub house_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub features: Vec<f64>,
    /// Household aggregates stored next to predictions.
    #[serde(default)]
    pub total_consumption_kwh: Option<f64>,
    #[serde(default)]
    pub estimated_kwh: Option<f64>,
    #[serde(
        default,
        alias = "appliances",
        alias = "breakdown",
        alias = "appliance_breakdown"
    )]
    pub appliance_usage: Option<serde_json::Map<String, serde_json::Value>>,
}

impl HistoryRecord {
    /// Energy value charted for this record: the prediction, else any
    /// household aggregate, else `0`.
    pub fn energy_kwh(&self) -> f64 {
        self.predicted_value_kwh
            .or(self.total_consumption_kwh)
            .or(self.estimated_kwh)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

/// `GET /predict/history` answers either `{"history": [...]}` or a bare array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HistoryResponse {
    Wrapped { history: Vec<HistoryRecord> },
    Bare(Vec<HistoryRecord>),
}

impl HistoryResponse {
    pub fn into_records(self) -> Vec<HistoryRecord> {
        match self {
            HistoryResponse::Wrapped { history } => history,
            HistoryResponse::Bare(records) => records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseholdRequest {
    pub house_id: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Appliance name to daily usage hours (hours × quantity).
    pub appliance_usage: serde_json::Map<String, serde_json::Value>,
    pub total_consumption_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HouseholdResponse {
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarRequest {
    pub daily_kwh: f64,
    pub sun_hours: f64,
    pub panel_watt: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarResponse {
    pub panels_required: u32,
    pub estimated_daily_generation_kwh: f64,
    pub panel_daily_wh: f64,
    pub daily_kwh: f64,
    pub sun_hours: f64,
    pub panel_watt: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_order_accepts_both_shapes() {
        let wrapped: FeatureOrderResponse =
            serde_json::from_str(r#"{"feature_order":["Fan","NetBill"]}"#).unwrap();
        let bare: FeatureOrderResponse = serde_json::from_str(r#"["Fan","NetBill"]"#).unwrap();
        assert_eq!(wrapped.into_order(), bare.into_order());
    }

    #[test]
    fn models_keep_service_order() {
        let resp: ModelsResponse = serde_json::from_str(
            r#"{"models":{"rf":"Random Forest","linear":"Linear Regression","xgb":"XGBoost Regressor"}}"#,
        )
        .unwrap();
        let keys: Vec<String> = resp.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["rf", "linear", "xgb"]);
    }

    #[test]
    fn history_record_tolerates_extra_and_missing_fields() {
        let resp: HistoryResponse = serde_json::from_str(
            r#"{"history":[{"_id":"abc","predicted_value_kwh":12.5,"model":"xgb","meta":{}},{}]}"#,
        )
        .unwrap();
        let records = resp.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].predicted_value_kwh, Some(12.5));
        assert_eq!(records[1].model, None);
        assert_eq!(records[1].energy_kwh(), 0.0);
    }

    #[test]
    fn energy_falls_back_to_household_total() {
        let record: HistoryRecord = serde_json::from_str(
            r#"{"house_id":"h1","total_consumption_kwh":90.5,"appliances":{"Fan":8}}"#,
        )
        .unwrap();
        assert_eq!(record.energy_kwh(), 90.5);
        assert!(record.appliance_usage.is_some());
    }

    #[test]
    fn solar_request_omits_default_efficiency() {
        let req = SolarRequest {
            daily_kwh: 10.0,
            sun_hours: 5.0,
            panel_watt: 400.0,
            efficiency: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("efficiency").is_none());
    }
}
