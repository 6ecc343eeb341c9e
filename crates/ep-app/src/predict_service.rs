//! Prediction submission flow.

use chrono::{DateTime, Utc};
use ep_client::{PredictRequest, PredictionResponse};
use ep_features::{FeatureVector, build_feature_vector};
use ep_form::{AutofillChange, FormReport, FormState, apply_autofill, validate_form};
use ep_store::{LocalStore, PredictionRecord};

use crate::error::{AppError, AppResult};
use crate::session::Session;

/// Predictions at or below this are low usage.
pub const LOW_USAGE_MAX_KWH: f64 = 100.0;
/// Predictions above this are high usage.
pub const HIGH_USAGE_MIN_KWH: f64 = 500.0;

#[derive(Debug, Clone)]
pub struct PredictOptions {
    /// Model key; the session's default model when `None`.
    pub model: Option<String>,
    /// Run the non-forced autofill pass before building the vector.
    pub autofill: bool,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            model: None,
            autofill: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageBand {
    Low,
    Moderate,
    High,
}

impl UsageBand {
    pub fn classify(kwh: f64) -> Self {
        if kwh <= LOW_USAGE_MAX_KWH {
            UsageBand::Low
        } else if kwh > HIGH_USAGE_MIN_KWH {
            UsageBand::High
        } else {
            UsageBand::Moderate
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UsageBand::Low => "low",
            UsageBand::Moderate => "moderate",
            UsageBand::High => "high",
        }
    }
}

/// Result card contents for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSummary {
    pub value_kwh: f64,
    pub model: String,
    pub house_id: String,
    pub band: UsageBand,
    /// Change against the previous local history head, if any.
    pub delta_kwh: Option<f64>,
}

impl PredictionSummary {
    pub fn new(resp: &PredictionResponse, previous_kwh: Option<f64>) -> Self {
        let value_kwh = resp.predicted_value_kwh;
        Self {
            value_kwh,
            model: resp.model.clone(),
            house_id: resp.house_id.clone(),
            band: UsageBand::classify(value_kwh),
            delta_kwh: previous_kwh.map(|last| value_kwh - last),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PredictOutcome {
    pub summary: PredictionSummary,
    pub features: FeatureVector,
    pub autofill: Vec<AutofillChange>,
    pub report: FormReport,
    pub record: PredictionRecord,
    pub history_len: usize,
}

/// `ui_<unix millis>` identifier used for interface-originated requests.
pub fn ui_house_id(now: DateTime<Utc>) -> String {
    format!("ui_{}", now.timestamp_millis())
}

/// Build the vector for the session order, optionally after autofill, and
/// check it lines up with the order.
pub fn prepare_vector(
    session: &Session,
    form: &mut FormState,
    autofill: bool,
) -> AppResult<(FeatureVector, Vec<AutofillChange>)> {
    let changes = if autofill {
        apply_autofill(form, false)
    } else {
        Vec::new()
    };
    let order = session.feature_order();
    let features = build_feature_vector(Some(order), form)?;
    features.ensure_matches(order)?;
    Ok((features, changes))
}

/// Validate, build, submit and record one prediction.
///
/// Validation or transport failures abort the submission before anything
/// is written to the local history.
pub async fn submit_prediction(
    session: &Session,
    form: &mut FormState,
    options: &PredictOptions,
) -> AppResult<PredictOutcome> {
    let report = validate_form(form);
    if !report.is_submittable() {
        return Err(AppError::InvalidForm { report });
    }

    let (features, autofill) = prepare_vector(session, form, options.autofill)?;

    let model = options
        .model
        .clone()
        .unwrap_or_else(|| session.models().default_model().to_string());
    if !session.models().contains(&model) {
        tracing::warn!(model = %model, "model not in catalog, submitting anyway");
    }

    let now = Utc::now();
    let request = PredictRequest {
        house_id: ui_house_id(now),
        model,
        features: features.clone(),
        meta: serde_json::Map::new(),
    };

    let resp = session
        .client()
        .predict(&request)
        .await
        .map_err(|e| AppError::Prediction(e.user_message("Prediction")))?;

    let record = PredictionRecord {
        predicted_value_kwh: resp.predicted_value_kwh,
        model: resp.model.clone(),
        timestamp: resp.timestamp.clone().unwrap_or_else(|| now.to_rfc3339()),
        features: resp.features.clone(),
        house_id: None,
        date: None,
        appliance_usage: Default::default(),
    };
    let (previous, history_len) = record_history(session.store(), record.clone());
    let summary = PredictionSummary::new(&resp, previous);
    tracing::info!(
        value_kwh = summary.value_kwh,
        model = %summary.model,
        history = history_len,
        "prediction recorded"
    );

    Ok(PredictOutcome {
        summary,
        features,
        autofill,
        report,
        record,
        history_len,
    })
}

/// Push `record` onto the local history, returning the previous head value
/// and the new history length.
///
/// Local cache failures never fail a prediction the service already
/// answered: an unreadable history is discarded and replaced, and a failed
/// write reports a length of 0.
fn record_history(store: &LocalStore, record: PredictionRecord) -> (Option<f64>, usize) {
    let previous = match store.load_history() {
        Ok(history) => history.first().map(|r| r.predicted_value_kwh),
        Err(err) => {
            tracing::warn!(error = %err, "local history unreadable, starting a new one");
            if let Err(err) = store.clear_history() {
                tracing::warn!(error = %err, "failed to discard local history");
            }
            None
        }
    };

    match store.push_history(record) {
        Ok(history) => (previous, history.len()),
        Err(err) => {
            tracing::warn!(error = %err, "prediction not saved to local history");
            (previous, 0)
        }
    }
}
