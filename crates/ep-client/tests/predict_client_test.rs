//! Contract tests for PredictClient against a mock prediction service.

use ep_client::*;
use ep_features::{FeatureOrder, FeatureVector};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> PredictClient {
    let config = ApiConfig::new(&mock_server.uri()).unwrap();
    PredictClient::new(config).unwrap()
}

// ── GET /predict/models ──────────────────────────────────────────────

#[tokio::test]
async fn models_returns_ordered_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/predict/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": {"xgb": "XGBoost Regressor", "linear": "Linear Regression"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let models = test_client(&mock_server).models().await.unwrap();
    assert_eq!(
        models.entries(),
        vec![
            ("xgb".to_string(), "XGBoost Regressor".to_string()),
            ("linear".to_string(), "Linear Regression".to_string()),
        ]
    );
}

// ── GET /predict/feature_order ───────────────────────────────────────

#[tokio::test]
async fn feature_order_unwraps_object_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/predict/feature_order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "feature_order": ["Fan", "City_City_A", "NetBill"]
        })))
        .mount(&mock_server)
        .await;

    let order = test_client(&mock_server).feature_order().await.unwrap();
    assert_eq!(order.names(), ["Fan", "City_City_A", "NetBill"]);
}

#[tokio::test]
async fn feature_order_accepts_bare_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/predict/feature_order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["Fan"])))
        .mount(&mock_server)
        .await;

    let order = test_client(&mock_server).feature_order().await.unwrap();
    assert_eq!(order, FeatureOrder::new(vec!["Fan".to_string()]));
}

#[tokio::test]
async fn feature_order_not_found_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/predict/feature_order"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "detail": "feature_order.json not found"
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).feature_order().await.unwrap_err();
    match err {
        ApiError::Api { status, detail, .. } => {
            assert_eq!(status, 404);
            assert_eq!(detail.as_deref(), Some("feature_order.json not found"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

// ── POST /predict/ ───────────────────────────────────────────────────

fn predict_request() -> PredictRequest {
    let features: FeatureVector = serde_json::from_value(serde_json::json!([210.0, 0.0, 1.0, 500.0])).unwrap();
    PredictRequest {
        house_id: "ui_1700000000000".into(),
        model: "xgb".into(),
        features,
        meta: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn predict_sends_payload_and_parses_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict/"))
        .and(body_json(serde_json::json!({
            "house_id": "ui_1700000000000",
            "model": "xgb",
            "features": [210.0, 0.0, 1.0, 500.0],
            "meta": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "_id": "65f0",
            "house_id": "ui_1700000000000",
            "model": "xgb",
            "predicted_value_kwh": 231.75,
            "features": [210.0, 0.0, 1.0, 500.0],
            "meta": {},
            "timestamp": "2026-10-17T09:30:00"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = test_client(&mock_server)
        .predict(&predict_request())
        .await
        .unwrap();
    assert_eq!(resp.predicted_value_kwh, 231.75);
    assert_eq!(resp.model, "xgb");
    assert_eq!(resp.timestamp.as_deref(), Some("2026-10-17T09:30:00"));
    assert_eq!(resp.features.len(), 4);
}

#[tokio::test]
async fn predict_rejection_surfaces_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "detail": "Model 'xgb' not available. Available: []"
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .predict(&predict_request())
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message("Prediction"),
        "Model 'xgb' not available. Available: []"
    );
}

#[tokio::test]
async fn predict_rejection_without_detail_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .predict(&predict_request())
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Prediction"), "Prediction failed (503)");
}

#[tokio::test]
async fn predict_garbage_body_is_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .predict(&predict_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Deserialization { .. }));
}

// ── GET /predict/history ─────────────────────────────────────────────

#[tokio::test]
async fn history_passes_filters_and_unwraps_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/predict/history"))
        .and(query_param("limit", "5"))
        .and(query_param("model", "rf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "history": [
                {"predicted_value_kwh": 120.0, "model": "rf", "timestamp": "2026-10-02T00:00:00"},
                {"predicted_value_kwh": 110.0, "model": "rf", "timestamp": "2026-10-01T00:00:00"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = HistoryQuery {
        limit: Some(5),
        model: Some("rf".into()),
    };
    let records = test_client(&mock_server).history(&query).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].predicted_value_kwh, Some(120.0));
}

#[tokio::test]
async fn history_accepts_bare_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/predict/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"predicted_value_kwh": 42.0, "date": "2026-09-30", "appliance_usage": {"Fan": 8}}
        ])))
        .mount(&mock_server)
        .await;

    let records = test_client(&mock_server)
        .history(&HistoryQuery::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date.as_deref(), Some("2026-09-30"));
    assert!(records[0].appliance_usage.is_some());
}

// ── POST /household/ and /api/solar/ ─────────────────────────────────

#[tokio::test]
async fn household_returns_inserted_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/household/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "inserted_id": "6612ab"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut usage = serde_json::Map::new();
    usage.insert("Fan".into(), serde_json::json!(24.0));
    let req = HouseholdRequest {
        house_id: "ui_1".into(),
        date: "2026-10-17".into(),
        appliance_usage: usage,
        total_consumption_kwh: 50.4,
    };
    let resp = test_client(&mock_server).submit_household(&req).await.unwrap();
    assert_eq!(resp.inserted_id, "6612ab");
}

#[tokio::test]
async fn solar_round_trips_sizing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/solar/"))
        .and(body_json(serde_json::json!({
            "daily_kwh": 10.0, "sun_hours": 5.0, "panel_watt": 400.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "panels_required": 7,
            "estimated_daily_generation_kwh": 10.5,
            "panel_daily_wh": 1500.0,
            "daily_kwh": 10.0,
            "sun_hours": 5.0,
            "panel_watt": 400.0
        })))
        .mount(&mock_server)
        .await;

    let req = SolarRequest {
        daily_kwh: 10.0,
        sun_hours: 5.0,
        panel_watt: 400.0,
        efficiency: None,
    };
    let resp = test_client(&mock_server).solar(&req).await.unwrap();
    assert_eq!(resp.panels_required, 7);
    assert_eq!(resp.panel_daily_wh, 1500.0);
}

#[tokio::test]
async fn unreachable_service_is_http_error() {
    let config = ApiConfig::new("http://127.0.0.1:9").unwrap();
    let client = PredictClient::new(config).unwrap();
    let err = client.models().await.unwrap_err();
    assert!(matches!(err, ApiError::Http { .. }));
}
