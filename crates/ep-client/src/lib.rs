//! # ep-client -- Typed client for the energy prediction service
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/predict/models` | Available models |
//! | GET    | `/predict/feature_order` | Model feature order |
//! | POST   | `/predict/` | Run a prediction |
//! | GET    | `/predict/history` | Stored predictions |
//! | POST   | `/household/` | Submit appliance usage aggregate |
//! | POST   | `/api/solar/` | Solar panel sizing |
//!
//! Requests are single attempts: no retry, and no timeout unless one is
//! configured.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use types::*;

use ep_features::FeatureOrder;
use serde::de::DeserializeOwned;

/// Client for the prediction service endpoints.
#[derive(Debug, Clone)]
pub struct PredictClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl PredictClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ApiError::Http {
            endpoint: "client_init".into(),
            source: e,
        })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Calls `GET {base_url}/predict/models`.
    pub async fn models(&self) -> ApiResult<ModelsResponse> {
        let url = self.config.endpoint("predict/models")?;
        self.execute("GET /predict/models", self.http.get(url)).await
    }

    /// Calls `GET {base_url}/predict/feature_order`.
    pub async fn feature_order(&self) -> ApiResult<FeatureOrder> {
        let url = self.config.endpoint("predict/feature_order")?;
        let resp: FeatureOrderResponse = self
            .execute("GET /predict/feature_order", self.http.get(url))
            .await?;
        Ok(resp.into_order())
    }

    /// Calls `POST {base_url}/predict/`.
    pub async fn predict(&self, req: &PredictRequest) -> ApiResult<PredictionResponse> {
        let url = self.config.endpoint("predict/")?;
        self.execute("POST /predict/", self.http.post(url).json(req))
            .await
    }

    /// Calls `GET {base_url}/predict/history`, newest first.
    pub async fn history(&self, query: &HistoryQuery) -> ApiResult<Vec<HistoryRecord>> {
        let mut url = self.config.endpoint("predict/history")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(model) = &query.model {
                pairs.append_pair("model", model);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        let resp: HistoryResponse = self
            .execute("GET /predict/history", self.http.get(url))
            .await?;
        Ok(resp.into_records())
    }

    /// Calls `POST {base_url}/household/`.
    pub async fn submit_household(&self, req: &HouseholdRequest) -> ApiResult<HouseholdResponse> {
        let url = self.config.endpoint("household/")?;
        self.execute("POST /household/", self.http.post(url).json(req))
            .await
    }

    /// Calls `POST {base_url}/api/solar/`.
    pub async fn solar(&self, req: &SolarRequest) -> ApiResult<SolarResponse> {
        let url = self.config.endpoint("api/solar/")?;
        self.execute("POST /api/solar/", self.http.post(url).json(req))
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        tracing::debug!(endpoint, "sending request");

        let resp = request.send().await.map_err(|e| ApiError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
            let detail = error::extract_detail(&body);
            tracing::debug!(endpoint, status, "service rejected request");
            return Err(ApiError::Api {
                endpoint: endpoint.into(),
                status,
                detail,
                body,
            });
        }

        resp.json().await.map_err(|e| ApiError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }
}
