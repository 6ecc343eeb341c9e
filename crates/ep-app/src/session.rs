//! Session lifecycle: the model catalog and feature order a set of
//! predictions runs against.

use ep_client::{ModelsResponse, PredictClient};
use ep_core::catalog::{DEFAULT_MODELS, EMPTY_CATALOG_MODEL};
use ep_features::FeatureOrder;
use ep_form::FormState;
use ep_store::LocalStore;

/// Where a piece of session configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Service,
    /// The service was unreachable or rejected the request.
    Builtin,
}

/// Models offered for prediction, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCatalog {
    entries: Vec<(String, String)>,
}

impl ModelCatalog {
    pub fn builtin() -> Self {
        Self::from_pairs(&DEFAULT_MODELS)
    }

    /// Catalog from a service listing. An empty listing still offers one
    /// model so a prediction can be attempted.
    pub fn from_response(resp: &ModelsResponse) -> Self {
        let entries = resp.entries();
        if entries.is_empty() {
            return Self::from_pairs(&[EMPTY_CATALOG_MODEL]);
        }
        Self { entries }
    }

    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(key, label)| (key.to_string(), label.to_string()))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// First model of the catalog.
    pub fn default_model(&self) -> &str {
        self.entries
            .first()
            .map(|(key, _)| key.as_str())
            .unwrap_or(EMPTY_CATALOG_MODEL.0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, label)| label.as_str())
    }
}

/// Explicit replacement for page-level globals: owns the client, the local
/// store and the configuration fetched at start.
#[derive(Debug)]
pub struct Session {
    client: PredictClient,
    store: LocalStore,
    models: ModelCatalog,
    feature_order: FeatureOrder,
    models_source: ConfigSource,
    order_source: ConfigSource,
}

impl Session {
    /// Fetch the model list and feature order concurrently. Failures fall
    /// back to the built-in catalog and order; starting never fails.
    pub async fn start(client: PredictClient, store: LocalStore) -> Self {
        let (models, order) = tokio::join!(client.models(), client.feature_order());

        let (models, models_source) = match models {
            Ok(resp) => (ModelCatalog::from_response(&resp), ConfigSource::Service),
            Err(err) => {
                tracing::warn!(error = %err, "model list unavailable, using built-in list");
                (ModelCatalog::builtin(), ConfigSource::Builtin)
            }
        };

        let (feature_order, order_source) = match order {
            Ok(order) => (order, ConfigSource::Service),
            Err(err) => {
                tracing::warn!(error = %err, "feature order unavailable, using built-in order");
                (FeatureOrder::builtin(), ConfigSource::Builtin)
            }
        };

        tracing::debug!(
            models = models.entries().len(),
            features = feature_order.len(),
            "session started"
        );

        Self {
            client,
            store,
            models,
            feature_order,
            models_source,
            order_source,
        }
    }

    /// Session over an already known configuration; nothing is fetched.
    pub fn with_config(
        client: PredictClient,
        store: LocalStore,
        models: ModelCatalog,
        feature_order: FeatureOrder,
    ) -> Self {
        Self {
            client,
            store,
            models,
            feature_order,
            models_source: ConfigSource::Service,
            order_source: ConfigSource::Service,
        }
    }

    pub fn client(&self) -> &PredictClient {
        &self.client
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn models(&self) -> &ModelCatalog {
        &self.models
    }

    pub fn feature_order(&self) -> &FeatureOrder {
        &self.feature_order
    }

    pub fn models_source(&self) -> ConfigSource {
        self.models_source
    }

    pub fn order_source(&self) -> ConfigSource {
        self.order_source
    }

    /// Blank form declaring an input for every feature of the session order.
    pub fn blank_form(&self) -> FormState {
        self.feature_order.blank_form()
    }

    /// End the session, releasing the client and store handles.
    pub fn end(self) {
        tracing::debug!("session ended");
    }
}
