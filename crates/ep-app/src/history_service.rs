//! Prediction history: the local cache and the service-side dashboard.

use ep_client::{HistoryQuery, HistoryRecord, PredictClient};
use ep_store::{LocalStore, PredictionRecord};

use crate::error::AppResult;
use crate::query::{self, HistoryRow, SeriesPoint};

pub fn local_history(store: &LocalStore) -> AppResult<Vec<PredictionRecord>> {
    Ok(store.load_history()?)
}

pub fn local_chart(store: &LocalStore) -> AppResult<Vec<SeriesPoint>> {
    Ok(query::local_series(&store.load_history()?))
}

pub fn clear_local_history(store: &LocalStore) -> AppResult<()> {
    store.clear_history()?;
    tracing::info!("local prediction history cleared");
    Ok(())
}

pub async fn remote_history(
    client: &PredictClient,
    query: &HistoryQuery,
) -> AppResult<Vec<HistoryRecord>> {
    Ok(client.history(query).await?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    Service,
    LocalCache,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub source: HistorySource,
    pub rows: Vec<HistoryRow>,
    pub trend: Vec<SeriesPoint>,
    pub breakdown: Vec<(String, f64)>,
}

impl Dashboard {
    pub fn from_records(source: HistorySource, records: &[HistoryRecord]) -> Self {
        Self {
            source,
            rows: query::history_rows(records),
            trend: query::trend_series(records),
            breakdown: query::appliance_breakdown(records),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Service history, or the local cache when the service is unavailable.
pub async fn load_dashboard(client: &PredictClient, store: &LocalStore) -> AppResult<Dashboard> {
    match client.history(&HistoryQuery::default()).await {
        Ok(records) => Ok(Dashboard::from_records(HistorySource::Service, &records)),
        Err(err) => {
            tracing::warn!(error = %err, "history unavailable, using local cache");
            let records: Vec<HistoryRecord> = store
                .load_history()?
                .iter()
                .map(query::from_local)
                .collect();
            Ok(Dashboard::from_records(HistorySource::LocalCache, &records))
        }
    }
}
