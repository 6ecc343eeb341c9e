//! Error types for the prediction service client.

use crate::config::ConfigError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        /// The body's `detail` field, when the body is JSON and carries one.
        detail: Option<String>,
        body: String,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Deserialization {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message shown to the user when `action` fails.
    ///
    /// Service rejections show their `detail`, or `"<action> failed (<status>)"`
    /// when the body has none.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            ApiError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Api { status, .. } => format!("{action} failed ({status})"),
            other => other.to_string(),
        }
    }
}

/// Pull a `detail` string out of an error body.
///
/// FastAPI reports validation failures with a list of objects under
/// `detail`; those are rendered as JSON text.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
