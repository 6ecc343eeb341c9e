//! Error types for the ep-app service layer.

use std::path::PathBuf;

use ep_form::FormReport;

/// Shown when a submission is aborted by blocking field verdicts.
pub const INVALID_FORM_MESSAGE: &str =
    "Please fix highlighted fields or fill recommended values.";

/// Application error type that wraps errors from the backend crates and
/// provides one error interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}", INVALID_FORM_MESSAGE)]
    InvalidForm { report: FormReport },

    #[error("Form error: {0}")]
    Form(String),

    #[error("Failed to read form file {path}: {message}")]
    FormFileRead { path: PathBuf, message: String },

    #[error("{0}")]
    Features(String),

    #[error("Storage error: {0}")]
    Store(String),

    /// Prediction rejected or unreachable; carries the user-facing message.
    #[error("{0}")]
    Prediction(String),

    #[error("Service error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type for ep-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<ep_core::CoreError> for AppError {
    fn from(err: ep_core::CoreError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<ep_form::FormError> for AppError {
    fn from(err: ep_form::FormError) -> Self {
        AppError::Form(err.to_string())
    }
}

impl From<ep_features::FeatureError> for AppError {
    fn from(err: ep_features::FeatureError) -> Self {
        AppError::Features(err.to_string())
    }
}

impl From<ep_store::StoreError> for AppError {
    fn from(err: ep_store::StoreError) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<ep_client::ApiError> for AppError {
    fn from(err: ep_client::ApiError) -> Self {
        AppError::Api(err.user_message("Request"))
    }
}

impl From<ep_client::ConfigError> for AppError {
    fn from(err: ep_client::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
