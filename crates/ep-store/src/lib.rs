//! ep-store: local key-value persistence for appliances, prediction history
//! and preferences.

pub mod store;
pub mod types;

pub use store::{HISTORY_LIMIT, LocalStore, keys};
pub use types::*;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },

    #[error("Invalid stored value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
