//! Feature-vector error types.

pub type FeatureResult<T> = Result<T, FeatureError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("feature_order missing")]
    ConfigurationMissing,

    #[error("Feature vector length mismatch: expected {expected} got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}
