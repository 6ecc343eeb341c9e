//! ep-features: model feature orders and feature-vector construction.
//!
//! The prediction service declares an ordered list of feature names; the
//! builder turns the current form snapshot into a numeric vector with the
//! same length and positional meaning.

pub mod builder;
pub mod error;
pub mod order;

pub use builder::{FeatureVector, build_feature_vector};
pub use error::{FeatureError, FeatureResult};
pub use order::{FeatureKind, FeatureOrder};
