//! ep-core: shared foundation for enerpredict.
//!
//! Contains:
//! - catalog (appliance wattages, built-in feature order and model list, field names)
//! - numeric (Real, lenient number coercion, 2-decimal rounding)
//! - units (uom SI types + constructors for power/energy/time)
//! - error (shared error types)

pub mod catalog;
pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use catalog::{Appliance, City};
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
