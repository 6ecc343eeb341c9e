//! Shared application service layer for enerpredict.
//!
//! Owns the session lifecycle and the business logic behind every
//! front-end operation: prediction submission, appliance management,
//! solar sizing, history queries and the theme preference.

pub mod appliance_service;
pub mod error;
pub mod form_service;
pub mod history_service;
pub mod predict_service;
pub mod query;
pub mod session;
pub mod solar_service;
pub mod theme_service;

// Re-export key types for convenience
pub use appliance_service::{
    ApplianceAggregates, ApplianceInput, ConsumptionEstimate, ImportOutcome, add_appliance,
    aggregate, estimate_consumption, estimate_stored, import_into_form, list_appliances,
    remove_appliance, send_household,
};
pub use error::{AppError, AppResult, INVALID_FORM_MESSAGE};
pub use form_service::{FormInput, parse_assignment, parse_mode_assignment, prepare_form};
pub use history_service::{
    Dashboard, HistorySource, clear_local_history, load_dashboard, local_chart, local_history,
    remote_history,
};
pub use predict_service::{
    PredictOptions, PredictOutcome, PredictionSummary, UsageBand, prepare_vector,
    submit_prediction,
};
pub use query::{HistoryRow, SeriesPoint};
pub use session::{ConfigSource, ModelCatalog, Session};
pub use solar_service::{SolarInput, SolarSizing, size_locally, size_remotely};
pub use theme_service::{current_theme, set_theme, toggle_theme};
