//! ep-form: typed form state, field validation and autofill.

pub mod autofill;
pub mod schema;
pub mod validate;

pub use autofill::{AutofillChange, apply_autofill};
pub use schema::*;
pub use validate::{
    FieldReport, FieldRule, FieldVerdict, FormReport, NumberStep, rule_for, validate_field,
    validate_form,
};

use std::path::Path;

pub type FormResult<T> = Result<T, FormError>;

#[derive(thiserror::Error, Debug)]
pub enum FormError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported form file: {path}")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> FormResult<FormState> {
    let content = std::fs::read_to_string(path)?;
    let form: FormState = serde_yaml::from_str(&content)?;
    Ok(form)
}

pub fn save_yaml(path: &Path, form: &FormState) -> FormResult<()> {
    let content = serde_yaml::to_string(form)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> FormResult<FormState> {
    let content = std::fs::read_to_string(path)?;
    let form: FormState = serde_json::from_str(&content)?;
    Ok(form)
}

pub fn save_json(path: &Path, form: &FormState) -> FormResult<()> {
    let content = serde_json::to_string_pretty(form)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a form file, picking the format from its extension.
pub fn load_form(path: &Path) -> FormResult<FormState> {
    match extension(path).as_deref() {
        Some("yaml") | Some("yml") => load_yaml(path),
        Some("json") => load_json(path),
        _ => Err(FormError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Save a form file, picking the format from its extension.
pub fn save_form(path: &Path, form: &FormState) -> FormResult<()> {
    match extension(path).as_deref() {
        Some("yaml") | Some("yml") => save_yaml(path, form),
        Some("json") => save_json(path, form),
        _ => Err(FormError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}
