//! Form assembly from files and command-line assignments.

use std::path::{Path, PathBuf};

use ep_features::FeatureOrder;
use ep_form::{ApplianceMode, FieldValue, FormState};

use crate::error::{AppError, AppResult};

/// Everything a caller can supply to fill a form.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    /// YAML or JSON form file.
    pub file: Option<PathBuf>,
    pub values: Vec<(String, String)>,
    pub modes: Vec<(String, ApplianceMode)>,
    pub city: Option<String>,
}

/// Split `NAME=VALUE`. The value may be empty.
pub fn parse_assignment(raw: &str) -> AppResult<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| AppError::InvalidInput(format!("expected NAME=VALUE, got '{raw}'")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput(format!("missing field name in '{raw}'")));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub fn parse_mode_assignment(raw: &str) -> AppResult<(String, ApplianceMode)> {
    let (name, mode) = parse_assignment(raw)?;
    Ok((name, mode.parse()?))
}

/// Blank form for `order`, overlaid with the file, then the assignments.
pub fn prepare_form(order: &FeatureOrder, input: &FormInput) -> AppResult<FormState> {
    let mut form = order.blank_form();

    if let Some(path) = &input.file {
        let loaded = load_form_file(path)?;
        form.merge_from(&loaded);
    }

    for (name, value) in &input.values {
        if !form.is_declared(name) {
            tracing::warn!(field = %name, "field is not part of the feature order");
        }
        form.set(name.clone(), FieldValue::Text(value.clone()));
    }
    for (name, mode) in &input.modes {
        form.set_mode(name.clone(), *mode);
    }
    if let Some(city) = &input.city {
        form.set_city_code(city.as_str());
    }

    Ok(form)
}

fn load_form_file(path: &Path) -> AppResult<FormState> {
    ep_form::load_form(path).map_err(|e| AppError::FormFileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a blank form for `order` to `path` (format chosen by extension).
pub fn write_template(order: &FeatureOrder, path: &Path) -> AppResult<()> {
    ep_form::save_form(path, &order.blank_form())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_split_on_first_equals() {
        assert_eq!(
            parse_assignment("NetBill=1=2").unwrap(),
            ("NetBill".to_string(), "1=2".to_string())
        );
        assert_eq!(
            parse_assignment("Fan=").unwrap(),
            ("Fan".to_string(), String::new())
        );
        assert!(parse_assignment("Fan").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn mode_assignment_parses_mode() {
        let (name, mode) = parse_mode_assignment("Fan=power").unwrap();
        assert_eq!(name, "Fan");
        assert_eq!(mode, ApplianceMode::Power);
        assert!(parse_mode_assignment("Fan=watts").is_err());
    }

    #[test]
    fn assignments_overlay_blank_form() {
        let order = FeatureOrder::new(vec!["Fan".into(), "City_City_A".into(), "City_City_B".into()]);
        let input = FormInput {
            values: vec![("Fan".into(), "3".into())],
            modes: vec![("Fan".into(), ApplianceMode::Power)],
            city: Some("2".into()),
            ..Default::default()
        };
        let form = prepare_form(&order, &input).unwrap();
        assert_eq!(form.get("Fan"), Some(&FieldValue::Text("3".into())));
        assert_eq!(form.mode("Fan"), ApplianceMode::Power);
        assert_eq!(form.city().code(), 2);
    }

    #[test]
    fn missing_form_file_names_the_path() {
        let input = FormInput {
            file: Some(PathBuf::from("/nonexistent/enerpredict/form.yaml")),
            ..Default::default()
        };
        let err = prepare_form(&FeatureOrder::builtin(), &input).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/enerpredict/form.yaml"));
    }
}
