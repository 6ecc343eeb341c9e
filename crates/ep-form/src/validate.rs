//! Per-field validation rules.
//!
//! Verdicts are notes for the person filling the form. Only a non-numeric
//! entry or one below its minimum blocks a submission; a missing required
//! entry and an entry above its maximum are advisory, since blank fields
//! are sent as `0` and unusually high readings may still be real.

use ep_core::Real;
use ep_core::catalog::fields;
use ep_core::units::constants::MAX_MONTHLY_HOURS;

use crate::schema::{FieldValue, FormState};

/// Granularity hint for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStep {
    Int,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub required: bool,
    pub min: Option<Real>,
    pub max: Option<Real>,
    pub step: NumberStep,
}

impl FieldRule {
    const fn optional(min: Real, max: Real, step: NumberStep) -> Self {
        Self {
            required: false,
            min: Some(min),
            max: Some(max),
            step,
        }
    }

    const fn required(min: Real, max: Real, step: NumberStep) -> Self {
        Self {
            required: true,
            min: Some(min),
            max: Some(max),
            step,
        }
    }
}

/// Rule for a feature name; `None` means the field is never checked.
pub fn rule_for(name: &str) -> Option<FieldRule> {
    use NumberStep::{Any, Int};

    let rule = match name {
        fields::MONTHLY_HOURS => FieldRule::required(0.0, MAX_MONTHLY_HOURS, Int),
        fields::TARIFF_RATE => FieldRule::required(0.0, 200.0, Any),
        fields::SOLAR_GENERATION => FieldRule::optional(0.0, 10_000.0, Any),
        fields::GRID_CONSUMPTION => FieldRule::optional(0.0, 20_000.0, Any),
        fields::ENERGY_SOLD => FieldRule::optional(0.0, 20_000.0, Any),
        fields::NET_BILL => FieldRule::optional(0.0, 1e7, Any),
        "Fan" => FieldRule::optional(0.0, 100.0, Int),
        "Refrigerator" => FieldRule::optional(0.0, 50.0, Int),
        "AirConditioner" | "Television" | "Monitor" => FieldRule::optional(0.0, 20.0, Int),
        "MotorPump" => FieldRule::optional(0.0, 10.0, Int),
        _ => return None,
    };
    Some(rule)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldVerdict {
    /// No rule applies, or an optional field was left blank.
    Unchecked,
    Ok,
    /// Required but blank. Advisory: the field is sent as `0`.
    Recommended,
    NotANumber,
    BelowMin { min: Real },
    /// Advisory: the submission proceeds.
    AboveMax { max: Real },
}

impl FieldVerdict {
    pub fn blocks_submission(&self) -> bool {
        matches!(self, FieldVerdict::NotANumber | FieldVerdict::BelowMin { .. })
    }

    /// Whether the note should be shown as an error rather than a hint.
    pub fn is_error(&self) -> bool {
        !matches!(self, FieldVerdict::Unchecked | FieldVerdict::Ok)
    }

    pub fn message(&self) -> Option<String> {
        match self {
            FieldVerdict::Unchecked => None,
            FieldVerdict::Ok => Some("OK".to_string()),
            FieldVerdict::Recommended => {
                Some("This field is recommended (you may leave 0 if unknown).".to_string())
            }
            FieldVerdict::NotANumber => Some("Enter a valid number.".to_string()),
            FieldVerdict::BelowMin { min } => Some(format!("Value must be ≥ {min}")),
            FieldVerdict::AboveMax { max } => Some(format!("Value seems high (max suggested {max})")),
        }
    }
}

pub fn validate_field(name: &str, value: Option<&FieldValue>) -> FieldVerdict {
    let Some(rule) = rule_for(name) else {
        return FieldVerdict::Unchecked;
    };

    let value = value.filter(|v| !v.is_blank());
    let Some(value) = value else {
        return if rule.required {
            FieldVerdict::Recommended
        } else {
            FieldVerdict::Unchecked
        };
    };

    let Some(n) = value.to_number() else {
        return FieldVerdict::NotANumber;
    };

    if let Some(min) = rule.min
        && n < min
    {
        return FieldVerdict::BelowMin { min };
    }
    if let Some(max) = rule.max
        && n > max
    {
        return FieldVerdict::AboveMax { max };
    }
    FieldVerdict::Ok
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldReport {
    pub name: String,
    pub verdict: FieldVerdict,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormReport {
    pub fields: Vec<FieldReport>,
}

impl FormReport {
    pub fn blocking(&self) -> impl Iterator<Item = &FieldReport> {
        self.fields.iter().filter(|f| f.verdict.blocks_submission())
    }

    pub fn is_submittable(&self) -> bool {
        self.blocking().next().is_none()
    }
}

/// Validate every declared input of a form.
pub fn validate_form(form: &FormState) -> FormReport {
    let fields = form
        .values
        .iter()
        .map(|(name, value)| FieldReport {
            name: name.clone(),
            verdict: validate_field(name, Some(value)),
        })
        .collect();
    FormReport { fields }
}
