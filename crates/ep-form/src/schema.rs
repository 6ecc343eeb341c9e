//! Form state definitions.
//!
//! A `FormState` is the typed snapshot a view layer fills in: one raw entry
//! per declared input, a count/power mode per appliance input and the city
//! selector. Entries keep the raw text so blank, non-numeric and numeric
//! input stay distinguishable until a consumer decides how to coerce them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ep_core::catalog::{self, Appliance, City};
use ep_core::{Real, coerce_number, is_blank};
use serde::{Deserialize, Serialize};

use crate::FormError;

/// A raw form entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(Real),
    Text(String),
}

impl FieldValue {
    pub fn blank() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => is_blank(s),
        }
    }

    /// Lenient numeric reading; blank reads as `0`, garbage as `None`.
    pub fn to_number(&self) -> Option<Real> {
        match self {
            FieldValue::Number(v) if v.is_finite() => Some(*v),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => coerce_number(s),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::blank()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<Real> for FieldValue {
    fn from(v: Real) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// How an appliance entry is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplianceMode {
    /// Number of units; converted with the appliance's default wattage.
    #[default]
    Count,
    /// Total power in watts, used as entered.
    Power,
}

impl ApplianceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplianceMode::Count => "count",
            ApplianceMode::Power => "power",
        }
    }
}

impl FromStr for ApplianceMode {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(ApplianceMode::Count),
            "power" => Ok(ApplianceMode::Power),
            other => Err(FormError::InvalidValue {
                field: "mode".to_string(),
                value: other.to_string(),
                reason: "expected 'count' or 'power'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    /// Declared inputs keyed by feature name.
    #[serde(default)]
    pub values: BTreeMap<String, FieldValue>,
    /// Appliance entry modes; appliances without an entry use `Count`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modes: BTreeMap<String, ApplianceMode>,
    /// City selector (`1`..`4`); absent when the order has no city columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_code: Option<FieldValue>,
}

impl FormState {
    /// Declare a blank form for a feature order: one input per non-city
    /// feature, a count mode per appliance and a city selector when any
    /// one-hot city column is present.
    pub fn for_feature_order<S: AsRef<str>>(order: &[S]) -> Self {
        let mut form = FormState::default();
        for name in order {
            let name: &str = name.as_ref();
            if catalog::is_city_column(name) {
                if form.city_code.is_none() {
                    form.city_code = Some(FieldValue::Text(City::A.code().to_string()));
                }
                continue;
            }
            form.values.insert(name.to_string(), FieldValue::blank());
            if Appliance::from_feature_name(name).is_some() {
                form.modes.insert(name.to_string(), ApplianceMode::Count);
            }
        }
        form
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Declared entry, blank or not.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Declared entry holding a non-blank value.
    pub fn filled(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name).filter(|v| !v.is_blank())
    }

    pub fn is_blank(&self, name: &str) -> bool {
        self.filled(name).is_none()
    }

    /// Set (and declare) an entry.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn mode(&self, name: &str) -> ApplianceMode {
        self.modes.get(name).copied().unwrap_or_default()
    }

    pub fn set_mode(&mut self, name: impl Into<String>, mode: ApplianceMode) {
        self.modes.insert(name.into(), mode);
    }

    pub fn set_city_code(&mut self, code: impl Into<FieldValue>) {
        self.city_code = Some(code.into());
    }

    /// Selected city; unset or out-of-range selections read as city A.
    pub fn city(&self) -> City {
        let raw = self.city_code.as_ref().map(|v| v.to_string());
        City::from_selection(raw.as_deref())
    }

    /// Copy non-blank entries, modes and city selection from `other` into
    /// this form. Entries `other` leaves blank are kept.
    pub fn merge_from(&mut self, other: &FormState) {
        for (name, value) in &other.values {
            if !value.is_blank() || !self.values.contains_key(name) {
                self.values.insert(name.clone(), value.clone());
            }
        }
        for (name, mode) in &other.modes {
            self.modes.insert(name.clone(), *mode);
        }
        if other.city_code.is_some() {
            self.city_code = other.city_code.clone();
        }
    }
}
