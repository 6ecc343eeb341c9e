//! Stored data types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// One appliance of the household list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceEntry {
    pub name: String,
    /// Watts per unit.
    #[serde(default)]
    pub power: f64,
    /// Hours used per day.
    #[serde(default)]
    pub hours: f64,
    #[serde(default = "default_qty")]
    pub qty: f64,
}

fn default_qty() -> f64 {
    1.0
}

/// A past prediction, as cached locally or returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(default, alias = "predicted_kwh")]
    pub predicted_value_kwh: f64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub features: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub appliance_usage: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(StoreError::InvalidValue {
                key: "theme".to_string(),
                value: other.to_string(),
            }),
        }
    }
}
