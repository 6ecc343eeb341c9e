//! Feature orders and feature-name classification.

use ep_core::Appliance;
use ep_core::catalog::{self, DEFAULT_FEATURE_ORDER, fields};
use ep_form::FormState;
use serde::{Deserialize, Serialize};

/// Ordered model feature names. Defines both the length and the positional
/// meaning of every feature vector built for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureOrder(Vec<String>);

impl FeatureOrder {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Order used when the prediction service cannot provide one.
    pub fn builtin() -> Self {
        Self(DEFAULT_FEATURE_ORDER.iter().map(|s| s.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn has_city_columns(&self) -> bool {
        self.iter().any(catalog::is_city_column)
    }

    /// Blank form declaring an input for every feature of this order.
    pub fn blank_form(&self) -> FormState {
        FormState::for_feature_order(&self.0)
    }
}

/// How a feature's value is resolved from the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// One-hot indicator for a city letter.
    CityColumn,
    /// Appliance entry, scaled by default wattage in count mode.
    Appliance(Appliance),
    /// Net bill; computed from grid consumption and tariff when blank.
    NetBill,
    /// Aggregate with alias fields searched when the primary is blank.
    Aggregate(&'static [&'static str]),
    /// Direct numeric entry; unknown names fall here and resolve to 0.
    Plain,
}

impl FeatureKind {
    pub fn classify(name: &str) -> Self {
        if catalog::is_city_column(name) {
            return FeatureKind::CityColumn;
        }
        if let Some(appliance) = Appliance::from_feature_name(name) {
            return FeatureKind::Appliance(appliance);
        }
        if name == fields::NET_BILL {
            return FeatureKind::NetBill;
        }
        if let Some(aliases) = catalog::aliases_for(name) {
            return FeatureKind::Aggregate(aliases);
        }
        FeatureKind::Plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order_has_sixteen_features() {
        let order = FeatureOrder::builtin();
        assert_eq!(order.len(), 16);
        assert!(order.has_city_columns());
        assert_eq!(order.names()[0], "Fan");
    }

    #[test]
    fn classification_follows_priority() {
        assert_eq!(FeatureKind::classify("City_City_C"), FeatureKind::CityColumn);
        assert_eq!(
            FeatureKind::classify("MotorPump"),
            FeatureKind::Appliance(Appliance::MotorPump)
        );
        assert_eq!(FeatureKind::classify("NetBill"), FeatureKind::NetBill);
        assert!(matches!(
            FeatureKind::classify("total_appliance_power"),
            FeatureKind::Aggregate(aliases) if aliases.len() == 2
        ));
        assert_eq!(FeatureKind::classify("TariffRate"), FeatureKind::Plain);
        assert_eq!(FeatureKind::classify("Month_num"), FeatureKind::Plain);
    }

    #[test]
    fn deserializes_from_plain_array() {
        let order: FeatureOrder = serde_json::from_str(r#"["Fan","NetBill"]"#).unwrap();
        assert_eq!(order.len(), 2);
    }
}
