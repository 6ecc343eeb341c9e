//! Feature-vector construction.
//!
//! Every feature resolves independently and in order. Missing or
//! unparsable input never fails the build: it resolves to `0`, so a
//! submission is never blocked on optional input. Products that overflow
//! also resolve to `0`, keeping every position finite. The only failure is
//! an absent feature order.

use ep_core::catalog::{self, City, fields};
use ep_core::{Appliance, Real, finite_or_zero, round2};
use ep_form::{ApplianceMode, FieldValue, FormState};
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::order::{FeatureKind, FeatureOrder};

/// Numeric model input, positionally aligned with its `FeatureOrder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<Real>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Real] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Real> {
        self.0
    }

    /// Pair each value with its feature name.
    pub fn labelled<'a>(&'a self, order: &'a FeatureOrder) -> Vec<(&'a str, Real)> {
        order.iter().zip(self.0.iter().copied()).collect()
    }

    /// Check the vector still lines up with `order`.
    pub fn ensure_matches(&self, order: &FeatureOrder) -> FeatureResult<()> {
        if self.len() != order.len() {
            return Err(FeatureError::LengthMismatch {
                expected: order.len(),
                actual: self.len(),
            });
        }
        Ok(())
    }
}

pub fn build_feature_vector(
    order: Option<&FeatureOrder>,
    form: &FormState,
) -> FeatureResult<FeatureVector> {
    let order = order.ok_or(FeatureError::ConfigurationMissing)?;
    let city = form.city();

    let values = order
        .iter()
        .map(|name| finite_or_zero(resolve_feature(name, form, city)))
        .collect();

    Ok(FeatureVector(values))
}

fn resolve_feature(name: &str, form: &FormState, city: City) -> Real {
    match FeatureKind::classify(name) {
        FeatureKind::CityColumn => {
            if catalog::city_column_suffix(name) == city.letter() {
                1.0
            } else {
                0.0
            }
        }
        FeatureKind::Appliance(appliance) => appliance_power(form, appliance),
        FeatureKind::NetBill => net_bill(form),
        FeatureKind::Aggregate(aliases) => direct_entry(form, name)
            .or_else(|| aliases.iter().find_map(|alias| direct_entry(form, alias)))
            .unwrap_or(0.0),
        FeatureKind::Plain => direct_entry(form, name).unwrap_or(0.0),
    }
}

/// Non-blank entry read leniently; `None` only when the entry is blank.
fn direct_entry(form: &FormState, name: &str) -> Option<Real> {
    form.filled(name)
        .map(|v| v.to_number().unwrap_or(0.0))
}

/// Blank entries read as `0` as well.
fn number_or_zero(form: &FormState, name: &str) -> Real {
    form.get(name).and_then(FieldValue::to_number).unwrap_or(0.0)
}

fn appliance_power(form: &FormState, appliance: Appliance) -> Real {
    let name = appliance.feature_name();
    let Some(value) = form.filled(name).and_then(FieldValue::to_number) else {
        return 0.0;
    };
    match form.mode(name) {
        ApplianceMode::Count => round2(value * appliance.default_watts()),
        ApplianceMode::Power => value,
    }
}

fn net_bill(form: &FormState) -> Real {
    if let Some(bill) = direct_entry(form, fields::NET_BILL) {
        return bill;
    }
    let grid = number_or_zero(form, fields::GRID_CONSUMPTION);
    let tariff = number_or_zero(form, fields::TARIFF_RATE);
    round2(grid * tariff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(names: &[&str]) -> FeatureOrder {
        FeatureOrder::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn missing_order_is_configuration_error() {
        let err = build_feature_vector(None, &FormState::default()).unwrap_err();
        assert_eq!(err, FeatureError::ConfigurationMissing);
    }

    #[test]
    fn appliance_count_mode_scales_by_default_watts() {
        let order = order(&["Fan", "AirConditioner"]);
        let mut form = order.blank_form();
        form.set("Fan", "3");
        form.set("AirConditioner", 1.5);
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[210.0, 1800.0]);
    }

    #[test]
    fn appliance_power_mode_passes_value_through() {
        let order = order(&["Television"]);
        let mut form = order.blank_form();
        form.set("Television", 140.25);
        form.set_mode("Television", ApplianceMode::Power);
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[140.25]);
    }

    #[test]
    fn bad_appliance_entry_is_zero() {
        let order = order(&["Fan", "Monitor"]);
        let mut form = order.blank_form();
        form.set("Fan", "three");
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn direct_net_bill_wins_over_computed() {
        let order = order(&["NetBill"]);
        let mut form = FormState::default();
        form.set("NetBill", "750");
        form.set("GridConsumption_kWh", 100.0);
        form.set("TariffRate", 5.0);
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[750.0]);
    }

    #[test]
    fn net_bill_computed_with_missing_operands_as_zero() {
        let order = order(&["NetBill"]);
        let mut form = FormState::default();
        form.set("GridConsumption_kWh", 12.5);
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[0.0]);

        form.set("TariffRate", 3.0);
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[37.5]);
    }

    #[test]
    fn non_numeric_direct_entry_is_zero() {
        let order = order(&["TariffRate", "Month_num"]);
        let mut form = FormState::default();
        form.set("TariffRate", "cheap");
        form.set("Month_num", "7");
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[0.0, 7.0]);
    }

    #[test]
    fn aggregate_falls_back_to_alias() {
        let order = order(&["total_appliance_power", "appliance_count"]);
        let mut form = FormState::default();
        form.set("TotalAppliancePower", "1250.5");
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[1250.5, 0.0]);
    }

    #[test]
    fn overflowing_entries_degrade_to_zero() {
        let order = order(&["Fan", "Refrigerator", "NetBill"]);
        let mut form = order.blank_form();
        form.set("Fan", "1e306");
        form.set("Refrigerator", "1e307");
        form.set("GridConsumption_kWh", "1e300");
        form.set("TariffRate", "1e10");
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[1e306 * 70.0, 0.0, 0.0]);
        assert_eq!(serde_json::to_string(&v).unwrap().matches("null").count(), 0);
    }

    #[test]
    fn unknown_features_are_zero() {
        let order = order(&["SomethingNew"]);
        let v = build_feature_vector(Some(&order), &FormState::default()).unwrap();
        assert_eq!(v.as_slice(), &[0.0]);
    }

    #[test]
    fn city_columns_are_one_hot() {
        let order = order(&["City_City_A", "City_City_B", "City_City_C", "City_City_D"]);
        let mut form = order.blank_form();
        form.set_city_code("3");
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[0.0, 0.0, 1.0, 0.0]);

        form.set_city_code("garbage");
        let v = build_feature_vector(Some(&order), &form).unwrap();
        assert_eq!(v.as_slice(), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn length_check_reports_both_sizes() {
        let order = order(&["Fan", "NetBill"]);
        let short = FeatureVector(vec![1.0]);
        let err = short.ensure_matches(&order).unwrap_err();
        assert_eq!(err.to_string(), "Feature vector length mismatch: expected 2 got 1");
    }
}
