//! Household appliance list: CRUD, local consumption estimate, household
//! submission and import of aggregates into a prediction form.

use chrono::{DateTime, Utc};
use ep_client::{HouseholdRequest, PredictClient};
use ep_core::catalog::fields;
use ep_core::units::{self, constants::DAYS_PER_MONTH};
use ep_core::{coerce_number, round2};
use ep_form::{AutofillChange, FieldValue, FormState, apply_autofill};
use ep_store::{ApplianceEntry, LocalStore};

use crate::error::{AppError, AppResult};
use crate::predict_service::ui_house_id;

/// Raw appliance entry as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ApplianceInput {
    pub name: String,
    pub power: String,
    pub hours: String,
    pub qty: String,
}

impl ApplianceInput {
    /// Name is trimmed and required; unusable power or hours read as `0`,
    /// unusable or zero quantity as `1`.
    pub fn into_entry(self) -> AppResult<ApplianceEntry> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Enter appliance name".to_string()));
        }
        Ok(ApplianceEntry {
            name,
            power: coerce_number(&self.power).unwrap_or(0.0),
            hours: coerce_number(&self.hours).unwrap_or(0.0),
            qty: quantity(coerce_number(&self.qty)),
        })
    }
}

fn quantity(raw: Option<f64>) -> f64 {
    raw.filter(|q| *q != 0.0).unwrap_or(1.0)
}

pub fn list_appliances(store: &LocalStore) -> AppResult<Vec<ApplianceEntry>> {
    Ok(store.load_appliances()?)
}

pub fn add_appliance(store: &LocalStore, input: ApplianceInput) -> AppResult<Vec<ApplianceEntry>> {
    let entry = input.into_entry()?;
    let mut list = store.load_appliances()?;
    list.push(entry);
    store.save_appliances(&list)?;
    tracing::info!(count = list.len(), "appliance saved");
    Ok(list)
}

/// Remove the entry at `index` (0-based).
pub fn remove_appliance(store: &LocalStore, index: usize) -> AppResult<ApplianceEntry> {
    let mut list = store.load_appliances()?;
    if index >= list.len() {
        return Err(AppError::NotFound(format!(
            "appliance #{} (list has {})",
            index + 1,
            list.len()
        )));
    }
    let removed = list.remove(index);
    store.save_appliances(&list)?;
    Ok(removed)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumptionEstimate {
    pub daily_kwh: f64,
    pub monthly_kwh: f64,
}

/// daily = Σ power × hours × qty; monthly = daily × 30.
pub fn estimate_consumption(list: &[ApplianceEntry]) -> ConsumptionEstimate {
    let daily: units::Energy = list
        .iter()
        .map(|a| units::watts(a.power * quantity(Some(a.qty))) * units::hours(a.hours))
        .fold(units::watts(0.0) * units::hours(0.0), |acc, e| acc + e);
    let daily_kwh = units::as_kwh(daily);
    ConsumptionEstimate {
        daily_kwh,
        monthly_kwh: daily_kwh * DAYS_PER_MONTH,
    }
}

pub fn estimate_stored(store: &LocalStore) -> AppResult<ConsumptionEstimate> {
    let list = non_empty(store, "No appliances to calculate")?;
    Ok(estimate_consumption(&list))
}

fn non_empty(store: &LocalStore, message: &str) -> AppResult<Vec<ApplianceEntry>> {
    let list = store.load_appliances()?;
    if list.is_empty() {
        return Err(AppError::InvalidInput(message.to_string()));
    }
    Ok(list)
}

/// Household aggregate for `POST /household/`: usage hours per appliance
/// name and the monthly consumption estimate.
pub fn household_request(list: &[ApplianceEntry], now: DateTime<Utc>) -> HouseholdRequest {
    let mut appliance_usage = serde_json::Map::new();
    for a in list {
        appliance_usage.insert(
            a.name.clone(),
            serde_json::json!(a.hours * quantity(Some(a.qty))),
        );
    }
    HouseholdRequest {
        house_id: ui_house_id(now),
        date: now.format("%Y-%m-%d").to_string(),
        appliance_usage,
        total_consumption_kwh: estimate_consumption(list).monthly_kwh,
    }
}

/// Send the stored list as a household record; returns the inserted id.
pub async fn send_household(client: &PredictClient, store: &LocalStore) -> AppResult<String> {
    let list = non_empty(store, "No appliances to send")?;
    let req = household_request(&list, Utc::now());
    let resp = client.submit_household(&req).await?;
    tracing::info!(inserted_id = %resp.inserted_id, "household record sent");
    Ok(resp.inserted_id)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplianceAggregates {
    pub total_power: f64,
    pub count: f64,
    pub avg_power: f64,
}

pub fn aggregate(list: &[ApplianceEntry]) -> ApplianceAggregates {
    let mut total = 0.0;
    let mut count = 0.0;
    for a in list {
        let power = if a.power.is_finite() { a.power } else { 0.0 };
        let qty = if a.qty.is_finite() { quantity(Some(a.qty)) } else { 1.0 };
        total += power * qty;
        count += qty;
    }
    ApplianceAggregates {
        total_power: round2(total),
        count: if count != 0.0 { count } else { list.len() as f64 },
        avg_power: if count != 0.0 { round2(total / count) } else { 0.0 },
    }
}

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub aggregates: ApplianceAggregates,
    /// Aggregate fields written; only fields the form declares are set.
    pub imported: Vec<&'static str>,
    pub autofill: Vec<AutofillChange>,
}

/// Copy the stored list's aggregates into the form, then run a forced
/// autofill pass.
pub fn import_into_form(store: &LocalStore, form: &mut FormState) -> AppResult<ImportOutcome> {
    let list = store.load_appliances()?;
    if list.is_empty() {
        return Err(AppError::NotFound(
            "No appliances found in local storage".to_string(),
        ));
    }
    let aggregates = aggregate(&list);

    let mut imported = Vec::new();
    for (field, value) in [
        (fields::TOTAL_APPLIANCE_POWER, aggregates.total_power),
        (fields::APPLIANCE_COUNT, aggregates.count),
        (fields::AVG_POWER_PER_APPLIANCE, aggregates.avg_power),
    ] {
        if form.is_declared(field) {
            form.set(field, FieldValue::Number(value));
            imported.push(field);
        }
    }

    let autofill = apply_autofill(form, true);
    Ok(ImportOutcome {
        aggregates,
        imported,
        autofill,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, power: f64, hours: f64, qty: f64) -> ApplianceEntry {
        ApplianceEntry {
            name: name.into(),
            power,
            hours,
            qty,
        }
    }

    #[test]
    fn input_coercion_rules() {
        let e = ApplianceInput {
            name: "  Fan ".into(),
            power: "abc".into(),
            hours: "".into(),
            qty: "0".into(),
        }
        .into_entry()
        .unwrap();
        assert_eq!(e, entry("Fan", 0.0, 0.0, 1.0));

        let err = ApplianceInput {
            name: "   ".into(),
            ..Default::default()
        }
        .into_entry()
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn estimate_sums_energy_per_day() {
        let list = [entry("Fan", 70.0, 10.0, 2.0), entry("TV", 100.0, 4.0, 1.0)];
        let est = estimate_consumption(&list);
        assert!((est.daily_kwh - 1.8).abs() < 1e-9);
        assert!((est.monthly_kwh - 54.0).abs() < 1e-9);
    }

    #[test]
    fn household_usage_is_hours_times_qty() {
        let now = DateTime::from_timestamp_millis(1_760_700_000_000).unwrap();
        let req = household_request(&[entry("Fan", 70.0, 8.0, 3.0)], now);
        assert_eq!(req.house_id, "ui_1760700000000");
        assert_eq!(req.date, "2025-10-17");
        assert_eq!(req.appliance_usage["Fan"], serde_json::json!(24.0));
        assert!((req.total_consumption_kwh - 50.4).abs() < 1e-9);
    }

    #[test]
    fn aggregates_weight_power_by_quantity() {
        let agg = aggregate(&[entry("Fan", 70.0, 8.0, 3.0), entry("Fridge", 150.0, 24.0, 1.0)]);
        assert_eq!(agg.total_power, 360.0);
        assert_eq!(agg.count, 4.0);
        assert_eq!(agg.avg_power, 90.0);
    }
}
