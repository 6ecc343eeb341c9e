//! Best-effort derivation of aggregate fields from related entries.
//!
//! Each rule only writes its target when the target is declared and either
//! blank or `force` is set, and only when its inputs are present. Rules run
//! in a fixed order, so the average-power rule sees a total derived earlier
//! in the same pass.

use ep_core::catalog::fields;
use ep_core::{Appliance, Real, round2};

use crate::schema::{FieldValue, FormState};

/// Monthly usage hours assumed without air conditioning (8 h/day x 30).
pub const DEFAULT_MONTHLY_HOURS: Real = 240.0;

/// Monthly usage hours assumed when air conditioning is present.
pub const DEFAULT_MONTHLY_HOURS_WITH_AC: Real = 300.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AutofillChange {
    pub field: &'static str,
    pub value: Real,
}

pub fn apply_autofill(form: &mut FormState, force: bool) -> Vec<AutofillChange> {
    let mut changes = Vec::new();

    if let Some(total) = derive_total_power(form, force) {
        write(form, fields::TOTAL_APPLIANCE_POWER, total, &mut changes);
    }
    if let Some(bill) = derive_net_bill(form, force) {
        write(form, fields::NET_BILL, bill, &mut changes);
    }
    if let Some(hours) = derive_monthly_hours(form, force) {
        write(form, fields::MONTHLY_HOURS, hours, &mut changes);
    }
    if let Some(avg) = derive_avg_power(form, force) {
        write(form, fields::AVG_POWER_PER_APPLIANCE, avg, &mut changes);
    }

    changes
}

fn write(form: &mut FormState, field: &'static str, value: Real, changes: &mut Vec<AutofillChange>) {
    form.set(field, FieldValue::Number(value));
    changes.push(AutofillChange { field, value });
}

fn target_open(form: &FormState, name: &str, force: bool) -> bool {
    form.is_declared(name) && (force || form.is_blank(name))
}

fn filled_number(form: &FormState, name: &str) -> Option<Option<Real>> {
    form.filled(name).map(FieldValue::to_number)
}

/// total = avg x count
fn derive_total_power(form: &FormState, force: bool) -> Option<Real> {
    if !target_open(form, fields::TOTAL_APPLIANCE_POWER, force) {
        return None;
    }
    let avg = filled_number(form, fields::AVG_POWER_PER_APPLIANCE)??;
    let count = filled_number(form, fields::APPLIANCE_COUNT)??;
    let total = avg * count;
    (total.is_finite() && total > 0.0).then(|| round2(total))
}

/// bill = grid x tariff; a blank tariff counts as 0
fn derive_net_bill(form: &FormState, force: bool) -> Option<Real> {
    if !target_open(form, fields::NET_BILL, force) || !form.is_declared(fields::TARIFF_RATE) {
        return None;
    }
    let grid = filled_number(form, fields::GRID_CONSUMPTION)??;
    let tariff = match filled_number(form, fields::TARIFF_RATE) {
        Some(t) => t?,
        None => 0.0,
    };
    let bill = grid * tariff;
    bill.is_finite().then(|| round2(bill))
}

fn derive_monthly_hours(form: &FormState, force: bool) -> Option<Real> {
    if !target_open(form, fields::MONTHLY_HOURS, force) {
        return None;
    }
    let ac = Appliance::AirConditioner.feature_name();
    let has_ac = form
        .get(ac)
        .and_then(FieldValue::to_number)
        .is_some_and(|n| n > 0.0);
    Some(if has_ac {
        DEFAULT_MONTHLY_HOURS_WITH_AC
    } else {
        DEFAULT_MONTHLY_HOURS
    })
}

/// avg = total / count; a blank total counts as 0
fn derive_avg_power(form: &FormState, force: bool) -> Option<Real> {
    if !target_open(form, fields::AVG_POWER_PER_APPLIANCE, force)
        || !form.is_declared(fields::TOTAL_APPLIANCE_POWER)
    {
        return None;
    }
    let count = filled_number(form, fields::APPLIANCE_COUNT)??;
    if count <= 0.0 {
        return None;
    }
    let total = form.get(fields::TOTAL_APPLIANCE_POWER)?.to_number()?;
    let avg = total / count;
    avg.is_finite().then(|| round2(avg))
}
