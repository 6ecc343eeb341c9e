// ep-core/src/units.rs

use uom::si::f64::{Energy as UomEnergy, Power as UomPower, Time as UomTime};

// Public canonical unit types (SI, f64)
pub type Energy = UomEnergy;
pub type Power = UomPower;
pub type Time = UomTime;

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn hours(v: f64) -> Time {
    use uom::si::time::hour;
    Time::new::<hour>(v)
}

#[inline]
pub fn as_kwh(e: Energy) -> f64 {
    use uom::si::energy::kilowatt_hour;
    e.get::<kilowatt_hour>()
}

#[inline]
pub fn as_wh(e: Energy) -> f64 {
    use uom::si::energy::watt_hour;
    e.get::<watt_hour>()
}

pub mod constants {
    /// Billing month used by the local consumption estimate.
    pub const DAYS_PER_MONTH: f64 = 30.0;

    /// Hours in a 31-day month; upper bound for monthly usage hours.
    pub const MAX_MONTHLY_HOURS: f64 = 744.0;
}
