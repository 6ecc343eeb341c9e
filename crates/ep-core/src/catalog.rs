//! Static tables shared by the form, builder and service layers.

use crate::numeric::{Real, coerce_number};

/// Known appliance features. Each carries an assumed per-unit wattage used
/// when the form entry is a count rather than a power reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Appliance {
    Fan,
    Refrigerator,
    AirConditioner,
    Television,
    Monitor,
    MotorPump,
}

impl Appliance {
    pub const ALL: [Appliance; 6] = [
        Appliance::Fan,
        Appliance::Refrigerator,
        Appliance::AirConditioner,
        Appliance::Television,
        Appliance::Monitor,
        Appliance::MotorPump,
    ];

    /// Feature name as declared by the prediction service.
    pub fn feature_name(self) -> &'static str {
        match self {
            Appliance::Fan => "Fan",
            Appliance::Refrigerator => "Refrigerator",
            Appliance::AirConditioner => "AirConditioner",
            Appliance::Television => "Television",
            Appliance::Monitor => "Monitor",
            Appliance::MotorPump => "MotorPump",
        }
    }

    pub fn from_feature_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.feature_name() == name)
    }

    /// Assumed wattage of a single unit.
    pub fn default_watts(self) -> Real {
        match self {
            Appliance::Fan => 70.0,
            Appliance::Refrigerator => 150.0,
            Appliance::AirConditioner => 1200.0,
            Appliance::Television => 100.0,
            Appliance::Monitor => 30.0,
            Appliance::MotorPump => 500.0,
        }
    }
}

/// City categories encoded as one-hot columns (`City_City_A` .. `City_City_D`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum City {
    #[default]
    A,
    B,
    C,
    D,
}

impl City {
    pub const ALL: [City; 4] = [City::A, City::B, City::C, City::D];

    pub fn letter(self) -> &'static str {
        match self {
            City::A => "A",
            City::B => "B",
            City::C => "C",
            City::D => "D",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            City::A => 1,
            City::B => 2,
            City::C => 3,
            City::D => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            City::A => "City A",
            City::B => "City B",
            City::C => "City C",
            City::D => "City D",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Resolve a raw selector value. Anything other than a whole number in
    /// 1..=4 selects city A.
    pub fn from_selection(raw: Option<&str>) -> Self {
        let Some(v) = raw.and_then(coerce_number) else {
            return City::A;
        };
        if v.fract() != 0.0 || !(1.0..=4.0).contains(&v) {
            return City::A;
        }
        Self::from_code(v as u8).unwrap_or_default()
    }
}

/// Prefix shared by every one-hot city column.
pub const CITY_PREFIX: &str = "City_";

/// Form selector holding the chosen city code.
pub const CITY_CODE_FIELD: &str = "City_code";

pub fn is_city_column(name: &str) -> bool {
    name.starts_with(CITY_PREFIX)
}

/// Letter suffix of a one-hot city column (`City_City_B` -> `B`).
pub fn city_column_suffix(name: &str) -> &str {
    name.rsplit('_').next().unwrap_or(name)
}

pub mod fields {
    pub const MONTHLY_HOURS: &str = "MonthlyHours";
    pub const TARIFF_RATE: &str = "TariffRate";
    pub const SOLAR_GENERATION: &str = "SolarGeneration_kWh";
    pub const GRID_CONSUMPTION: &str = "GridConsumption_kWh";
    pub const ENERGY_SOLD: &str = "EnergySold_kWh";
    pub const NET_BILL: &str = "NetBill";
    pub const TOTAL_APPLIANCE_POWER: &str = "total_appliance_power";
    pub const APPLIANCE_COUNT: &str = "appliance_count";
    pub const AVG_POWER_PER_APPLIANCE: &str = "avg_power_per_appliance";
}

/// Alias lookup order for aggregate features left blank on the form.
pub fn aliases_for(name: &str) -> Option<&'static [&'static str]> {
    match name {
        fields::TOTAL_APPLIANCE_POWER => Some(&["total_appliance_power", "TotalAppliancePower"]),
        fields::APPLIANCE_COUNT => Some(&["appliance_count"]),
        fields::AVG_POWER_PER_APPLIANCE => Some(&["avg_power_per_appliance"]),
        _ => None,
    }
}

/// Feature order used when the service cannot provide one.
pub const DEFAULT_FEATURE_ORDER: [&str; 16] = [
    "Fan",
    "Refrigerator",
    "AirConditioner",
    "Television",
    "Monitor",
    "MotorPump",
    "MonthlyHours",
    "SolarGeneration_kWh",
    "GridConsumption_kWh",
    "EnergySold_kWh",
    "TariffRate",
    "NetBill",
    "City_City_A",
    "City_City_B",
    "City_City_C",
    "City_City_D",
];

/// Model list used when the service cannot provide one.
pub const DEFAULT_MODELS: [(&str, &str); 3] = [
    ("xgb", "XGBoost Regressor"),
    ("rf", "Random Forest"),
    ("linear", "Linear Regression"),
];

/// Single entry offered when the service reports no models at all.
pub const EMPTY_CATALOG_MODEL: (&str, &str) = ("xgb", "XGBoost");
