//! Solar panel sizing, computed locally or by the service.

use ep_client::{PredictClient, SolarRequest, SolarResponse};
use ep_core::{coerce_number, ensure_finite};
use ep_core::units;

use crate::error::{AppError, AppResult};

/// Fraction of rated panel output delivered to the household.
pub const SYSTEM_EFFICIENCY: f64 = 0.75;
pub const DEFAULT_PANEL_WATT: f64 = 400.0;

const MISSING_INPUT: &str = "Enter daily consumption & sun hours.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarInput {
    pub daily_kwh: f64,
    pub sun_hours: f64,
    pub panel_watt: f64,
}

impl SolarInput {
    /// Unusable entries read as `0`; a missing, zero or negative panel
    /// rating reads as 400 W.
    pub fn from_raw(daily_kwh: &str, sun_hours: &str, panel_watt: Option<&str>) -> Self {
        let panel_watt = panel_watt
            .and_then(coerce_number)
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_PANEL_WATT);
        Self {
            daily_kwh: coerce_number(daily_kwh).unwrap_or(0.0),
            sun_hours: coerce_number(sun_hours).unwrap_or(0.0),
            panel_watt,
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.daily_kwh <= 0.0 || self.sun_hours <= 0.0 {
            return Err(AppError::InvalidInput(MISSING_INPUT.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarSizing {
    pub panels_required: u32,
    pub estimated_daily_generation_kwh: f64,
    pub panel_daily_wh: f64,
    pub daily_kwh: f64,
    pub sun_hours: f64,
    pub panel_watt: f64,
}

impl From<SolarResponse> for SolarSizing {
    fn from(resp: SolarResponse) -> Self {
        Self {
            panels_required: resp.panels_required,
            estimated_daily_generation_kwh: resp.estimated_daily_generation_kwh,
            panel_daily_wh: resp.panel_daily_wh,
            daily_kwh: resp.daily_kwh,
            sun_hours: resp.sun_hours,
            panel_watt: resp.panel_watt,
        }
    }
}

/// panels = ceil(daily Wh / (panel W × sun h × efficiency))
pub fn size_locally(input: &SolarInput) -> AppResult<SolarSizing> {
    input.check()?;

    let needed_wh = ensure_finite(input.daily_kwh * 1000.0, "daily consumption")?;
    let per_panel = units::watts(input.panel_watt) * units::hours(input.sun_hours) * SYSTEM_EFFICIENCY;
    let panel_daily_wh = units::as_wh(per_panel);
    let panels = (needed_wh / panel_daily_wh).ceil();
    if !panels.is_finite() || panels > u32::MAX as f64 {
        return Err(AppError::InvalidInput(format!(
            "System too large to size: {panels} panels"
        )));
    }
    let panels_required = panels as u32;

    Ok(SolarSizing {
        panels_required,
        estimated_daily_generation_kwh: units::as_kwh(per_panel * panels_required as f64),
        panel_daily_wh,
        daily_kwh: input.daily_kwh,
        sun_hours: input.sun_hours,
        panel_watt: input.panel_watt,
    })
}

pub async fn size_remotely(client: &PredictClient, input: &SolarInput) -> AppResult<SolarSizing> {
    input.check()?;
    let req = SolarRequest {
        daily_kwh: input.daily_kwh,
        sun_hours: input.sun_hours,
        panel_watt: input.panel_watt,
        efficiency: None,
    };
    Ok(client.solar(&req).await?.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_ten_kwh_at_five_sun_hours() {
        let input = SolarInput::from_raw("10", "5", None);
        let sizing = size_locally(&input).unwrap();
        assert!((sizing.panel_daily_wh - 1500.0).abs() < 1e-6);
        assert_eq!(sizing.panels_required, 7);
        assert!((sizing.estimated_daily_generation_kwh - 10.5).abs() < 1e-9);
    }

    #[test]
    fn panel_rating_defaults_to_400() {
        assert_eq!(SolarInput::from_raw("1", "1", Some("")).panel_watt, 400.0);
        assert_eq!(SolarInput::from_raw("1", "1", Some("0")).panel_watt, 400.0);
        assert_eq!(SolarInput::from_raw("1", "1", Some("x")).panel_watt, 400.0);
        assert_eq!(SolarInput::from_raw("1", "1", Some("550")).panel_watt, 550.0);
    }

    #[test]
    fn requires_consumption_and_sun_hours() {
        let err = size_locally(&SolarInput::from_raw("", "5", None)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Enter daily consumption & sun hours.");
        assert!(size_locally(&SolarInput::from_raw("3", "-1", None)).is_err());
    }

    #[test]
    fn overflowing_consumption_is_rejected() {
        let input = SolarInput {
            daily_kwh: f64::MAX,
            sun_hours: 5.0,
            panel_watt: 400.0,
        };
        let err = size_locally(&input).unwrap_err();
        assert!(err.to_string().contains("Non-finite"));
    }

    #[test]
    fn panel_count_beyond_range_is_rejected() {
        let input = SolarInput {
            daily_kwh: 1.0e9,
            sun_hours: 1.0,
            panel_watt: 1.0,
        };
        let err = size_locally(&input).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(err.to_string().contains("too large"));

        let tiny_panel = SolarInput {
            daily_kwh: 10.0,
            sun_hours: 5.0,
            panel_watt: 1.0e-320,
        };
        assert!(size_locally(&tiny_panel).is_err());
    }

    #[test]
    fn exact_fit_does_not_round_up() {
        let input = SolarInput {
            daily_kwh: 3.0,
            sun_hours: 5.0,
            panel_watt: 400.0,
        };
        assert_eq!(size_locally(&input).unwrap().panels_required, 2);
    }
}
