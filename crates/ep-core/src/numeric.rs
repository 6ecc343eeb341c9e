use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Round to 2 decimal places, halves toward positive infinity.
///
/// Values too large to scale carry no fractional digits and are returned
/// unchanged, so a finite input always rounds to a finite output.
pub fn round2(v: Real) -> Real {
    let scaled = v * 100.0;
    if !scaled.is_finite() {
        return v;
    }
    (scaled + 0.5).floor() / 100.0
}

/// Non-finite values (overflowed products, NaN) degrade to `0`.
pub fn finite_or_zero(v: Real) -> Real {
    if v.is_finite() { v } else { 0.0 }
}

/// True when a raw form entry carries no value.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Lenient number coercion for raw form entries.
///
/// Blank input coerces to `0`. Decimal, exponent and `0x`/`0o`/`0b`
/// integer notations are accepted. Anything unparsable or non-finite
/// yields `None`; callers degrade that to `0` rather than failing.
pub fn coerce_number(raw: &str) -> Option<Real> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix).ok().map(|v| v as Real);
    }

    // f64::from_str also accepts "inf"/"nan" spellings; those are rejected below.
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }

    s.parse::<Real>().ok().filter(|v| v.is_finite())
}

/// Coerce and fall back to `0` for anything unusable.
pub fn coerce_or_zero(raw: &str) -> Real {
    coerce_number(raw).unwrap_or(0.0)
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn coerced_values_are_finite(raw in ".{0,12}") {
            if let Some(v) = coerce_number(&raw) {
                prop_assert!(v.is_finite());
            }
        }

        #[test]
        fn round2_stays_within_half_cent(v in -1.0e6_f64..1.0e6_f64) {
            prop_assert!((round2(v) - v).abs() <= 0.005 + 1e-9);
        }

        #[test]
        fn round2_of_finite_is_finite(v in prop::num::f64::NORMAL) {
            prop_assert!(round2(v).is_finite());
        }
    }
}
