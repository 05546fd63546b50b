//! Scalar value comparison
//!
//! - `float`/`double`: absolute difference within the configured precision
//!   (default [`DEFAULT_DOUBLE_PRECISION`])
//! - `decimal`: absolute difference within the configured precision, exact
//!   equality when none is configured
//! - strings written as `#regex(<pattern>)` are matched as regexes
//! - everything else: exact equality of values of the same kind
//!
//! A configured system precision additionally requires the actual value to
//! be a multiple of it, whatever the expected value is.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use mv_core::Scalar;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::CompareError;

/// Tolerance for floating point fields without a configured precision
pub const DEFAULT_DOUBLE_PRECISION: f64 = 1e-10;

/// Opening marker of a regex expected value
pub const REGEX_PREFIX: &str = "#regex(";

/// Closing marker of a regex expected value
pub const REGEX_SUFFIX: &str = ")";

/// Regexes compiled during one comparison call
#[derive(Debug, Default)]
pub struct RegexCache {
    compiled: HashMap<String, Regex>,
}

impl RegexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a compiled regex, compiling it on first use
    pub fn get(&mut self, pattern: &str) -> Result<&Regex, CompareError> {
        match self.compiled.entry(pattern.to_string()) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                let re = Regex::new(pattern).map_err(|source| CompareError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                })?;
                Ok(&*entry.insert(re))
            }
        }
    }
}

/// Extract the pattern of a `#regex(...)` expected string
pub fn regex_pattern(expected: &str) -> Option<&str> {
    expected
        .strip_prefix(REGEX_PREFIX)?
        .strip_suffix(REGEX_SUFFIX)
}

/// Compare two scalars
///
/// Returns `Ok(false)` for a plain mismatch and an error for kind mismatches,
/// bad regexes and values that cannot be checked against the system
/// precision.
pub fn compare_scalars(
    regexes: &mut RegexCache,
    actual: &Scalar,
    expected: &Scalar,
    precision: Option<Decimal>,
    system_precision: Option<Decimal>,
) -> Result<bool, CompareError> {
    let matches = match (actual, expected) {
        (Scalar::Double(a), Scalar::Double(e)) => within(*a, *e, float_precision(precision)),
        (Scalar::Float(a), Scalar::Float(e)) => {
            within(f64::from(*a), f64::from(*e), float_precision(precision))
        }
        (Scalar::Decimal(a), Scalar::Decimal(e)) => match precision {
            Some(p) => a.checked_sub(*e).map_or(false, |diff| diff.abs() <= p),
            None => a == e,
        },
        (Scalar::String(a), Scalar::String(e)) => match regex_pattern(e) {
            Some(pattern) => regexes.get(pattern)?.is_match(a),
            None => a == e,
        },
        (a, e) if a.kind() != e.kind() => {
            return Err(CompareError::ScalarTypeMismatch {
                expected: e.kind(),
                actual: a.kind(),
            })
        }
        (a, e) => a == e,
    };

    if !matches {
        return Ok(false);
    }

    match system_precision {
        Some(step) => is_multiple_of(actual, step),
        None => Ok(true),
    }
}

fn float_precision(precision: Option<Decimal>) -> f64 {
    precision
        .and_then(|p| p.to_f64())
        .unwrap_or(DEFAULT_DOUBLE_PRECISION)
}

fn within(actual: f64, expected: f64, precision: f64) -> bool {
    if actual == expected || (actual.is_nan() && expected.is_nan()) {
        return true;
    }
    // NaN differences compare false and therefore fail
    (actual - expected).abs() <= precision
}

fn is_multiple_of(actual: &Scalar, step: Decimal) -> Result<bool, CompareError> {
    let value = actual
        .as_decimal()
        .ok_or_else(|| CompareError::SystemPrecision {
            value: actual.to_string(),
            step,
        })?;
    Ok(value.checked_rem(step).map_or(false, |rest| rest.is_zero()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(actual: Scalar, expected: Scalar, precision: Option<Decimal>) -> bool {
        compare_scalars(&mut RegexCache::new(), &actual, &expected, precision, None).unwrap()
    }

    #[test]
    fn test_equal_values_pass() {
        assert!(check(Scalar::Int(5), Scalar::Int(5), None));
        assert!(check(Scalar::from("abc"), Scalar::from("abc"), None));
        assert!(check(Scalar::Char('1'), Scalar::Char('1'), None));
        assert!(!check(Scalar::Long(5), Scalar::Long(6), None));
    }

    #[test]
    fn test_double_precision() {
        let p = Some(Decimal::new(1, 2));
        assert!(check(Scalar::Double(1.001), Scalar::Double(1.002), p));
        assert!(!check(Scalar::Double(1.001), Scalar::Double(1.002), None));
        assert!(check(Scalar::Double(1.0), Scalar::Double(1.0 + 1e-12), None));
        assert!(check(Scalar::Float(2.5), Scalar::Float(2.5), None));
    }

    #[test]
    fn test_nan_and_infinity() {
        assert!(check(Scalar::Double(f64::NAN), Scalar::Double(f64::NAN), None));
        assert!(!check(Scalar::Double(f64::NAN), Scalar::Double(1.0), None));
        assert!(check(
            Scalar::Double(f64::INFINITY),
            Scalar::Double(f64::INFINITY),
            None
        ));
    }

    #[test]
    fn test_decimal_precision() {
        let a = Scalar::Decimal(Decimal::new(10_05, 2));
        let e = Scalar::Decimal(Decimal::new(10_00, 2));

        assert!(!check(a.clone(), e.clone(), None));
        assert!(check(a.clone(), e.clone(), Some(Decimal::new(1, 1))));
        assert!(!check(a, e, Some(Decimal::new(1, 3))));
        assert!(!check(
            Scalar::Decimal(Decimal::MAX),
            Scalar::Decimal(Decimal::MIN),
            Some(Decimal::ONE)
        ));
    }

    #[test]
    fn test_system_precision() {
        let mut cache = RegexCache::new();
        let step = Some(Decimal::new(5, 1));

        let ok = compare_scalars(
            &mut cache,
            &Scalar::Double(100.5),
            &Scalar::Double(100.5),
            None,
            step,
        );
        assert!(ok.unwrap());

        let off_step = compare_scalars(
            &mut cache,
            &Scalar::Double(100.3),
            &Scalar::Double(100.3),
            None,
            step,
        );
        assert!(!off_step.unwrap());

        let err = compare_scalars(
            &mut cache,
            &Scalar::from("x"),
            &Scalar::from("x"),
            None,
            step,
        )
        .unwrap_err();
        assert!(matches!(err, CompareError::SystemPrecision { .. }));
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let err = compare_scalars(
            &mut RegexCache::new(),
            &Scalar::Int(1),
            &Scalar::Long(1),
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "type mismatch: expected long but actual is int"
        );
    }

    #[test]
    fn test_regex_marker() {
        assert_eq!(regex_pattern("#regex(^A+$)"), Some("^A+$"));
        assert_eq!(regex_pattern("#regex(^A+$"), None);
        assert!(check(Scalar::from("AAA"), Scalar::from("#regex(^A+$)"), None));
        assert!(!check(Scalar::from("AAB"), Scalar::from("#regex(^A+$)"), None));

        let err = compare_scalars(
            &mut RegexCache::new(),
            &Scalar::from("x"),
            &Scalar::from("#regex(()"),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CompareError::InvalidRegex { .. }));
    }
}
