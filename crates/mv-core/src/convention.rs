//! Sentinel conventions
//!
//! Every scalar kind that has spare values reserves one of them to mean
//! "the field must be present with any value" and another to mean "the field
//! must be absent". Script compilers emit these in place of explicit filters.
//! Booleans have no spare values and therefore no sentinels.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::value::{Scalar, ScalarKind, Value};

/// Reserved string meaning "present with any value"
pub const PRESENT_STRING: &str = "\u{1}PRESENT";

/// Reserved string meaning "must be absent"
pub const MISSING_STRING: &str = "\u{1}MISSING";

pub const PRESENT_CHAR: char = '\u{1}';
pub const MISSING_CHAR: char = '\u{2}';

pub const PRESENT_INT: i32 = i32::MIN + 1;
pub const MISSING_INT: i32 = i32::MIN;

pub const PRESENT_LONG: i64 = i64::MIN + 1;
pub const MISSING_LONG: i64 = i64::MIN;

pub const PRESENT_FLOAT: f32 = f32::MAX;
pub const MISSING_FLOAT: f32 = f32::MIN;

pub const PRESENT_DOUBLE: f64 = f64::MAX;
pub const MISSING_DOUBLE: f64 = f64::MIN;

pub const PRESENT_DECIMAL: Decimal = Decimal::MAX;
pub const MISSING_DECIMAL: Decimal = Decimal::MIN;

pub const PRESENT_DATE: NaiveDate = NaiveDate::MAX;
pub const MISSING_DATE: NaiveDate = NaiveDate::MIN;

pub const PRESENT_DATETIME: NaiveDateTime = NaiveDateTime::MAX;
pub const MISSING_DATETIME: NaiveDateTime = NaiveDateTime::MIN;

// Times have no unused calendar values, so the sentinels sit in the
// leap-second range which codecs never produce.
fn present_time() -> Option<NaiveTime> {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 1_999_999_998)
}

fn missing_time() -> Option<NaiveTime> {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 1_999_999_999)
}

/// Get the "present" sentinel for a scalar kind
pub fn present(kind: ScalarKind) -> Option<Scalar> {
    let scalar = match kind {
        ScalarKind::Bool => return None,
        ScalarKind::Int => Scalar::Int(PRESENT_INT),
        ScalarKind::Long => Scalar::Long(PRESENT_LONG),
        ScalarKind::Float => Scalar::Float(PRESENT_FLOAT),
        ScalarKind::Double => Scalar::Double(PRESENT_DOUBLE),
        ScalarKind::Decimal => Scalar::Decimal(PRESENT_DECIMAL),
        ScalarKind::Char => Scalar::Char(PRESENT_CHAR),
        ScalarKind::String => Scalar::String(PRESENT_STRING.to_string()),
        ScalarKind::Date => Scalar::Date(PRESENT_DATE),
        ScalarKind::Time => Scalar::Time(present_time()?),
        ScalarKind::DateTime => Scalar::DateTime(PRESENT_DATETIME),
    };
    Some(scalar)
}

/// Get the "missing" sentinel for a scalar kind
pub fn missing(kind: ScalarKind) -> Option<Scalar> {
    let scalar = match kind {
        ScalarKind::Bool => return None,
        ScalarKind::Int => Scalar::Int(MISSING_INT),
        ScalarKind::Long => Scalar::Long(MISSING_LONG),
        ScalarKind::Float => Scalar::Float(MISSING_FLOAT),
        ScalarKind::Double => Scalar::Double(MISSING_DOUBLE),
        ScalarKind::Decimal => Scalar::Decimal(MISSING_DECIMAL),
        ScalarKind::Char => Scalar::Char(MISSING_CHAR),
        ScalarKind::String => Scalar::String(MISSING_STRING.to_string()),
        ScalarKind::Date => Scalar::Date(MISSING_DATE),
        ScalarKind::Time => Scalar::Time(missing_time()?),
        ScalarKind::DateTime => Scalar::DateTime(MISSING_DATETIME),
    };
    Some(scalar)
}

/// Check if a scalar is the "present with any value" sentinel of its kind
pub fn is_present_sentinel(scalar: &Scalar) -> bool {
    match scalar {
        Scalar::Bool(_) => false,
        Scalar::Int(v) => *v == PRESENT_INT,
        Scalar::Long(v) => *v == PRESENT_LONG,
        Scalar::Float(v) => *v == PRESENT_FLOAT,
        Scalar::Double(v) => *v == PRESENT_DOUBLE,
        Scalar::Decimal(v) => *v == PRESENT_DECIMAL,
        Scalar::Char(v) => *v == PRESENT_CHAR,
        Scalar::String(v) => v == PRESENT_STRING,
        Scalar::Date(v) => *v == PRESENT_DATE,
        Scalar::Time(v) => Some(*v) == present_time(),
        Scalar::DateTime(v) => *v == PRESENT_DATETIME,
    }
}

/// Check if a scalar is the "must be absent" sentinel of its kind
pub fn is_missing_sentinel(scalar: &Scalar) -> bool {
    match scalar {
        Scalar::Bool(_) => false,
        Scalar::Int(v) => *v == MISSING_INT,
        Scalar::Long(v) => *v == MISSING_LONG,
        Scalar::Float(v) => *v == MISSING_FLOAT,
        Scalar::Double(v) => *v == MISSING_DOUBLE,
        Scalar::Decimal(v) => *v == MISSING_DECIMAL,
        Scalar::Char(v) => *v == MISSING_CHAR,
        Scalar::String(v) => v == MISSING_STRING,
        Scalar::Date(v) => *v == MISSING_DATE,
        Scalar::Time(v) => Some(*v) == missing_time(),
        Scalar::DateTime(v) => *v == MISSING_DATETIME,
    }
}

/// Check whether an expected value accepts an absent actual value
///
/// Scalars must be the missing sentinel. Lists and messages qualify when
/// every leaf scalar inside them is a missing sentinel, so an empty list or
/// message qualifies as well. Filters are never treated as the convention;
/// they are evaluated on their own.
///
/// This nested rule is a legacy best-effort behavior and is kept as is.
pub fn is_missing_convention(value: &Value) -> bool {
    match value {
        Value::Scalar(s) => is_missing_sentinel(s),
        Value::List(items) => items.iter().all(is_missing_convention),
        Value::Composite(msg) => msg.fields().all(|(_, v)| is_missing_convention(v)),
        Value::Filter(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Message;

    const ALL_KINDS: [ScalarKind; 11] = [
        ScalarKind::Bool,
        ScalarKind::Int,
        ScalarKind::Long,
        ScalarKind::Float,
        ScalarKind::Double,
        ScalarKind::Decimal,
        ScalarKind::Char,
        ScalarKind::String,
        ScalarKind::Date,
        ScalarKind::Time,
        ScalarKind::DateTime,
    ];

    #[test]
    fn test_sentinels_are_recognised() {
        for kind in ALL_KINDS {
            match (present(kind), missing(kind)) {
                (Some(p), Some(m)) => {
                    assert!(is_present_sentinel(&p), "{kind} present");
                    assert!(is_missing_sentinel(&m), "{kind} missing");
                    assert!(!is_present_sentinel(&m), "{kind} present/missing overlap");
                    assert!(!is_missing_sentinel(&p), "{kind} missing/present overlap");
                    assert_eq!(p.kind(), kind);
                }
                (None, None) => assert_eq!(kind, ScalarKind::Bool),
                _ => panic!("{kind} has only one sentinel"),
            }
        }
    }

    #[test]
    fn test_ordinary_values_are_not_sentinels() {
        assert!(!is_present_sentinel(&Scalar::Int(0)));
        assert!(!is_missing_sentinel(&Scalar::from("MISSING")));
        assert!(!is_missing_sentinel(&Scalar::Bool(false)));
    }

    #[test]
    fn test_nested_missing_convention() {
        let all_missing = Message::new("Party", "")
            .with_field("id", MISSING_STRING)
            .with_field("role", MISSING_INT);
        assert!(is_missing_convention(&Value::from(all_missing.clone())));

        let mixed = all_missing.with_field("source", "D");
        assert!(!is_missing_convention(&Value::from(mixed)));

        let list = Value::List(vec![Value::from(MISSING_LONG)]);
        assert!(is_missing_convention(&list));
        assert!(is_missing_convention(&Value::List(vec![])));
    }
}
