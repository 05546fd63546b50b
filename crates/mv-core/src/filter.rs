//! Expected-side filters
//!
//! A filter replaces a literal expected value with a predicate over the
//! actual value. Expression filters may also carry an embedded list pattern
//! that is compared structurally against an actual list once the predicate
//! has passed.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

use crate::value::{Scalar, Value};

/// Filter evaluation errors
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("cannot compare {actual} with {expected}")]
    Incomparable { actual: String, expected: String },

    #[error("expected a scalar value but got {0}")]
    NotAScalar(String),

    #[error("expected a list value but got {0}")]
    NotAList(String),

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0}")]
    Custom(String),
}

/// Result type for filter evaluation
pub type FilterResult<T> = Result<T, FilterError>;

/// Outcome of validating an actual value against a filter
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Whether the predicate accepted the actual value
    pub passed: bool,

    /// Literal list pattern to compare against an actual list
    pub embedded: Option<Vec<Value>>,
}

impl FilterOutcome {
    pub fn passed() -> Self {
        Self {
            passed: true,
            embedded: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            passed: false,
            embedded: None,
        }
    }

    fn from_bool(passed: bool) -> Self {
        Self {
            passed,
            embedded: None,
        }
    }
}

/// Pluggable predicate over an actual value
///
/// `actual` is `None` when the field is absent.
pub trait ValueFilter: Send + Sync + fmt::Debug {
    /// Check the actual value
    fn validate(&self, actual: Option<&Value>) -> FilterResult<FilterOutcome>;

    /// Human readable condition shown as the expected summary
    fn condition(&self) -> String;
}

/// Filter variants accepted on the expected side
#[derive(Debug, Clone)]
pub enum FilterValue {
    /// Passes only when the actual value is absent
    Null,

    /// Passes only when the actual value is present
    NotNull,

    /// Always passes, only records whether the value was there
    Exists,

    /// Evaluates a condition, optionally with an embedded list pattern
    Expression(ExpressionFilter),

    /// User supplied predicate
    Custom(Arc<dyn ValueFilter>),
}

impl FilterValue {
    /// Create an expression filter
    pub fn expression(condition: Condition) -> Self {
        FilterValue::Expression(ExpressionFilter::new(condition))
    }

    /// Create an expression filter that also compares list elements
    pub fn expression_with_list(condition: Condition, embedded: Vec<Value>) -> Self {
        FilterValue::Expression(ExpressionFilter::new(condition).with_embedded(embedded))
    }

    /// Wrap a custom predicate
    pub fn custom(filter: impl ValueFilter + 'static) -> Self {
        FilterValue::Custom(Arc::new(filter))
    }
}

impl ValueFilter for FilterValue {
    fn validate(&self, actual: Option<&Value>) -> FilterResult<FilterOutcome> {
        match self {
            FilterValue::Null => Ok(FilterOutcome::from_bool(actual.is_none())),
            FilterValue::NotNull => Ok(FilterOutcome::from_bool(actual.is_some())),
            FilterValue::Exists => Ok(FilterOutcome::passed()),
            FilterValue::Expression(expr) => expr.validate(actual),
            FilterValue::Custom(custom) => custom.validate(actual),
        }
    }

    fn condition(&self) -> String {
        match self {
            FilterValue::Null => "null".to_string(),
            FilterValue::NotNull => "not null".to_string(),
            FilterValue::Exists => "any".to_string(),
            FilterValue::Expression(expr) => expr.condition(),
            FilterValue::Custom(custom) => custom.condition(),
        }
    }
}

/// A condition with an optional embedded list pattern
#[derive(Debug, Clone)]
pub struct ExpressionFilter {
    condition: Condition,
    embedded: Option<Vec<Value>>,
}

impl ExpressionFilter {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            embedded: None,
        }
    }

    /// Attach a list pattern used when the actual value is a list
    pub fn with_embedded(mut self, embedded: Vec<Value>) -> Self {
        self.embedded = Some(embedded);
        self
    }

    pub fn condition_expr(&self) -> &Condition {
        &self.condition
    }

    pub fn embedded(&self) -> Option<&[Value]> {
        self.embedded.as_deref()
    }
}

impl ValueFilter for ExpressionFilter {
    fn validate(&self, actual: Option<&Value>) -> FilterResult<FilterOutcome> {
        let passed = self.condition.evaluate(actual)?;
        let embedded = match actual {
            Some(Value::List(_)) if passed => self.embedded.clone(),
            _ => None,
        };
        Ok(FilterOutcome { passed, embedded })
    }

    fn condition(&self) -> String {
        self.condition.to_string()
    }
}

/// Expression conditions over a single actual value
///
/// Comparisons against an absent value are false; `Not` inverts that.
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(Scalar),
    Ne(Scalar),
    Gt(Scalar),
    Ge(Scalar),
    Lt(Scalar),
    Le(Scalar),
    /// Regex searched in the scalar's text form, see [`Condition::regex`]
    Regex(Regex),
    /// Equal to any of the listed values
    In(Vec<Scalar>),
    /// List length within the inclusive bounds
    Size {
        min: Option<usize>,
        max: Option<usize>,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    /// Compile a regex condition
    pub fn regex(pattern: &str) -> FilterResult<Self> {
        let re = Regex::new(pattern).map_err(|source| FilterError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Condition::Regex(re))
    }

    /// Evaluate the condition
    pub fn evaluate(&self, actual: Option<&Value>) -> FilterResult<bool> {
        match self {
            Condition::And(conditions) => {
                for condition in conditions {
                    if !condition.evaluate(actual)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Or(conditions) => {
                for condition in conditions {
                    if condition.evaluate(actual)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Not(inner) => Ok(!inner.evaluate(actual)?),
            Condition::Size { min, max } => {
                let Some(actual) = actual else {
                    return Ok(false);
                };
                let items = actual
                    .as_list()
                    .ok_or_else(|| FilterError::NotAList(actual.summary()))?;
                Ok(min.map_or(true, |m| items.len() >= m) && max.map_or(true, |m| items.len() <= m))
            }
            _ => {
                let Some(actual) = actual else {
                    return Ok(false);
                };
                let scalar = actual
                    .as_scalar()
                    .ok_or_else(|| FilterError::NotAScalar(actual.summary()))?;
                self.evaluate_scalar(scalar)
            }
        }
    }

    fn evaluate_scalar(&self, actual: &Scalar) -> FilterResult<bool> {
        match self {
            Condition::Eq(expected) => Ok(scalar_eq(actual, expected)),
            Condition::Ne(expected) => Ok(!scalar_eq(actual, expected)),
            Condition::Gt(expected) => Ok(ordering(actual, expected)? == Ordering::Greater),
            Condition::Ge(expected) => Ok(ordering(actual, expected)? != Ordering::Less),
            Condition::Lt(expected) => Ok(ordering(actual, expected)? == Ordering::Less),
            Condition::Le(expected) => Ok(ordering(actual, expected)? != Ordering::Greater),
            Condition::Regex(re) => Ok(re.is_match(&actual.to_string())),
            Condition::In(values) => Ok(values.iter().any(|v| scalar_eq(actual, v))),
            Condition::Size { .. } | Condition::And(_) | Condition::Or(_) | Condition::Not(_) => {
                self.evaluate(Some(&Value::Scalar(actual.clone())))
            }
        }
    }
}

fn scalar_eq(actual: &Scalar, expected: &Scalar) -> bool {
    match actual.compare_to(expected) {
        Some(ord) => ord == Ordering::Equal,
        None => actual == expected,
    }
}

fn ordering(actual: &Scalar, expected: &Scalar) -> FilterResult<Ordering> {
    actual
        .compare_to(expected)
        .ok_or_else(|| FilterError::Incomparable {
            actual: format!("{} '{}'", actual.kind(), actual),
            expected: format!("{} '{}'", expected.kind(), expected),
        })
}

fn join(conditions: &[Condition], sep: &str) -> String {
    conditions
        .iter()
        .map(|c| format!("({})", c))
        .collect::<Vec<_>>()
        .join(sep)
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Eq(v) => write!(f, "== {}", v),
            Condition::Ne(v) => write!(f, "!= {}", v),
            Condition::Gt(v) => write!(f, "> {}", v),
            Condition::Ge(v) => write!(f, ">= {}", v),
            Condition::Lt(v) => write!(f, "< {}", v),
            Condition::Le(v) => write!(f, "<= {}", v),
            Condition::Regex(re) => write!(f, "~ {}", re.as_str()),
            Condition::In(values) => {
                let values: Vec<_> = values.iter().map(ToString::to_string).collect();
                write!(f, "in [{}]", values.join(", "))
            }
            Condition::Size { min, max } => {
                let min = min.map(|m| m.to_string()).unwrap_or_default();
                let max = max.map(|m| m.to_string()).unwrap_or_default();
                write!(f, "size {}..{}", min, max)
            }
            Condition::And(c) => f.write_str(&join(c, " && ")),
            Condition::Or(c) => f.write_str(&join(c, " || ")),
            Condition::Not(c) => write!(f, "!({})", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_filters() {
        let present = Value::from(1);

        assert!(FilterValue::Null.validate(None).unwrap().passed);
        assert!(!FilterValue::Null.validate(Some(&present)).unwrap().passed);
        assert!(FilterValue::NotNull.validate(Some(&present)).unwrap().passed);
        assert!(!FilterValue::NotNull.validate(None).unwrap().passed);
        assert!(FilterValue::Exists.validate(None).unwrap().passed);
        assert!(FilterValue::Exists.validate(Some(&present)).unwrap().passed);
    }

    #[test]
    fn test_numeric_conditions() {
        let actual = Value::from(15.5);
        let range = Condition::And(vec![
            Condition::Gt(Scalar::Int(10)),
            Condition::Le(Scalar::Double(20.0)),
        ]);

        assert!(range.evaluate(Some(&actual)).unwrap());
        assert!(!Condition::Lt(Scalar::Int(10)).evaluate(Some(&actual)).unwrap());
        assert!(!range.evaluate(None).unwrap());
        assert!(Condition::not(range).evaluate(None).unwrap());
    }

    #[test]
    fn test_incomparable_kinds_error() {
        let actual = Value::from("abc");
        let err = Condition::Gt(Scalar::Int(1))
            .evaluate(Some(&actual))
            .unwrap_err();
        assert!(matches!(err, FilterError::Incomparable { .. }));
    }

    #[test]
    fn test_regex_condition() {
        let actual = Value::from("ORD-0042");
        let order_id = Condition::regex(r"^ORD-\d+$").unwrap();
        assert!(order_id.evaluate(Some(&actual)).unwrap());
        assert!(!order_id.evaluate(Some(&Value::from("CXL-1"))).unwrap());
        assert!(!order_id.evaluate(Some(&Value::from(42))).unwrap());

        let err = Condition::regex("(").unwrap_err();
        assert!(matches!(err, FilterError::InvalidRegex { .. }));
    }

    #[test]
    fn test_in_condition() {
        let cond = Condition::In(vec![Scalar::Char('1'), Scalar::Char('2')]);
        assert!(cond.evaluate(Some(&Value::from('2'))).unwrap());
        assert!(!cond.evaluate(Some(&Value::from('3'))).unwrap());
    }

    #[test]
    fn test_size_condition_with_embedded_list() {
        let filter = FilterValue::expression_with_list(
            Condition::Size {
                min: Some(1),
                max: Some(2),
            },
            vec![Value::from("A")],
        );

        let actual = Value::List(vec![Value::from("A"), Value::from("B")]);
        let outcome = filter.validate(Some(&actual)).unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.embedded.map(|e| e.len()), Some(1));

        let too_long = Value::List(vec![1.into(), 2.into(), 3.into()]);
        let outcome = filter.validate(Some(&too_long)).unwrap();
        assert!(!outcome.passed);
        assert!(outcome.embedded.is_none());

        let err = filter.validate(Some(&Value::from(1))).unwrap_err();
        assert!(matches!(err, FilterError::NotAList(_)));
    }

    #[test]
    fn test_condition_display() {
        let cond = Condition::Or(vec![
            Condition::Eq(Scalar::Int(1)),
            Condition::not(Condition::regex("x").unwrap()),
        ]);
        assert_eq!(cond.to_string(), "(== 1) || (!(~ x))");
        assert_eq!(FilterValue::NotNull.condition(), "not null");
    }
}
