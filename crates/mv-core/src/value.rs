//! Structured values produced by protocol codecs and script compilers
//!
//! A [`Value`] is either a typed [`Scalar`], an ordered list, a named
//! [`Message`] (composite), or a [`FilterValue`]. Filters only ever appear on
//! the expected side of a comparison.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::filter::{FilterValue, ValueFilter};

/// Closed set of primitive kinds a scalar can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Char,
    String,
    Date,
    Time,
    DateTime,
}

impl ScalarKind {
    /// Binary floating point kinds, compared with an absolute tolerance
    pub fn is_floating(self) -> bool {
        matches!(self, ScalarKind::Float | ScalarKind::Double)
    }

    /// Kinds that can be converted to a decimal
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ScalarKind::Int
                | ScalarKind::Long
                | ScalarKind::Float
                | ScalarKind::Double
                | ScalarKind::Decimal
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Char => "char",
            ScalarKind::String => "string",
            ScalarKind::Date => "date",
            ScalarKind::Time => "time",
            ScalarKind::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// A typed primitive value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Scalar {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Char(char),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Scalar {
    /// Get the kind tag of this scalar
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Long(_) => ScalarKind::Long,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Double(_) => ScalarKind::Double,
            Scalar::Decimal(_) => ScalarKind::Decimal,
            Scalar::Char(_) => ScalarKind::Char,
            Scalar::String(_) => ScalarKind::String,
            Scalar::Date(_) => ScalarKind::Date,
            Scalar::Time(_) => ScalarKind::Time,
            Scalar::DateTime(_) => ScalarKind::DateTime,
        }
    }

    /// Convert a numeric scalar to a decimal
    ///
    /// Returns `None` for non-numeric kinds and for floats that have no
    /// decimal representation (NaN, infinities, out of range).
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Scalar::Int(v) => Some(Decimal::from(*v)),
            Scalar::Long(v) => Some(Decimal::from(*v)),
            Scalar::Float(v) => Decimal::from_f32(*v),
            Scalar::Double(v) => Decimal::from_f64(*v),
            Scalar::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert a numeric scalar to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(f64::from(*v)),
            Scalar::Long(v) => v.to_f64(),
            Scalar::Float(v) => Some(f64::from(*v)),
            Scalar::Double(v) => Some(*v),
            Scalar::Decimal(v) => v.to_f64(),
            _ => None,
        }
    }

    /// Get the string payload, if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Order two scalars for expression filters
    ///
    /// Numeric kinds are ordered by value across kinds. Other kinds are only
    /// ordered against the same kind.
    pub fn compare_to(&self, other: &Scalar) -> Option<Ordering> {
        if self.kind().is_numeric() && other.kind().is_numeric() {
            return match (self.as_decimal(), other.as_decimal()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
            };
        }
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Char(a), Scalar::Char(b)) => Some(a.cmp(b)),
            (Scalar::String(a), Scalar::String(b)) => Some(a.cmp(b)),
            (Scalar::Date(a), Scalar::Date(b)) => Some(a.cmp(b)),
            (Scalar::Time(a), Scalar::Time(b)) => Some(a.cmp(b)),
            (Scalar::DateTime(a), Scalar::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Long(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Double(v) => write!(f, "{}", v),
            Scalar::Decimal(v) => write!(f, "{}", v),
            Scalar::Char(v) => write!(f, "{}", v),
            Scalar::String(v) => f.write_str(v),
            Scalar::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Scalar::Time(v) => write!(f, "{}", v.format("%H:%M:%S%.f")),
            Scalar::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

/// Shape of a value, used for kind dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    List,
    Composite,
    Filter,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Scalar => write!(f, "scalar"),
            ValueKind::List => write!(f, "list"),
            ValueKind::Composite => write!(f, "message"),
            ValueKind::Filter => write!(f, "filter"),
        }
    }
}

/// A structured value
///
/// Values are built bottom-up and never reference themselves.
#[derive(Debug, Clone)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Value>),
    Composite(Message),
    Filter(FilterValue),
}

impl Value {
    /// Get the shape of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::List(_) => ValueKind::List,
            Value::Composite(_) => ValueKind::Composite,
            Value::Filter(_) => ValueKind::Filter,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Composite(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_filter(&self) -> Option<&FilterValue> {
        match self {
            Value::Filter(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Composite(_))
    }

    /// One-line summary used in comparison results
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{} items]", items.len()),
            Value::Composite(m) => write!(f, "{}", m),
            Value::Filter(filter) => write!(f, "{}", filter.condition()),
        }
    }
}

/// A named composite value with ordered fields
#[derive(Debug, Clone)]
pub struct Message {
    name: String,
    namespace: String,
    fields: IndexMap<String, Value>,
}

impl Message {
    /// Create an empty message
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            fields: IndexMap::new(),
        }
    }

    /// Add a field, consuming and returning the message
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field, keeping its original position on replace
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get a field value by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check that two messages share name and namespace
    pub fn same_identity(&self, other: &Message) -> bool {
        self.name == other.name && self.namespace == other.namespace
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.namespace, self.name)
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(v))
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    char => Char,
    String => String,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::String(v.to_string()))
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

impl From<Message> for Value {
    fn from(v: Message) -> Self {
        Value::Composite(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<FilterValue> for Value {
    fn from(v: FilterValue) -> Self {
        Value::Filter(v)
    }
}
