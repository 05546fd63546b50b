//! Core types for message verification
//!
//! This crate provides the data the comparison engine operates on:
//!
//! - [`Value`] - scalar, list, message or filter
//! - [`convention`] - reserved "present" / "missing" sentinel scalars
//! - [`FilterValue`] - expected-side predicates
//! - [`MessageStructure`] - optional declared schema of a message

pub mod convention;
mod filter;
mod structure;
mod value;

pub use filter::{
    Condition, ExpressionFilter, FilterError, FilterOutcome, FilterResult, FilterValue,
    ValueFilter,
};
pub use structure::{FieldKind, FieldStructure, MessageStructure};
pub use value::{Message, Scalar, ScalarKind, Value, ValueKind};
