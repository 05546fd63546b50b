//! Structural comparison of messages
//!
//! Compares an *actual* message produced by a system under test against an
//! *expected* pattern and builds a tree of per-field results.
//!
//! # Example
//!
//! ```ignore
//! use mv_compare::{compare, CompareSettings, StatusType};
//! use mv_config::ConfigNode;
//!
//! let settings = CompareSettings::builder()
//!     .meta(ConfigNode::new().with_key_field("ClOrdID"))
//!     .check_groups_order(false)
//!     .build()?;
//!
//! match compare(&actual, &expected, &settings) {
//!     Some(result) if result.status() == StatusType::Passed => {}
//!     Some(result) => println!("{}", result),
//!     None => println!("not a candidate"),
//! }
//! ```

mod aggregate;
mod comparator;
mod error;
mod render;
mod result;
mod scalar;
mod settings;

pub use aggregate::{
    aggregate_status, apply_negative_map, count_by_status, StatusCounts, NEGATION_PREFIX,
};
pub use comparator::compare;
pub use error::{CompareError, ResultError, ResultResult};
pub use result::{ComparisonResult, NodeId, ResultNode, StatusType};
pub use scalar::{DEFAULT_DOUBLE_PRECISION, REGEX_PREFIX, REGEX_SUFFIX};
pub use settings::{CompareSettings, CompareSettingsBuilder, PostValidation};
