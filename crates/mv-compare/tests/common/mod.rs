//! Shared builders for comparison tests
#![allow(dead_code)]

use mv_compare::{ComparisonResult, ResultNode, StatusType};
use mv_core::{Message, Value};
use tracing_subscriber::EnvFilter;

/// Enable log output when `RUST_LOG` is set
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Empty message in the `fix` namespace
pub fn msg(name: &str) -> Message {
    Message::new(name, "fix")
}

/// Repeating group entry with an id and a quantity
pub fn leg(id: i32, qty: i32) -> Value {
    Value::from(msg("Leg").with_field("id", id).with_field("qty", qty))
}

/// List value from anything convertible
pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Value {
    Value::List(items.into_iter().map(Into::into).collect())
}

/// Node at `path` below the root
pub fn node<'r>(result: &'r ComparisonResult, path: &[&str]) -> &'r ResultNode {
    let id = result
        .descend(result.root(), path)
        .unwrap_or_else(|| panic!("no result node at {:?}", path));
    result.node(id)
}

/// Aggregated status of the node at `path`
pub fn status_at(result: &ComparisonResult, path: &[&str]) -> StatusType {
    let id = result
        .descend(result.root(), path)
        .unwrap_or_else(|| panic!("no result node at {:?}", path));
    result.aggregate_status(id)
}
