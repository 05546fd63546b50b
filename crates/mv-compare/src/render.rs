//! Text and JSON renderings of a result tree

use std::fmt;

use serde_json::{json, Map, Value as JsonValue};

use crate::result::{ComparisonResult, NodeId};

impl ComparisonResult {
    /// Render the tree as nested JSON for report consumers
    ///
    /// Every node carries its aggregated status; own fields are included
    /// when set and children appear in insertion order.
    pub fn to_nested_json(&self) -> JsonValue {
        self.node_json(self.root())
    }

    fn node_json(&self, id: NodeId) -> JsonValue {
        let node = self.node(id);
        let mut object = match serde_json::to_value(node) {
            Ok(JsonValue::Object(object)) => object,
            _ => Map::new(),
        };
        object.insert("status".into(), json!(self.aggregate_status(id)));

        let children: Vec<_> = self.children(id).map(|c| self.node_json(c)).collect();
        if !children.is_empty() {
            object.insert("children".into(), JsonValue::Array(children));
        }
        JsonValue::Object(object)
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = self.node(id);
        write!(
            f,
            "{:indent$}[{:>9}] {}",
            "",
            self.aggregate_status(id).to_string(),
            node.name(),
            indent = depth * 3
        )?;
        if node.is_key() {
            write!(f, " (key)")?;
        }
        if node.expected().is_some() || node.actual().is_some() {
            write!(
                f,
                " : expected={} actual={}",
                node.expected().unwrap_or("-"),
                node.actual().unwrap_or("-")
            )?;
        }
        if let Some(error) = node.error() {
            write!(f, " ({})", error)?;
        }
        writeln!(f)?;

        for child in self.children(id) {
            self.write_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.root(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ResultNode, StatusType};

    fn sample() -> ComparisonResult {
        let mut tree = ComparisonResult::new(ResultNode::new("Order"));
        let root = tree.root();

        let mut id = ResultNode::new("ClOrdID").with_key(true);
        id.set_expected(Some("A1".into()));
        id.set_actual(Some("A1".into()));
        id.set_status(StatusType::Passed);
        tree.add_child(root, id).unwrap();

        let mut qty = ResultNode::new("Qty");
        qty.set_expected(Some("5".into()));
        qty.fail("type mismatch: expected int but actual is string");
        tree.add_child(root, qty).unwrap();
        tree
    }

    #[test]
    fn test_text_summary() {
        let text = sample().to_string();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "[   FAILED] Order");
        assert_eq!(lines[1], "   [   PASSED] ClOrdID (key) : expected=A1 actual=A1");
        assert_eq!(
            lines[2],
            "   [   FAILED] Qty : expected=5 actual=- (type mismatch: expected int but actual is string)"
        );
    }

    #[test]
    fn test_nested_json() {
        let doc = sample().to_nested_json();

        assert_eq!(doc["name"], "Order");
        assert_eq!(doc["status"], "FAILED");
        assert_eq!(doc["children"][0]["name"], "ClOrdID");
        assert_eq!(doc["children"][0]["is_key"], true);
        assert_eq!(doc["children"][1]["error"], "type mismatch: expected int but actual is string");
        assert!(doc["children"][1].get("actual").is_none());
        assert!(doc["children"][0].get("children").is_none());
    }
}
