//! Status roll-up and post-passes over a finished result tree

use indexmap::IndexMap;
use tracing::trace;

use crate::result::{ComparisonResult, NodeId, StatusType};

/// Number of nodes per status in a subtree
///
/// A node counts itself when it has an own status, plus everything below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
    pub conditionally_passed: usize,
    pub conditionally_failed: usize,
    pub na: usize,
}

impl StatusCounts {
    /// Count statuses in the subtree rooted at `id`
    pub fn collect(result: &ComparisonResult, id: NodeId) -> Self {
        let mut counts = Self::default();
        for node in result.descendants(id) {
            if let Some(status) = result.node(node).status() {
                counts.add(status);
            }
        }
        counts
    }

    fn add(&mut self, status: StatusType) {
        match status {
            StatusType::Passed => self.passed += 1,
            StatusType::Failed => self.failed += 1,
            StatusType::ConditionallyPassed => self.conditionally_passed += 1,
            StatusType::ConditionallyFailed => self.conditionally_failed += 1,
            StatusType::Na => self.na += 1,
        }
    }

    pub fn get(&self, status: StatusType) -> usize {
        match status {
            StatusType::Passed => self.passed,
            StatusType::Failed => self.failed,
            StatusType::ConditionallyPassed => self.conditionally_passed,
            StatusType::ConditionallyFailed => self.conditionally_failed,
            StatusType::Na => self.na,
        }
    }

    /// Strongest status present: FAILED > CONDITIONALLY_FAILED >
    /// CONDITIONALLY_PASSED > PASSED, NA when nothing else is present
    pub fn rolled_up(&self) -> StatusType {
        if self.failed > 0 {
            StatusType::Failed
        } else if self.conditionally_failed > 0 {
            StatusType::ConditionallyFailed
        } else if self.conditionally_passed > 0 {
            StatusType::ConditionallyPassed
        } else if self.passed > 0 {
            StatusType::Passed
        } else {
            StatusType::Na
        }
    }
}

/// Own status of a node, or the status rolled up from its subtree
pub fn aggregate_status(result: &ComparisonResult, id: NodeId) -> StatusType {
    match result.node(id).status() {
        Some(status) => status,
        None => StatusCounts::collect(result, id).rolled_up(),
    }
}

/// Count nodes with `status` in the subtree rooted at `id`
pub fn count_by_status(result: &ComparisonResult, id: NodeId, status: StatusType) -> usize {
    StatusCounts::collect(result, id).get(status)
}

/// Force every status in a subtree to NA
pub(crate) fn force_na(result: &mut ComparisonResult, id: NodeId) {
    for node in result.descendants(id) {
        let node = result.node_mut(node);
        if node.status().is_some() {
            node.set_status(StatusType::Na);
        }
    }
}

/// Marker prepended to the expected summary of an inverted node
pub const NEGATION_PREFIX: &str = "!";

/// Legacy negation pass
///
/// Deprecated. Runs over the whole finished tree: every node whose name is
/// mapped to `true` gets PASSED and FAILED swapped and its expected summary
/// prefixed with [`NEGATION_PREFIX`]. Nodes without an own status are left
/// alone.
pub fn apply_negative_map(result: &mut ComparisonResult, negative: &IndexMap<String, bool>) {
    let root = result.root();
    for id in result.descendants(root) {
        let node = result.node_mut(id);
        if !negative.get(node.name()).copied().unwrap_or(false) {
            continue;
        }
        let Some(status) = node.status() else {
            continue;
        };
        trace!(field = node.name(), %status, "Negating status");
        node.set_status(status.negated());
        let expected = node.expected().unwrap_or_default();
        let expected = format!("{}{}", NEGATION_PREFIX, expected);
        node.set_expected(Some(expected));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ResultNode;

    fn leaf(name: &str, status: StatusType) -> ResultNode {
        let mut node = ResultNode::new(name);
        node.set_status(status);
        node.set_expected(Some("X".into()));
        node
    }

    fn sample() -> ComparisonResult {
        let mut tree = ComparisonResult::new(ResultNode::new("Order"));
        let root = tree.root();
        tree.add_child(root, leaf("qty", StatusType::Passed)).unwrap();
        tree.add_child(root, leaf("side", StatusType::Na)).unwrap();
        let group = tree.add_child(root, ResultNode::new("Parties")).unwrap();
        tree.add_child(group, leaf("id", StatusType::ConditionallyPassed))
            .unwrap();
        tree
    }

    #[test]
    fn test_precedence() {
        let mut tree = sample();
        let root = tree.root();
        assert_eq!(aggregate_status(&tree, root), StatusType::ConditionallyPassed);

        tree.add_child(root, leaf("px", StatusType::ConditionallyFailed))
            .unwrap();
        assert_eq!(aggregate_status(&tree, root), StatusType::ConditionallyFailed);

        tree.add_child(root, leaf("acc", StatusType::Failed)).unwrap();
        assert_eq!(aggregate_status(&tree, root), StatusType::Failed);
    }

    #[test]
    fn test_empty_composite_is_na() {
        let tree = ComparisonResult::new(ResultNode::new("Heartbeat"));
        assert_eq!(tree.status(), StatusType::Na);
    }

    #[test]
    fn test_counts_cover_subtree() {
        let tree = sample();
        let root = tree.root();
        let counts = StatusCounts::collect(&tree, root);

        assert_eq!(counts.passed, 1);
        assert_eq!(counts.na, 1);
        assert_eq!(counts.conditionally_passed, 1);
        assert_eq!(count_by_status(&tree, root, StatusType::Failed), 0);

        let group = tree.child(root, "Parties").unwrap();
        assert_eq!(count_by_status(&tree, group, StatusType::Passed), 0);
    }

    #[test]
    fn test_force_na() {
        let mut tree = sample();
        let root = tree.root();
        force_na(&mut tree, root);

        assert_eq!(tree.status(), StatusType::Na);
        assert_eq!(tree.node(root).status(), None);
    }

    #[test]
    fn test_negative_map_inverts_named_leaves() {
        let mut tree = sample();
        let root = tree.root();
        let mut negative = IndexMap::new();
        negative.insert("qty".to_string(), true);
        negative.insert("side".to_string(), true);
        negative.insert("Parties".to_string(), true);

        apply_negative_map(&mut tree, &negative);

        let qty = tree.node(tree.child(root, "qty").unwrap());
        assert_eq!(qty.status(), Some(StatusType::Failed));
        assert_eq!(qty.expected(), Some("!X"));

        let side = tree.node(tree.child(root, "side").unwrap());
        assert_eq!(side.status(), Some(StatusType::Na));

        let parties = tree.node(tree.child(root, "Parties").unwrap());
        assert_eq!(parties.status(), None);
        assert_eq!(parties.expected(), None);
    }
}
