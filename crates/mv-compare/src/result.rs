//! Comparison result tree
//!
//! Results live in an arena: nodes are addressed by [`NodeId`], children are
//! kept per node in insertion order, and parent links are stored in a
//! separate index so the tree has no ownership cycles.

use std::fmt;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{self, StatusCounts};
use crate::error::{ResultError, ResultResult};

/// Verification status of a result node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusType {
    Passed,
    Failed,
    ConditionallyPassed,
    ConditionallyFailed,
    Na,
}

impl StatusType {
    /// Swap PASSED and FAILED, leaving other statuses alone
    pub fn negated(self) -> Self {
        match self {
            StatusType::Passed => StatusType::Failed,
            StatusType::Failed => StatusType::Passed,
            other => other,
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusType::Passed => write!(f, "PASSED"),
            StatusType::Failed => write!(f, "FAILED"),
            StatusType::ConditionallyPassed => write!(f, "CONDITIONALLY_PASSED"),
            StatusType::ConditionallyFailed => write!(f, "CONDITIONALLY_FAILED"),
            StatusType::Na => write!(f, "NA"),
        }
    }
}

/// Index of a node inside a [`ComparisonResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One visited field or list element
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultNode {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<StatusType>,
    is_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    double_precision: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_precision: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip)]
    children: IndexMap<String, NodeId>,
}

impl ResultNode {
    /// Create a node without status
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_key(mut self, is_key: bool) -> Self {
        self.is_key = is_key;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actual(&self) -> Option<&str> {
        self.actual.as_deref()
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    /// Own status; `None` for nodes whose status comes from their children
    pub fn status(&self) -> Option<StatusType> {
        self.status
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    pub fn double_precision(&self) -> Option<Decimal> {
        self.double_precision
    }

    pub fn system_precision(&self) -> Option<Decimal> {
        self.system_precision
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Iterate child names in insertion order
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn set_status(&mut self, status: StatusType) {
        self.status = Some(status);
    }

    pub fn set_actual(&mut self, actual: Option<String>) {
        self.actual = actual;
    }

    pub fn set_expected(&mut self, expected: Option<String>) {
        self.expected = expected;
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn set_precisions(&mut self, double: Option<Decimal>, system: Option<Decimal>) {
        self.double_precision = double;
        self.system_precision = system;
    }

    /// Mark the node FAILED with an error message
    pub fn fail(&mut self, error: impl fmt::Display) {
        self.status = Some(StatusType::Failed);
        self.error = Some(error.to_string());
    }
}

/// Tree of results produced by one comparison
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    nodes: Vec<ResultNode>,
    parents: Vec<Option<NodeId>>,
}

impl ComparisonResult {
    /// Create a tree holding only `root`
    pub fn new(root: ResultNode) -> Self {
        Self {
            nodes: vec![root],
            parents: vec![None],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&ResultNode> {
        self.nodes.get(id.0)
    }

    /// Get a node
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &ResultNode {
        &self.nodes[id.0]
    }

    /// Get a node for modification
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node_mut(&mut self, id: NodeId) -> &mut ResultNode {
        &mut self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.0).copied().flatten()
    }

    /// Get a child by name
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.get(id)?.children.get(name).copied()
    }

    /// Follow a path of child names from `id`
    pub fn descend(&self, id: NodeId, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(id, |current, name| self.child(current, name))
    }

    /// Iterate children in insertion order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0].children.values().copied()
    }

    /// Names from the root down to `id`, root excluded
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            path.push(self.nodes[current.0].name.as_str());
            current = parent;
        }
        path.reverse();
        path
    }

    /// `id` and all of its descendants in depth-first pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            let children: Vec<_> = self.children(current).collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Append a child under `parent`
    ///
    /// Child names are unique among siblings.
    pub fn add_child(&mut self, parent: NodeId, node: ResultNode) -> ResultResult<NodeId> {
        self.check_free(parent, &node.name)?;
        let id = NodeId(self.nodes.len());
        self.nodes[parent.0].children.insert(node.name.clone(), id);
        self.nodes.push(node);
        self.parents.push(Some(parent));
        Ok(id)
    }

    /// Move another tree under `parent`, renaming its root to `name`
    pub fn graft(
        &mut self,
        parent: NodeId,
        name: &str,
        other: ComparisonResult,
    ) -> ResultResult<NodeId> {
        self.check_free(parent, name)?;
        let offset = self.nodes.len();
        let shift = |id: NodeId| NodeId(id.0 + offset);

        for (index, (mut node, node_parent)) in
            other.nodes.into_iter().zip(other.parents).enumerate()
        {
            for child in node.children.values_mut() {
                *child = shift(*child);
            }
            if index == 0 {
                node.name = name.to_string();
            }
            self.nodes.push(node);
            self.parents.push(Some(node_parent.map_or(parent, &shift)));
        }

        let root = NodeId(offset);
        self.nodes[parent.0].children.insert(name.to_string(), root);
        Ok(root)
    }

    fn check_free(&self, parent: NodeId, name: &str) -> ResultResult<()> {
        let parent_node = &self.nodes[parent.0];
        if parent_node.children.contains_key(name) {
            return Err(ResultError::DuplicateChild {
                parent: parent_node.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Own status, or the status rolled up from the subtree
    pub fn aggregate_status(&self, id: NodeId) -> StatusType {
        aggregate::aggregate_status(self, id)
    }

    /// Count nodes with `status` in the subtree rooted at `id`
    pub fn count_by_status(&self, id: NodeId, status: StatusType) -> usize {
        StatusCounts::collect(self, id).get(status)
    }

    /// Overall status of the comparison
    pub fn status(&self) -> StatusType {
        self.aggregate_status(self.root())
    }
}
