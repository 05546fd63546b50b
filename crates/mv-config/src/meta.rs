//! Hierarchical per-field comparison configuration
//!
//! A [`ConfigNode`] carries overrides for the fields of one message level:
//! numeric tolerances, key-field declarations and the unexpected-field
//! policy. Children are keyed by field name and hold a list of nodes, one per
//! element position when the field repeats.
//!
//! Resolution rules:
//! - a message field uses its single child node
//! - a list element uses the child node at its position
//! - anything else falls back to the parent node with its key-field
//!   declarations stripped, so keys never leak into nested levels

use std::borrow::Cow;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Policy for fields present in actual but not in expected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailUnexpected {
    /// Unexpected fields are reported as NA
    #[default]
    #[serde(alias = "N")]
    No,

    /// Unexpected message fields fail; extra list elements stay NA
    #[serde(alias = "Y")]
    Yes,

    /// Every unexpected field or element fails, on every nested level
    #[serde(alias = "A")]
    All,
}

/// Configuration for one message level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigNode {
    /// Absolute tolerance for floating and decimal fields
    pub double_precision: IndexMap<String, Decimal>,

    /// Step every actual value of the field must be a multiple of
    pub system_precision: IndexMap<String, Decimal>,

    /// Key-field declarations; `false` explicitly marks a non-key field
    pub key_fields: IndexMap<String, bool>,

    pub fail_unexpected: FailUnexpected,

    /// Nested configuration, positional for repeating fields
    pub children: IndexMap<String, Vec<ConfigNode>>,
}

impl ConfigNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_double_precision(mut self, field: impl Into<String>, precision: Decimal) -> Self {
        self.double_precision.insert(field.into(), precision);
        self
    }

    pub fn with_system_precision(mut self, field: impl Into<String>, precision: Decimal) -> Self {
        self.system_precision.insert(field.into(), precision);
        self
    }

    /// Declare a key field
    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_fields.insert(field.into(), true);
        self
    }

    /// Explicitly declare a field as not being a key
    pub fn with_non_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_fields.insert(field.into(), false);
        self
    }

    pub fn with_fail_unexpected(mut self, policy: FailUnexpected) -> Self {
        self.fail_unexpected = policy;
        self
    }

    /// Append a child node for a field (one per list position)
    pub fn with_child(mut self, field: impl Into<String>, child: ConfigNode) -> Self {
        self.children.entry(field.into()).or_default().push(child);
        self
    }

    pub fn double_precision(&self, field: &str) -> Option<Decimal> {
        self.double_precision.get(field).copied()
    }

    pub fn system_precision(&self, field: &str) -> Option<Decimal> {
        self.system_precision.get(field).copied()
    }

    /// Check whether a field is declared as a key
    pub fn is_key(&self, field: &str) -> bool {
        self.key_fields.get(field).copied().unwrap_or(false)
    }

    /// Iterate declared key fields in declaration order
    pub fn key_field_names(&self) -> impl Iterator<Item = &str> {
        self.key_fields
            .iter()
            .filter(|(_, key)| **key)
            .map(|(name, _)| name.as_str())
    }

    pub fn has_key_fields(&self) -> bool {
        self.key_fields.values().any(|key| *key)
    }

    /// Copy of this node without key-field declarations
    pub fn without_key_fields(&self) -> ConfigNode {
        ConfigNode {
            key_fields: IndexMap::new(),
            ..self.clone()
        }
    }

    /// Resolve the configuration for a nested message field
    ///
    /// Fails when the field declares zero or several nodes, since a single
    /// message field can only be configured once.
    pub fn resolve_field(&self, field: &str) -> ConfigResult<Cow<'_, ConfigNode>> {
        match self.children.get(field).map(Vec::as_slice) {
            None if self.has_key_fields() => Ok(Cow::Owned(self.without_key_fields())),
            None => Ok(Cow::Borrowed(self)),
            Some([child]) => Ok(self.inherit_policy(child)),
            Some(nodes) => Err(ConfigError::AmbiguousFieldConfig {
                field: field.to_string(),
                count: nodes.len(),
            }),
        }
    }

    /// Resolve the configuration for element `index` of a repeating field
    pub fn resolve_element(&self, field: &str, index: usize) -> Cow<'_, ConfigNode> {
        match self.children.get(field).and_then(|nodes| nodes.get(index)) {
            Some(child) => self.inherit_policy(child),
            None => Cow::Owned(self.without_key_fields()),
        }
    }

    // `All` reaches every nested level unless a child sets its own policy.
    fn inherit_policy<'a>(&self, child: &'a ConfigNode) -> Cow<'a, ConfigNode> {
        if self.fail_unexpected == FailUnexpected::All
            && child.fail_unexpected == FailUnexpected::No
        {
            let mut owned = child.clone();
            owned.fail_unexpected = FailUnexpected::All;
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(child)
        }
    }

    /// Check precisions across the whole tree
    pub fn validate(&self) -> ConfigResult<()> {
        check_precisions(&self.double_precision, "double")?;
        check_precisions(&self.system_precision, "system")?;
        for child in self.children.values().flatten() {
            child.validate()?;
        }
        Ok(())
    }
}

fn check_precisions(map: &IndexMap<String, Decimal>, kind: &'static str) -> ConfigResult<()> {
    match map.iter().find(|(_, value)| **value <= Decimal::ZERO) {
        Some((field, value)) => Err(ConfigError::InvalidPrecision {
            field: field.clone(),
            kind,
            value: *value,
        }),
        None => Ok(()),
    }
}
