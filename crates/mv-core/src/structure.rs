//! Declared message structure
//!
//! A dictionary-derived description of a message: its fields in declaration
//! order, each with a kind and a collection flag. When supplied to a
//! comparison it fixes the field visiting order and the expected shape of
//! each field.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{ScalarKind, ValueKind};

/// Declared structure of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageStructure {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldStructure>,
}

impl MessageStructure {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            fields: IndexMap::new(),
        }
    }

    /// Declare a field, consuming and returning the structure
    pub fn with_field(mut self, name: impl Into<String>, field: FieldStructure) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Look up a declared field
    pub fn field(&self, name: &str) -> Option<&FieldStructure> {
        self.fields.get(name)
    }

    /// Iterate declared field names in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// What a declared field holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Simple(ScalarKind),
    Message(MessageStructure),
}

/// Declared shape of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStructure {
    pub kind: FieldKind,
    #[serde(default)]
    pub collection: bool,
}

impl FieldStructure {
    /// A single scalar field
    pub fn simple(kind: ScalarKind) -> Self {
        Self {
            kind: FieldKind::Simple(kind),
            collection: false,
        }
    }

    /// A single nested message
    pub fn message(structure: MessageStructure) -> Self {
        Self {
            kind: FieldKind::Message(structure),
            collection: false,
        }
    }

    /// Turn this field into a repeating one
    pub fn repeated(mut self) -> Self {
        self.collection = true;
        self
    }

    /// Value shape the field must have
    pub fn value_kind(&self) -> ValueKind {
        match (&self.kind, self.collection) {
            (_, true) => ValueKind::List,
            (FieldKind::Simple(_), false) => ValueKind::Scalar,
            (FieldKind::Message(_), false) => ValueKind::Composite,
        }
    }

    /// Shape of one element of a repeating field
    pub fn element(&self) -> FieldStructure {
        Self {
            kind: self.kind.clone(),
            collection: false,
        }
    }

    /// Nested message structure, if the field holds messages
    pub fn message_structure(&self) -> Option<&MessageStructure> {
        match &self.kind {
            FieldKind::Message(s) => Some(s),
            FieldKind::Simple(_) => None,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.kind, FieldKind::Message(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind() {
        let party = MessageStructure::new("Party", "fix")
            .with_field("id", FieldStructure::simple(ScalarKind::String));
        let parties = FieldStructure::message(party).repeated();

        assert_eq!(parties.value_kind(), ValueKind::List);
        assert_eq!(parties.element().value_kind(), ValueKind::Composite);
        assert!(parties.is_complex());
        assert_eq!(
            FieldStructure::simple(ScalarKind::Int).value_kind(),
            ValueKind::Scalar
        );
    }

    #[test]
    fn test_declared_order() {
        let s = MessageStructure::new("Order", "fix")
            .with_field("b", FieldStructure::simple(ScalarKind::Int))
            .with_field("a", FieldStructure::simple(ScalarKind::Int));
        assert_eq!(s.field_names().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
