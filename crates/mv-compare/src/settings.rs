//! Comparison settings
//!
//! [`CompareSettings`] is an immutable snapshot shared by every level of one
//! comparison. It is built through [`CompareSettingsBuilder`], which rejects
//! conflicting flags and invalid precisions before any comparison runs.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use mv_config::{ConfigError, ConfigNode, ConfigResult, SettingsDocument};
use mv_core::{Message, MessageStructure};

use crate::result::ComparisonResult;

/// Hook run after a successful top-level comparison
///
/// Hooks may rewrite statuses, typically to CONDITIONALLY_PASSED or
/// CONDITIONALLY_FAILED for known issues.
pub trait PostValidation: Send + Sync {
    fn post_validate(
        &self,
        actual: &Message,
        expected: &Message,
        settings: &CompareSettings,
        result: &mut ComparisonResult,
    );
}

/// Settings for one comparison
#[derive(Clone)]
pub struct CompareSettings {
    meta: ConfigNode,
    unchecked_fields: HashSet<String>,
    ignored_fields: HashSet<String>,
    check_groups_order: bool,
    check_simple_collections_order: bool,
    keep_result_group_order: bool,
    negative_map: IndexMap<String, bool>,
    structure: Option<MessageStructure>,
    post_validation: Option<Arc<dyn PostValidation>>,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            meta: ConfigNode::default(),
            unchecked_fields: HashSet::new(),
            ignored_fields: HashSet::new(),
            check_groups_order: false,
            check_simple_collections_order: true,
            keep_result_group_order: false,
            negative_map: IndexMap::new(),
            structure: None,
            post_validation: None,
        }
    }
}

impl fmt::Debug for CompareSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareSettings")
            .field("meta", &self.meta)
            .field("unchecked_fields", &self.unchecked_fields)
            .field("ignored_fields", &self.ignored_fields)
            .field("check_groups_order", &self.check_groups_order)
            .field(
                "check_simple_collections_order",
                &self.check_simple_collections_order,
            )
            .field("keep_result_group_order", &self.keep_result_group_order)
            .field("negative_map", &self.negative_map)
            .field("structure", &self.structure)
            .field("post_validation", &self.post_validation.is_some())
            .finish()
    }
}

impl CompareSettings {
    pub fn builder() -> CompareSettingsBuilder {
        CompareSettingsBuilder::default()
    }

    /// Build settings from a loaded settings document
    pub fn from_document(document: SettingsDocument) -> ConfigResult<Self> {
        let mut builder = Self::builder()
            .meta(document.meta)
            .unchecked_fields(document.unchecked_fields)
            .ignored_fields(document.ignored_fields)
            .check_groups_order(document.check_groups_order)
            .check_simple_collections_order(document.check_simple_collections_order)
            .keep_result_group_order(document.keep_result_group_order);
        builder.settings.negative_map = document.negative_map;
        builder.build()
    }

    /// Root of the configuration tree
    pub fn meta(&self) -> &ConfigNode {
        &self.meta
    }

    pub fn check_groups_order(&self) -> bool {
        self.check_groups_order
    }

    pub fn check_simple_collections_order(&self) -> bool {
        self.check_simple_collections_order
    }

    pub fn keep_result_group_order(&self) -> bool {
        self.keep_result_group_order
    }

    pub fn negative_map(&self) -> &IndexMap<String, bool> {
        &self.negative_map
    }

    pub fn structure(&self) -> Option<&MessageStructure> {
        self.structure.as_ref()
    }

    pub fn post_validation(&self) -> Option<&Arc<dyn PostValidation>> {
        self.post_validation.as_ref()
    }

    pub(crate) fn is_ignored(&self, field: &str) -> bool {
        self.ignored_fields.contains(field)
    }

    pub(crate) fn is_unchecked(&self, field: &str) -> bool {
        self.unchecked_fields.contains(field)
    }
}

/// Builder for [`CompareSettings`]
#[derive(Default)]
pub struct CompareSettingsBuilder {
    settings: CompareSettings,
}

impl CompareSettingsBuilder {
    pub fn meta(mut self, meta: ConfigNode) -> Self {
        self.settings.meta = meta;
        self
    }

    /// Compare the field for display only, forcing its subtree to NA
    pub fn unchecked_field(mut self, field: impl Into<String>) -> Self {
        self.settings.unchecked_fields.insert(field.into());
        self
    }

    pub fn unchecked_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings
            .unchecked_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Skip the field entirely
    pub fn ignored_field(mut self, field: impl Into<String>) -> Self {
        self.settings.ignored_fields.insert(field.into());
        self
    }

    pub fn ignored_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings
            .ignored_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn check_groups_order(mut self, check: bool) -> Self {
        self.settings.check_groups_order = check;
        self
    }

    pub fn check_simple_collections_order(mut self, check: bool) -> Self {
        self.settings.check_simple_collections_order = check;
        self
    }

    pub fn keep_result_group_order(mut self, keep: bool) -> Self {
        self.settings.keep_result_group_order = keep;
        self
    }

    /// Invert PASSED and FAILED for every node named `field`
    #[deprecated(note = "use a filter on the expected side instead")]
    pub fn negative_field(mut self, field: impl Into<String>) -> Self {
        self.settings.negative_map.insert(field.into(), true);
        self
    }

    /// Declared schema of the root message
    pub fn structure(mut self, structure: MessageStructure) -> Self {
        self.settings.structure = Some(structure);
        self
    }

    pub fn post_validation(mut self, hook: impl PostValidation + 'static) -> Self {
        self.settings.post_validation = Some(Arc::new(hook));
        self
    }

    /// Validate and build the settings
    pub fn build(self) -> ConfigResult<CompareSettings> {
        let settings = self.settings;
        if settings.keep_result_group_order && settings.check_groups_order {
            return Err(ConfigError::ConflictingOrderSettings);
        }
        settings.meta.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_defaults() {
        let settings = CompareSettings::builder().build().unwrap();

        assert!(settings.check_simple_collections_order());
        assert!(!settings.check_groups_order());
        assert!(!settings.keep_result_group_order());
        assert!(settings.structure().is_none());
    }

    #[test]
    fn test_conflicting_order_flags_are_rejected() {
        let err = CompareSettings::builder()
            .check_groups_order(true)
            .keep_result_group_order(true)
            .build()
            .unwrap_err();

        assert!(matches!(err, ConfigError::ConflictingOrderSettings));
    }

    #[test]
    fn test_invalid_precision_is_rejected() {
        let err = CompareSettings::builder()
            .meta(ConfigNode::new().with_double_precision("Price", Decimal::NEGATIVE_ONE))
            .build()
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidPrecision { .. }));
    }

    #[test]
    fn test_field_sets() {
        let settings = CompareSettings::builder()
            .unchecked_fields(["SendingTime", "MsgSeqNum"])
            .ignored_field("CheckSum")
            .build()
            .unwrap();

        assert!(settings.is_unchecked("SendingTime"));
        assert!(!settings.is_unchecked("CheckSum"));
        assert!(settings.is_ignored("CheckSum"));
    }

    #[test]
    fn test_from_document() {
        let mut document = SettingsDocument {
            check_simple_collections_order: false,
            ignored_fields: vec!["CheckSum".into()],
            ..Default::default()
        };
        document.negative_map.insert("Side".into(), true);

        let settings = CompareSettings::from_document(document).unwrap();
        assert!(!settings.check_simple_collections_order());
        assert!(settings.is_ignored("CheckSum"));
        assert_eq!(settings.negative_map().get("Side"), Some(&true));
    }
}
