//! Recursive comparison of an actual message against an expected pattern
//!
//! Every visited field or list element gets one [`ResultNode`]. Errors raised
//! while comparing a field are recorded on its node as FAILED and never stop
//! the comparison of its siblings.

mod lists;

use std::borrow::Cow;

use indexmap::IndexSet;
use mv_config::{ConfigNode, ConfigResult, FailUnexpected};
use mv_core::convention::{is_missing_convention, is_missing_sentinel, is_present_sentinel};
use mv_core::{FieldStructure, FilterValue, Message, MessageStructure, Value, ValueFilter};
use tracing::{debug, instrument, trace, warn};

use crate::aggregate::{apply_negative_map, force_na};
use crate::error::{CompareError, ResultResult};
use crate::result::{ComparisonResult, NodeId, ResultNode, StatusType};
use crate::scalar::{compare_scalars, RegexCache};
use crate::settings::CompareSettings;

/// Compare an actual message against an expected one
///
/// Returns `None` when the messages differ in name or namespace, or when a
/// declared key field of the root configuration does not match. Otherwise
/// the returned tree holds one node per visited field.
#[instrument(skip_all, fields(message = %expected))]
pub fn compare(
    actual: &Message,
    expected: &Message,
    settings: &CompareSettings,
) -> Option<ComparisonResult> {
    if !actual.same_identity(expected) {
        debug!(actual = %actual, "Message identity differs, no result");
        return None;
    }

    let mut comparator = Comparator::new(settings);
    match comparator.compare_root(actual, expected) {
        Ok(result) => result,
        Err(err) => {
            warn!("Comparison aborted: {}", err);
            None
        }
    }
}

/// Which fields of a message are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSet {
    All,
    KeysOnly,
}

/// Position of the value being compared
#[derive(Debug, Clone, Copy)]
enum Slot<'c> {
    /// Field `name` of a message configured by `config`
    Field { config: &'c ConfigNode, name: &'c str },

    /// Element `index` of the repeating field `name`
    Element {
        config: &'c ConfigNode,
        name: &'c str,
        index: usize,
    },
}

impl<'c> Slot<'c> {
    fn config(&self) -> &'c ConfigNode {
        match self {
            Slot::Field { config, .. } | Slot::Element { config, .. } => config,
        }
    }

    fn name(&self) -> &'c str {
        match self {
            Slot::Field { name, .. } | Slot::Element { name, .. } => name,
        }
    }

    /// Configuration for a message stored in this slot
    fn resolve(&self) -> ConfigResult<Cow<'c, ConfigNode>> {
        match *self {
            Slot::Field { config, name } => config.resolve_field(name),
            Slot::Element {
                config,
                name,
                index,
            } => Ok(config.resolve_element(name, index)),
        }
    }
}

/// State of one comparison call
pub(crate) struct Comparator<'s> {
    settings: &'s CompareSettings,
    regexes: RegexCache,
}

impl<'s> Comparator<'s> {
    pub(crate) fn new(settings: &'s CompareSettings) -> Self {
        Self {
            settings,
            regexes: RegexCache::new(),
        }
    }

    fn compare_root(
        &mut self,
        actual: &Message,
        expected: &Message,
    ) -> ResultResult<Option<ComparisonResult>> {
        let settings = self.settings;
        let meta = settings.meta();
        let structure = settings.structure();

        if meta.has_key_fields() && !self.keys_match(actual, expected, meta, structure)? {
            debug!("Key fields differ, no result");
            return Ok(None);
        }

        let mut root = ResultNode::new(expected.name());
        root.set_actual(Some(actual.to_string()));
        root.set_expected(Some(expected.to_string()));
        let mut result = ComparisonResult::new(root);
        let root = result.root();
        self.compare_message(&mut result, root, actual, expected, meta, structure, FieldSet::All)?;

        if !settings.negative_map().is_empty() {
            apply_negative_map(&mut result, settings.negative_map());
        }
        if let Some(hook) = settings.post_validation() {
            hook.post_validate(actual, expected, settings, &mut result);
        }

        debug!(status = %result.status(), nodes = result.len(), "Comparison finished");
        Ok(Some(result))
    }

    /// Compare only the declared key fields of `config`
    fn keys_match(
        &mut self,
        actual: &Message,
        expected: &Message,
        config: &ConfigNode,
        structure: Option<&MessageStructure>,
    ) -> ResultResult<bool> {
        let mut scratch = ComparisonResult::new(ResultNode::new(expected.name()));
        let root = scratch.root();
        self.compare_message(
            &mut scratch,
            root,
            actual,
            expected,
            config,
            structure,
            FieldSet::KeysOnly,
        )?;
        Ok(scratch.count_by_status(root, StatusType::Failed) == 0)
    }

    #[allow(clippy::too_many_arguments)]
    fn compare_message(
        &mut self,
        result: &mut ComparisonResult,
        parent: NodeId,
        actual: &Message,
        expected: &Message,
        config: &ConfigNode,
        structure: Option<&MessageStructure>,
        fields: FieldSet,
    ) -> ResultResult<()> {
        // Declared fields first, then anything else the values carry
        let names: IndexSet<&str> = match fields {
            FieldSet::KeysOnly => config.key_field_names().collect(),
            FieldSet::All => structure
                .into_iter()
                .flat_map(MessageStructure::field_names)
                .chain(actual.field_names())
                .chain(expected.field_names())
                .collect(),
        };

        for name in names {
            let node = ResultNode::new(name).with_key(config.is_key(name));
            let id = result.add_child(parent, node)?;
            let slot = Slot::Field { config, name };
            let declared = structure.and_then(|s| s.field(name));

            self.compare_values(result, id, actual.get(name), expected.get(name), slot, declared)?;

            // Key passes must see real statuses to reject a candidate
            if fields == FieldSet::All && self.settings.is_unchecked(name) {
                trace!(field = name, "Unchecked field, forcing NA");
                force_na(result, id);
            }
        }
        Ok(())
    }

    fn compare_values(
        &mut self,
        result: &mut ComparisonResult,
        id: NodeId,
        actual: Option<&Value>,
        expected: Option<&Value>,
        slot: Slot<'_>,
        structure: Option<&FieldStructure>,
    ) -> ResultResult<()> {
        let node = result.node_mut(id);
        node.set_actual(actual.map(Value::summary));
        node.set_expected(expected.map(Value::summary));

        if let Slot::Field { name, .. } = slot {
            if self.settings.is_ignored(name) {
                node.set_status(StatusType::Na);
                return Ok(());
            }
        }

        let status = match (actual, expected) {
            (_, Some(Value::Filter(filter))) => {
                return self.compare_filter(result, id, actual, filter, slot, structure);
            }
            (None, None) => StatusType::Na,
            (Some(_), None) => self.unexpected(slot),
            (None, Some(expected)) if is_missing_convention(expected) => StatusType::Passed,
            (None, Some(_)) => StatusType::Failed,
            (Some(actual), Some(expected)) => {
                return self.compare_present(result, id, actual, expected, slot, structure);
            }
        };
        result.node_mut(id).set_status(status);
        Ok(())
    }

    /// Status of a value present only on the actual side
    fn unexpected(&self, slot: Slot<'_>) -> StatusType {
        match (slot.config().fail_unexpected, slot) {
            (FailUnexpected::All, _) => StatusType::Failed,
            (FailUnexpected::Yes, Slot::Field { .. }) => StatusType::Failed,
            _ => StatusType::Na,
        }
    }

    fn compare_filter(
        &mut self,
        result: &mut ComparisonResult,
        id: NodeId,
        actual: Option<&Value>,
        filter: &FilterValue,
        slot: Slot<'_>,
        structure: Option<&FieldStructure>,
    ) -> ResultResult<()> {
        let outcome = match filter.validate(actual) {
            Ok(outcome) => outcome,
            Err(err) => {
                trace!(field = slot.name(), "Filter raised: {}", err);
                result.node_mut(id).fail(CompareError::from(err));
                return Ok(());
            }
        };

        if !outcome.passed {
            result.node_mut(id).set_status(StatusType::Failed);
            return Ok(());
        }

        if let (Some(pattern), Some(Value::List(items))) = (outcome.embedded, actual) {
            self.compare_lists(result, id, items, &pattern, slot, structure)?;
            if result.node(id).has_children() {
                return Ok(());
            }
        }
        result.node_mut(id).set_status(StatusType::Passed);
        Ok(())
    }

    fn compare_present(
        &mut self,
        result: &mut ComparisonResult,
        id: NodeId,
        actual: &Value,
        expected: &Value,
        slot: Slot<'_>,
        structure: Option<&FieldStructure>,
    ) -> ResultResult<()> {
        if let Value::Scalar(sentinel) = expected {
            if is_present_sentinel(sentinel) {
                result.node_mut(id).set_status(StatusType::Passed);
                return Ok(());
            }
            if is_missing_sentinel(sentinel) {
                result.node_mut(id).set_status(StatusType::Failed);
                return Ok(());
            }
        }

        if let Some(declared) = structure {
            if declared.value_kind() != expected.kind() {
                result.node_mut(id).fail(CompareError::StructureMismatch {
                    declared: declared.value_kind(),
                    expected: expected.kind(),
                });
                return Ok(());
            }
        }

        match (actual, expected) {
            (Value::Scalar(a), Value::Scalar(e)) => {
                let config = slot.config();
                let double = config.double_precision(slot.name());
                let system = config.system_precision(slot.name());
                let compared = compare_scalars(&mut self.regexes, a, e, double, system);

                let node = result.node_mut(id);
                node.set_precisions(double, system);
                match compared {
                    Ok(true) => node.set_status(StatusType::Passed),
                    Ok(false) => node.set_status(StatusType::Failed),
                    Err(err) => node.fail(err),
                }
                Ok(())
            }
            (Value::List(a), Value::List(e)) => {
                self.compare_lists(result, id, a, e, slot, structure)
            }
            (Value::Composite(a), Value::Composite(e)) => {
                let config = match slot.resolve() {
                    Ok(config) => config,
                    Err(err) => {
                        warn!(field = slot.name(), "Configuration lookup failed: {}", err);
                        result.node_mut(id).fail(CompareError::from(err));
                        return Ok(());
                    }
                };
                let nested = structure.and_then(FieldStructure::message_structure);
                self.compare_message(result, id, a, e, &config, nested, FieldSet::All)
            }
            _ => {
                result.node_mut(id).fail(CompareError::KindMismatch {
                    expected: expected.kind(),
                    actual: actual.kind(),
                });
                Ok(())
            }
        }
    }
}
