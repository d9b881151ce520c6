//! Serialization provider: element readers, comparator resolution, and the
//! default delegating element comparison.

use std::cmp::Ordering;
use std::sync::Arc;

use grist_common::{Result, RuntimeConfig};

use crate::codec::TupleReader;
use crate::compare::{
    ComparatorSpec, FieldComparatorRef, NaturalOrder, NaturalStreamingOrder, ReversedOrder,
    StreamComparator, ValueComparator,
};
use crate::fields::Fields;

/// Provider of element readers and comparator instances, bound to one task's
/// runtime configuration.
///
/// The element codec set carried by this core is fixed; the configuration is
/// still consulted at construction so stateful consumers keep the
/// configure-once-per-task lifecycle.
#[derive(Debug, Clone, Default)]
pub struct TupleSerialization;

impl TupleSerialization {
    /// Build a provider from a task's runtime configuration.
    pub fn from_config(_config: &RuntimeConfig) -> Self {
        Self
    }

    /// A fresh decode stream. Callers that compare two sides must take one
    /// reader per side so per-side deserialization never competes for a
    /// shared cursor.
    pub fn element_reader(&self) -> TupleReader {
        TupleReader::new()
    }

    /// Resolve one declared comparator spec into an instance.
    pub fn comparator_for(&self, spec: ComparatorSpec) -> FieldComparatorRef {
        match spec {
            ComparatorSpec::Natural => FieldComparatorRef::Value(Arc::new(NaturalOrder)),
            ComparatorSpec::Reversed => FieldComparatorRef::Value(Arc::new(ReversedOrder)),
            ComparatorSpec::NaturalStreaming => {
                FieldComparatorRef::Stream(Arc::new(NaturalStreamingOrder))
            }
        }
    }

    /// Resolve every comparator declared in a schema, preserving positions;
    /// `None` entries keep the default delegating comparison.
    pub fn resolve_comparators(&self, fields: &Fields) -> Vec<Option<FieldComparatorRef>> {
        fields
            .comparator_specs()
            .iter()
            .map(|spec| spec.map(|s| self.comparator_for(s)))
            .collect()
    }

    /// The default per-type element comparison used when a field declares no
    /// comparator.
    pub fn default_element_comparator(&self) -> DelegatingElementComparator {
        DelegatingElementComparator
    }
}

/// Default element comparison: decodes one element from each stream and
/// delegates to the cross-type total ordering of [`crate::Value`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DelegatingElementComparator;

impl ValueComparator for DelegatingElementComparator {
    fn compare_values(&self, lhs: &crate::Value, rhs: &crate::Value) -> Ordering {
        lhs.total_cmp(rhs)
    }
}

impl StreamComparator for DelegatingElementComparator {
    fn compare_streams(&self, lhs: &mut TupleReader, rhs: &mut TupleReader) -> Result<Ordering> {
        let left = lhs.read_value()?;
        let right = rhs.read_value()?;
        Ok(left.total_cmp(&right))
    }
}

#[cfg(test)]
mod tests {
    use grist_common::RuntimeConfig;

    use super::TupleSerialization;
    use crate::compare::{ComparatorSpec, FieldComparatorRef};
    use crate::fields::Fields;

    #[test]
    fn resolves_declared_specs_by_capability() {
        let serialization = TupleSerialization::from_config(&RuntimeConfig::new());
        let fields = Fields::new(["a", "b", "c"])
            .unwrap()
            .with_comparator("a", ComparatorSpec::Reversed)
            .unwrap()
            .with_comparator("c", ComparatorSpec::NaturalStreaming)
            .unwrap();

        let resolved = serialization.resolve_comparators(&fields);
        assert_eq!(resolved.len(), 3);
        assert!(matches!(resolved[0], Some(FieldComparatorRef::Value(_))));
        assert!(resolved[1].is_none());
        assert!(matches!(resolved[2], Some(FieldComparatorRef::Stream(_))));
    }
}
