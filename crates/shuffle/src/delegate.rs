//! Normalizes the three declared comparator shapes into one dispatch
//! protocol.

use std::cmp::Ordering;
use std::sync::Arc;

use grist_common::Result;
use grist_tuple::{
    DelegatingElementComparator, FieldComparatorRef, StreamComparator, TupleReader,
    TupleSerialization, Value, ValueComparator,
};

/// One grouping-key position's comparison strategy, adapted to a uniform
/// call shape.
///
/// Built once at configure time, one entry per declared field position:
/// - a stream-capable declaration passes the streams straight through;
/// - a plain value declaration decodes one element per side, then compares
///   the decoded values;
/// - no declaration falls back to the serialization provider's default
///   per-type comparison.
pub enum DelegatedComparator {
    /// Declared comparator compares the encoded streams directly.
    Stream(Arc<dyn StreamComparator>),
    /// Declared comparator compares decoded values only.
    Value(Arc<dyn ValueComparator>),
    /// No declaration: default delegating element comparison.
    Default(DelegatingElementComparator),
}

impl DelegatedComparator {
    /// Wrap one declared (or absent) field comparator.
    pub fn for_field(
        declared: Option<FieldComparatorRef>,
        serialization: &TupleSerialization,
    ) -> Self {
        match declared {
            Some(FieldComparatorRef::Stream(c)) => DelegatedComparator::Stream(c),
            Some(FieldComparatorRef::Value(c)) => DelegatedComparator::Value(c),
            None => DelegatedComparator::Default(serialization.default_element_comparator()),
        }
    }

    /// Compare two decoded values at this position.
    pub fn compare_values(&self, lhs: &Value, rhs: &Value) -> Ordering {
        match self {
            DelegatedComparator::Stream(c) => c.compare_values(lhs, rhs),
            DelegatedComparator::Value(c) => c.compare_values(lhs, rhs),
            DelegatedComparator::Default(c) => c.compare_values(lhs, rhs),
        }
    }

    /// Compare the next element of each stream, consuming exactly one
    /// element per side.
    pub fn compare_streams(
        &self,
        lhs: &mut TupleReader,
        rhs: &mut TupleReader,
    ) -> Result<Ordering> {
        match self {
            DelegatedComparator::Stream(c) => c.compare_streams(lhs, rhs),
            DelegatedComparator::Value(c) => {
                let left = lhs.read_value()?;
                let right = rhs.read_value()?;
                Ok(c.compare_values(&left, &right))
            }
            DelegatedComparator::Default(c) => c.compare_streams(lhs, rhs),
        }
    }
}
