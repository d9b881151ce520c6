//! Field comparison strategy contracts and the built-in strategies a schema
//! can declare.

use std::cmp::Ordering;
use std::sync::Arc;

use grist_common::Result;
use serde::{Deserialize, Serialize};

use crate::codec::TupleReader;
use crate::value::Value;

/// Object-level comparison over two decoded field values.
pub trait ValueComparator: Send + Sync {
    /// Order `lhs` relative to `rhs`.
    fn compare_values(&self, lhs: &Value, rhs: &Value) -> Ordering;
}

/// Stream-capable comparison: decides order directly against two decode
/// streams, advancing each cursor by exactly one element per call.
///
/// Every stream-capable comparator must also order decoded values the same
/// way, so the materialized and streamed comparison paths agree.
pub trait StreamComparator: ValueComparator {
    /// Order the next element of `lhs` relative to the next element of `rhs`,
    /// consuming one element from each stream.
    fn compare_streams(&self, lhs: &mut TupleReader, rhs: &mut TupleReader) -> Result<Ordering>;
}

/// Serializable identity of a declared per-field comparator.
///
/// Specs travel inside a [`Fields`](crate::Fields) blob through the runtime
/// configuration; the serialization provider resolves them into instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparatorSpec {
    /// Default ascending order ([`Value::total_cmp`]).
    Natural,
    /// Descending order.
    Reversed,
    /// Default ascending order, decided directly against the element streams.
    NaturalStreaming,
}

/// A resolved per-field comparator instance, tagged by capability.
#[derive(Clone)]
pub enum FieldComparatorRef {
    /// Plain object-level comparator.
    Value(Arc<dyn ValueComparator>),
    /// Stream-capable comparator.
    Stream(Arc<dyn StreamComparator>),
}

/// Ascending [`Value::total_cmp`] order.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalOrder;

impl ValueComparator for NaturalOrder {
    fn compare_values(&self, lhs: &Value, rhs: &Value) -> Ordering {
        lhs.total_cmp(rhs)
    }
}

/// Descending [`Value::total_cmp`] order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReversedOrder;

impl ValueComparator for ReversedOrder {
    fn compare_values(&self, lhs: &Value, rhs: &Value) -> Ordering {
        rhs.total_cmp(lhs)
    }
}

/// Ascending order decided against the streams themselves.
///
/// Decodes exactly one element per side from the cursor it is handed, so the
/// outer comparator never has to materialize the record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalStreamingOrder;

impl ValueComparator for NaturalStreamingOrder {
    fn compare_values(&self, lhs: &Value, rhs: &Value) -> Ordering {
        lhs.total_cmp(rhs)
    }
}

impl StreamComparator for NaturalStreamingOrder {
    fn compare_streams(&self, lhs: &mut TupleReader, rhs: &mut TupleReader) -> Result<Ordering> {
        let left = lhs.read_value()?;
        let right = rhs.read_value()?;
        Ok(left.total_cmp(&right))
    }
}
