//! Total ordering over serialized records for the shuffle/sort phase.

use std::cmp::Ordering;

use grist_common::metrics::global_metrics;
use grist_common::{GristError, Result, RuntimeConfig};
use grist_tuple::{FieldComparatorRef, Fields, Tuple, TupleReader, TupleSerialization};
use tracing::debug;

use crate::delegate::DelegatedComparator;

/// Configuration key holding the base64 grouping-schema blob.
pub const GROUP_COMPARATOR_KEY: &str = "grist.group.comparator";

/// Orders serialized records during the shuffle/sort phase, decoding only as
/// much of each record as the configured comparator chain requires.
///
/// Configured exactly once per task, then reused (mutated in place) for every
/// comparison that task makes. Never share one instance across tasks or
/// threads; concurrent sort merges each need their own.
pub struct RawTupleComparator {
    serialization: TupleSerialization,
    // two independent readers so per-side deserialization never competes
    // for one buffer or cursor
    lhs: TupleReader,
    rhs: TupleReader,
    comparators: Vec<DelegatedComparator>,
    comparisons: u64,
}

impl RawTupleComparator {
    /// Configure a comparator for the grouping key under the default
    /// configuration key.
    ///
    /// An empty configuration is a no-op: the result is `None` and the
    /// comparator stays unusable by construction.
    pub fn configure(config: &RuntimeConfig) -> Result<Option<Self>> {
        Self::configure_for(config, GROUP_COMPARATOR_KEY)
    }

    /// Configure a comparator whose schema blob lives under `key` (with the
    /// companion `<key>.size` fallback entry).
    pub fn configure_for(config: &RuntimeConfig, key: &str) -> Result<Option<Self>> {
        if config.is_empty() {
            return Ok(None);
        }

        let serialization = TupleSerialization::from_config(config);
        let declared = declared_comparators(config, key, &serialization)?;
        debug!(
            key,
            positions = declared.len(),
            "grouping comparator configured"
        );
        let comparators = declared
            .into_iter()
            .map(|field| DelegatedComparator::for_field(field, &serialization))
            .collect();

        Ok(Some(Self {
            lhs: serialization.element_reader(),
            rhs: serialization.element_reader(),
            serialization,
            comparators,
            comparisons: 0,
        }))
    }

    /// Number of grouping-key positions the comparator was configured with.
    pub fn positions(&self) -> usize {
        self.comparators.len()
    }

    /// Order two already-decoded tuples.
    ///
    /// A difference in arity settles the order immediately (shorter sorts
    /// before longer); otherwise the first non-zero per-position result
    /// wins, with position `i` compared by `comparators[i % positions]` —
    /// the modulo index deliberately lets a single declared comparator apply
    /// uniformly to every field.
    pub fn compare_tuples(&self, lhs: &Tuple, rhs: &Tuple) -> Ordering {
        let arity = lhs.len().cmp(&rhs.len());
        if arity != Ordering::Equal {
            return arity;
        }

        let left = lhs.values();
        let right = rhs.values();
        for i in 0..left.len() {
            let ord = self.comparators[i % self.comparators.len()]
                .compare_values(&left[i], &right[i]);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Order two serialized records without materializing them.
    ///
    /// Reads each side's element count straight from the stream header, then
    /// walks positions with the same modulo-indexed comparator chain as
    /// [`RawTupleComparator::compare_tuples`]; each position's comparator
    /// advances its own stream cursors by exactly one element.
    pub fn compare_serialized(&mut self, lhs: &[u8], rhs: &[u8]) -> Result<Ordering> {
        self.comparisons += 1;
        self.lhs.reset(lhs);
        self.rhs.reset(rhs);

        let left_len = self.lhs.num_elements()?;
        let right_len = self.rhs.num_elements()?;
        let arity = left_len.cmp(&right_len);
        if arity != Ordering::Equal {
            return Ok(arity);
        }

        for i in 0..left_len {
            let ord = self.comparators[i % self.comparators.len()]
                .compare_streams(&mut self.lhs, &mut self.rhs)?;
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }

    /// The serialization provider this comparator was configured with.
    pub fn serialization(&self) -> &TupleSerialization {
        &self.serialization
    }

    /// Publish the comparison counter to the global metrics registry; called
    /// once at task teardown.
    pub fn publish_metrics(&self) {
        global_metrics().record_raw_comparisons(self.comparisons);
    }
}

impl std::fmt::Debug for RawTupleComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawTupleComparator")
            .field("comparators", &self.comparators.len())
            .field("comparisons", &self.comparisons)
            .finish_non_exhaustive()
    }
}

fn declared_comparators(
    config: &RuntimeConfig,
    key: &str,
    serialization: &TupleSerialization,
) -> Result<Vec<Option<FieldComparatorRef>>> {
    match config.get(key) {
        None => {
            // size 0 would break the modulo index; one default entry minimum
            let size = config.get_usize(&format!("{key}.size"), 1).max(1);
            Ok(vec![None; size])
        }
        Some(blob) => {
            let fields = Fields::from_base64(blob).map_err(|e| GristError::ConfigDecode {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            // an empty schema would leave the modulo index with no divisor
            if fields.size() == 0 {
                return Err(GristError::ConfigDecode {
                    key: key.to_string(),
                    reason: "schema blob declares no fields".to_string(),
                });
            }
            Ok(serialization.resolve_comparators(&fields))
        }
    }
}
