//! One node of the per-record operator execution chain.

use std::fmt;
use std::sync::Arc;

use grist_common::{GristError, Result};
use grist_tuple::{codec, Fields, Tuple, TupleEntry};

use crate::collector::{OutputCollector, TrapSink};
use crate::node::{FlowNode, NodeRole, Scope};

/// A per-record operator applied by one stack element.
///
/// Results are emitted through the element's collect path; faults surface as
/// errors and are classified by the stack driver.
pub trait RecordOperator: Send {
    /// Process one record, emitting any results through `output`.
    fn operate(&mut self, entry: &TupleEntry, output: &mut Emitter<'_>) -> Result<()>;
}

impl<F> RecordOperator for F
where
    F: FnMut(&TupleEntry, &mut Emitter<'_>) -> Result<()> + Send,
{
    fn operate(&mut self, entry: &TupleEntry, output: &mut Emitter<'_>) -> Result<()> {
        self(entry, output)
    }
}

/// The collect path handed to a wrapped operator.
///
/// Routes emissions to the element's terminal output when one is installed
/// (tail element), otherwise to the buffer feeding the next element.
pub struct Emitter<'a> {
    last_output: Option<&'a mut dyn OutputCollector>,
    downstream: &'a mut Vec<Tuple>,
    emitted: u64,
}

impl Emitter<'_> {
    /// Emit one result record downstream.
    ///
    /// An empty result is never a valid emission and fails with
    /// [`GristError::InvalidRecord`].
    pub fn collect(&mut self, tuple: Tuple) -> Result<()> {
        if tuple.is_empty() {
            return Err(GristError::InvalidRecord(
                "may not collect an empty tuple".to_string(),
            ));
        }
        match self.last_output.as_mut() {
            Some(out) => out.collect(tuple)?,
            None => self.downstream.push(tuple),
        }
        self.emitted += 1;
        Ok(())
    }
}

struct Trap {
    name: String,
    sink: Box<dyn TrapSink>,
}

/// One element of the operator stack: applies a pipeline operator to a stream
/// of records, forwarding results downstream and exposing a trap for fault
/// diversion.
///
/// Constructed once per task at assembly time, reused for every record, and
/// discarded at task teardown. The incoming schema and the record view are
/// resolved lazily and cached so the per-record path allocates nothing.
pub struct StackElement {
    node: Arc<dyn FlowNode>,
    operator: Box<dyn RecordOperator>,
    scope: Scope,
    role: NodeRole,
    trap: Option<Trap>,
    incoming_fields: Option<Fields>,
    entry: Option<TupleEntry>,
    last_output: Option<Box<dyn OutputCollector>>,
    records_in: u64,
    records_out: u64,
    records_trapped: u64,
}

impl StackElement {
    /// Create an element wrapping `node` and its per-record `operator`.
    pub fn new(
        node: Arc<dyn FlowNode>,
        operator: Box<dyn RecordOperator>,
        scope: Scope,
        role: NodeRole,
    ) -> Self {
        Self {
            node,
            operator,
            scope,
            role,
            trap: None,
            incoming_fields: None,
            entry: None,
            last_output: None,
            records_in: 0,
            records_out: 0,
            records_trapped: 0,
        }
    }

    /// Attach a named trap sink; faulting records are diverted there instead
    /// of failing the task.
    pub fn with_trap(mut self, name: impl Into<String>, sink: Box<dyn TrapSink>) -> Self {
        self.trap = Some(Trap {
            name: name.into(),
            sink,
        });
        self
    }

    /// Install the terminal output destination. Only the tail element of a
    /// chain writes to it.
    pub fn set_last_output(&mut self, collector: Box<dyn OutputCollector>) {
        self.last_output = Some(collector);
    }

    /// This element's role tag.
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Name of the configured trap, if any.
    pub fn trap_name(&self) -> Option<&str> {
        self.trap.as_ref().map(|t| t.name.as_str())
    }

    /// True when a terminal output destination is installed.
    pub fn has_last_output(&self) -> bool {
        self.last_output.is_some()
    }

    /// Description of the wrapped pipeline node, for diagnostics.
    pub fn description(&self) -> String {
        self.node.description()
    }

    /// Schema of the tuples this element receives.
    ///
    /// Resolved against the bound scope on first call; later calls return
    /// the cached value without touching the node.
    pub fn resolve_incoming_fields(&mut self) -> Result<&Fields> {
        if self.incoming_fields.is_none() {
            let resolved = self.node.resolve_fields(&self.scope)?;
            self.incoming_fields = Some(resolved);
        }
        Ok(self
            .incoming_fields
            .as_ref()
            .expect("incoming fields cached above"))
    }

    /// Schema-bound view over `tuple`.
    ///
    /// The entry is constructed on first use and mutated in place for every
    /// later record; this keeps the hot path allocation-free.
    pub fn tuple_entry(&mut self, tuple: Tuple) -> Result<&TupleEntry> {
        if self.entry.is_none() {
            let fields = self.resolve_incoming_fields()?.clone();
            self.entry = Some(TupleEntry::new(fields));
        }
        let entry = self.entry.as_mut().expect("entry cached above");
        entry.set_tuple(tuple);
        Ok(&*entry)
    }

    /// Decode a raw key/value pair into a record.
    ///
    /// Only [`NodeRole::Source`] elements support this shape; invoking it on
    /// any other element indicates a mis-assembled pipeline.
    pub fn source(&mut self, _key: &[u8], value: &[u8]) -> Result<Tuple> {
        if self.role != NodeRole::Source {
            return Err(GristError::UnsupportedRole(format!(
                "{} cannot act as a record source",
                self.description()
            )));
        }
        codec::deserialize_tuple(value)
    }

    /// Grouped/iterator-based collect.
    ///
    /// Group-aware elements belong to the reduce stage; no element of a
    /// map-phase chain supports this shape.
    pub fn collect_grouped(
        &mut self,
        _key: &Tuple,
        _records: &mut dyn Iterator<Item = Tuple>,
    ) -> Result<()> {
        Err(GristError::UnsupportedRole(format!(
            "{} is not group-aware",
            self.description()
        )))
    }

    /// Run the wrapped operator against one record, pushing emissions into
    /// `downstream` (or the terminal output when installed).
    ///
    /// Returns the number of records emitted.
    pub fn apply(&mut self, record: Tuple, downstream: &mut Vec<Tuple>) -> Result<u64> {
        self.records_in += 1;

        if self.entry.is_none() {
            let fields = self.resolve_incoming_fields()?.clone();
            self.entry = Some(TupleEntry::new(fields));
        }
        let entry = self.entry.as_mut().expect("entry cached above");
        entry.set_tuple(record);

        let mut emitter = Emitter {
            last_output: self
                .last_output
                .as_mut()
                .map(|out| &mut **out as &mut dyn OutputCollector),
            downstream,
            emitted: 0,
        };
        self.operator.operate(&*entry, &mut emitter)?;

        let emitted = emitter.emitted;
        self.records_out += emitted;
        Ok(emitted)
    }

    /// Divert the record currently held by this element to its trap sink in
    /// serialized form.
    ///
    /// Returns the trap name when a capture happened, `None` when no trap is
    /// configured.
    pub fn divert_current_record(&mut self) -> Result<Option<&str>> {
        let Some(trap) = self.trap.as_mut() else {
            return Ok(None);
        };
        let Some(entry) = self.entry.as_ref() else {
            return Ok(None);
        };
        let bytes = codec::serialize_tuple(entry.tuple());
        trap.sink.capture(&bytes)?;
        self.records_trapped += 1;
        Ok(Some(trap.name.as_str()))
    }

    /// Lifetime record counters: `(in, out, trapped)`.
    pub fn record_counts(&self) -> (u64, u64, u64) {
        (self.records_in, self.records_out, self.records_trapped)
    }
}

impl fmt::Display for StackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node.description())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use grist_common::{GristError, Result};
    use grist_tuple::{codec, Fields, Tuple, TupleEntry, Value};

    use super::{Emitter, StackElement};
    use crate::collector::MemoryTrapSink;
    use crate::node::{FlowNode, NodeRole, Scope};

    struct SpyNode {
        resolutions: AtomicUsize,
    }

    impl SpyNode {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                resolutions: AtomicUsize::new(0),
            })
        }
    }

    impl FlowNode for SpyNode {
        fn resolve_fields(&self, scope: &Scope) -> Result<Fields> {
            self.resolutions.fetch_add(1, Ordering::SeqCst);
            Ok(scope.outgoing_fields().clone())
        }

        fn description(&self) -> String {
            "Each(spy)".to_string()
        }
    }

    fn passthrough() -> Box<dyn super::RecordOperator> {
        Box::new(|entry: &TupleEntry, output: &mut Emitter<'_>| {
            output.collect(entry.tuple().clone())
        })
    }

    fn scope() -> Scope {
        Scope::new("spy->next", Fields::new(["name", "age"]).unwrap())
    }

    #[test]
    fn incoming_fields_resolve_exactly_once() {
        let node = SpyNode::new();
        let mut element =
            StackElement::new(node.clone(), passthrough(), scope(), NodeRole::Operate);

        let first = element.resolve_incoming_fields().unwrap().clone();
        let second = element.resolve_incoming_fields().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(node.resolutions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tuple_entry_is_reused_across_records() {
        let node = SpyNode::new();
        let mut element =
            StackElement::new(node.clone(), passthrough(), scope(), NodeRole::Operate);

        let t1 = Tuple::new(vec![Value::Text("alice".into()), Value::Int(30)]);
        let t2 = Tuple::new(vec![Value::Text("bob".into()), Value::Int(25)]);
        assert_eq!(element.tuple_entry(t1).unwrap().tuple().len(), 2);
        let entry = element.tuple_entry(t2.clone()).unwrap();
        assert_eq!(entry.tuple(), &t2);
        // entry construction resolved fields once; swaps did not re-resolve
        assert_eq!(node.resolutions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_emission_is_an_invalid_record() {
        let operator = Box::new(|_: &TupleEntry, output: &mut Emitter<'_>| {
            output.collect(Tuple::default())
        });
        let mut element = StackElement::new(SpyNode::new(), operator, scope(), NodeRole::Operate);

        let record = Tuple::new(vec![Value::Text("alice".into()), Value::Int(30)]);
        let mut downstream = Vec::new();
        let err = element.apply(record, &mut downstream).unwrap_err();
        assert!(matches!(err, GristError::InvalidRecord(_)));
        assert!(downstream.is_empty());
    }

    #[test]
    fn non_empty_emission_reaches_downstream() {
        let mut element =
            StackElement::new(SpyNode::new(), passthrough(), scope(), NodeRole::Operate);

        let record = Tuple::new(vec![Value::Text("alice".into()), Value::Int(30)]);
        let mut downstream = Vec::new();
        let emitted = element.apply(record.clone(), &mut downstream).unwrap();
        assert_eq!(emitted, 1);
        assert_eq!(downstream, vec![record]);
    }

    #[test]
    fn non_source_element_rejects_source_and_grouped_shapes() {
        let mut element =
            StackElement::new(SpyNode::new(), passthrough(), scope(), NodeRole::Operate);

        let err = element.source(b"k", b"v").unwrap_err();
        assert!(matches!(err, GristError::UnsupportedRole(_)));

        let key = Tuple::new(vec![Value::Int(1)]);
        let err = element
            .collect_grouped(&key, &mut std::iter::empty())
            .unwrap_err();
        assert!(matches!(err, GristError::UnsupportedRole(_)));
    }

    #[test]
    fn source_element_decodes_value_bytes() {
        let mut element =
            StackElement::new(SpyNode::new(), passthrough(), scope(), NodeRole::Source);

        let record = Tuple::new(vec![Value::Text("alice".into()), Value::Int(30)]);
        let bytes = codec::serialize_tuple(&record);
        assert_eq!(element.source(b"ignored", &bytes).unwrap(), record);
    }

    #[test]
    fn trap_captures_serialized_current_record() {
        let sink = MemoryTrapSink::new();
        let mut element =
            StackElement::new(SpyNode::new(), passthrough(), scope(), NodeRole::Operate)
                .with_trap("bad-records", Box::new(sink.clone()));

        let record = Tuple::new(vec![Value::Text("alice".into()), Value::Int(30)]);
        element.tuple_entry(record.clone()).unwrap();
        assert_eq!(element.divert_current_record().unwrap(), Some("bad-records"));

        let captured = sink.captured();
        assert_eq!(captured.len(), 1);
        assert_eq!(codec::deserialize_tuple(&captured[0]).unwrap(), record);
    }

    #[test]
    fn display_delegates_to_node_description() {
        let element = StackElement::new(SpyNode::new(), passthrough(), scope(), NodeRole::Operate);
        assert_eq!(element.to_string(), "Each(spy)");
    }
}
