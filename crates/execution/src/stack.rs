//! Stack driver: walks the element chain per record and diverts faulting
//! records into traps.

use grist_common::metrics::global_metrics;
use grist_common::{GristError, Result};
use grist_tuple::Tuple;
use tracing::{debug, warn};

use crate::collector::OutputCollector;
use crate::element::StackElement;

/// The per-task operator execution chain.
///
/// Elements are held as an explicitly ordered sequence assembled once before
/// any record flows; records are processed one at a time, synchronously,
/// head-to-tail. The stack introduces no internal threading and must not be
/// shared across tasks.
pub struct OperatorStack {
    elements: Vec<StackElement>,
    scratch: Vec<Tuple>,
    next: Vec<Tuple>,
}

impl OperatorStack {
    /// Assemble a stack from its elements, head first.
    pub fn new(elements: Vec<StackElement>) -> Self {
        Self {
            elements,
            scratch: Vec::new(),
            next: Vec::new(),
        }
    }

    /// Number of elements in the chain.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the chain has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Install the terminal output destination on the tail element.
    pub fn set_last_output(&mut self, collector: Box<dyn OutputCollector>) -> Result<()> {
        match self.elements.last_mut() {
            Some(tail) => {
                tail.set_last_output(collector);
                Ok(())
            }
            None => Err(GristError::UnsupportedRole(
                "cannot install terminal output on an empty operator stack".to_string(),
            )),
        }
    }

    /// Feed one already-decoded record through the full chain.
    ///
    /// Returns the number of records delivered to the terminal output.
    pub fn process(&mut self, record: Tuple) -> Result<u64> {
        self.run_from(0, record)
    }

    /// Feed one raw key/value pair through the chain; the head element must
    /// be a [`NodeRole::Source`] and decodes the record, which then flows
    /// through the downstream elements. A chain consisting of only the source
    /// head has nowhere to deliver the decoded record and is rejected.
    pub fn process_serialized(&mut self, key: &[u8], value: &[u8]) -> Result<u64> {
        let head = self.elements.first_mut().ok_or_else(|| {
            GristError::UnsupportedRole("cannot process through an empty operator stack".to_string())
        })?;
        let record = head.source(key, value)?;
        if self.elements.len() == 1 {
            return Err(GristError::UnsupportedRole(
                "source head requires at least one downstream element".to_string(),
            ));
        }
        self.run_from(1, record)
    }

    fn run_from(&mut self, start: usize, record: Tuple) -> Result<u64> {
        match self.elements.last() {
            Some(tail) if tail.has_last_output() => {}
            Some(_) => {
                return Err(GristError::UnsupportedRole(
                    "stack tail has no terminal output collector".to_string(),
                ))
            }
            None => {
                return Err(GristError::UnsupportedRole(
                    "cannot process through an empty operator stack".to_string(),
                ))
            }
        }

        self.scratch.clear();
        self.next.clear();
        self.scratch.push(record);
        let mut delivered = 0;

        for element in &mut self.elements[start..] {
            delivered = 0;
            for tuple in self.scratch.drain(..) {
                match element.apply(tuple, &mut self.next) {
                    Ok(emitted) => delivered += emitted,
                    Err(err) if is_record_fault(&err) => {
                        let trapped = element.divert_current_record()?.map(str::to_string);
                        match trapped {
                            Some(trap) => {
                                warn!(
                                    element = %element.description(),
                                    trap = %trap,
                                    error = %err,
                                    "record diverted to trap"
                                );
                            }
                            None => {
                                return Err(GristError::RecordProcessing {
                                    element: element.description(),
                                    reason: err.to_string(),
                                });
                            }
                        }
                    }
                    Err(err) => return Err(err),
                }
            }
            std::mem::swap(&mut self.scratch, &mut self.next);
        }

        self.scratch.clear();
        Ok(delivered)
    }

    /// Publish lifetime record counters to the global metrics registry.
    ///
    /// Intended to be called once at task teardown so the per-record path
    /// stays free of metrics label churn.
    pub fn publish_metrics(&self) {
        for element in &self.elements {
            let (records_in, records_out, trapped) = element.record_counts();
            let description = element.description();
            global_metrics().record_operator(&description, records_in, records_out);
            if trapped > 0 {
                if let Some(trap) = element.trap_name() {
                    global_metrics().record_trapped(&description, trap, trapped);
                }
            }
            debug!(
                element = %description,
                records_in,
                records_out,
                trapped,
                "stack element counters published"
            );
        }
    }
}

/// True for faults local to one record, which a trap may recover; assembly
/// and configuration defects stay fatal.
fn is_record_fault(err: &GristError) -> bool {
    !matches!(
        err,
        GristError::UnsupportedRole(_)
            | GristError::InvalidRecord(_)
            | GristError::ConfigDecode { .. }
    )
}
