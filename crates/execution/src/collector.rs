//! Output and trap sink seams plus in-memory implementations.

use std::sync::{Arc, Mutex};

use grist_common::Result;
use grist_tuple::Tuple;

/// Terminal destination for finished records at the tail of a stack chain.
///
/// Write failures propagate as fatal to the task unless the emitting element
/// carries a trap.
pub trait OutputCollector: Send {
    /// Accept one finished record.
    fn collect(&mut self, record: Tuple) -> Result<()>;
}

/// Named side-output receiving the serialized form of records whose
/// processing faulted inside a trapped stack element.
pub trait TrapSink: Send {
    /// Capture one serialized record.
    fn capture(&mut self, record: &[u8]) -> Result<()>;
}

/// In-memory [`OutputCollector`] retaining every collected record.
///
/// Cloning yields a handle onto the same store, so a caller can keep one
/// handle while the stack owns the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollector {
    records: Arc<Mutex<Vec<Tuple>>>,
}

impl MemoryCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records collected so far, in arrival order.
    pub fn records(&self) -> Vec<Tuple> {
        self.records.lock().expect("collector store poisoned").clone()
    }
}

impl OutputCollector for MemoryCollector {
    fn collect(&mut self, record: Tuple) -> Result<()> {
        self.records
            .lock()
            .expect("collector store poisoned")
            .push(record);
        Ok(())
    }
}

/// In-memory [`TrapSink`] retaining every captured record's serialized form.
///
/// Clone semantics match [`MemoryCollector`].
#[derive(Debug, Clone, Default)]
pub struct MemoryTrapSink {
    captured: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemoryTrapSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the serialized records captured so far.
    pub fn captured(&self) -> Vec<Vec<u8>> {
        self.captured.lock().expect("trap store poisoned").clone()
    }
}

impl TrapSink for MemoryTrapSink {
    fn capture(&mut self, record: &[u8]) -> Result<()> {
        self.captured
            .lock()
            .expect("trap store poisoned")
            .push(record.to_vec());
        Ok(())
    }
}
