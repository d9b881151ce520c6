#![deny(missing_docs)]

//! Operator stack execution for map-phase tasks.
//!
//! Architecture role:
//! - pipeline node and element role contracts
//! - per-record operator stack elements with trap diversion
//! - the single-threaded stack driver and output/trap sink seams
//!
//! Key modules:
//! - [`node`]
//! - [`element`]
//! - [`stack`]
//! - [`collector`]
//!
//! Feature flags:
//! - no crate-level flags.

pub mod collector;
pub mod element;
pub mod node;
pub mod stack;

// Re-export only what you want at the crate root (no globs).
pub use collector::{MemoryCollector, MemoryTrapSink, OutputCollector, TrapSink};
pub use element::{Emitter, RecordOperator, StackElement};
pub use node::{FlowNode, NodeRole, Scope};
pub use stack::OperatorStack;
