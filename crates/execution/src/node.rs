//! Pipeline node contract and element role tags.

use grist_common::Result;
use grist_tuple::Fields;

/// Describes how a node's declared fields map onto an upstream node's output
/// fields.
///
/// Treated as an opaque lookup object by stack elements: they hand it to the
/// node's [`FlowNode::resolve_fields`] and cache the result.
#[derive(Debug, Clone)]
pub struct Scope {
    name: String,
    outgoing: Fields,
}

impl Scope {
    /// Create a scope carrying the upstream node's output schema.
    pub fn new(name: impl Into<String>, outgoing: Fields) -> Self {
        Self {
            name: name.into(),
            outgoing,
        }
    }

    /// Diagnostic name of the upstream edge.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The upstream node's output schema.
    pub fn outgoing_fields(&self) -> &Fields {
        &self.outgoing
    }
}

/// A node of the logical pipeline wrapped by a stack element.
///
/// Resolution is invoked lazily by the owning element, at most once per task.
pub trait FlowNode: Send + Sync {
    /// Resolve the schema of the records this node receives, given the
    /// upstream scope.
    fn resolve_fields(&self, scope: &Scope) -> Result<Fields>;

    /// Human-readable description used in diagnostics and error context.
    fn description(&self) -> String;
}

/// Capacity tag of a stack element within its phase.
///
/// A closed set checked at dispatch: invoking an element through a shape its
/// role forbids fails fast with
/// [`GristError::UnsupportedRole`](grist_common::GristError::UnsupportedRole)
/// rather than relying on overriding to withhold the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Head element: decodes raw key/value pairs into tuples.
    Source,
    /// Mid-chain element: applies a per-record transform or filter.
    Operate,
    /// Tail element: writes finished records to the terminal output.
    Sink,
}
