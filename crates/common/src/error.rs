use thiserror::Error;

/// Canonical grist error taxonomy used across crates.
///
/// Classification guidance:
/// - [`GristError::InvalidRecord`]: a record failed a structural precondition
///   at an emission point (always fatal to that emission attempt)
/// - [`GristError::UnsupportedRole`]: a stack element was invoked in a
///   capacity its role forbids — a pipeline-assembly defect, never a data
///   condition; must not be caught or retried
/// - [`GristError::ConfigDecode`]: comparator configuration could not be
///   decoded; fatal to task startup
/// - [`GristError::RecordProcessing`]: a wrapped operator faulted on one
///   record; the only locally recoverable kind, and only when the owning
///   element has a trap sink
/// - [`GristError::Decode`]: malformed record bytes discovered while reading
///   an element stream
/// - [`GristError::Io`]: raw IO failures from std APIs
#[derive(Debug, Error)]
pub enum GristError {
    /// A stack element was asked to emit a structurally invalid record.
    ///
    /// Examples:
    /// - collecting an empty tuple
    /// - by-name access on a tuple whose arity disagrees with its schema
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A stack element was driven through an invocation shape its role does
    /// not support.
    ///
    /// Examples:
    /// - scalar source lookup on a sink-only element
    /// - grouped/iterator collect on an element that is not group-aware
    #[error("unsupported role: {0}")]
    UnsupportedRole(String),

    /// Comparator configuration state could not be decoded at task startup.
    ///
    /// Carries the offending configuration key so the failure can be
    /// diagnosed without re-running the task.
    #[error("unable to decode comparator configuration for `{key}`: {reason}")]
    ConfigDecode {
        /// Configuration key whose value failed to decode.
        key: String,
        /// Underlying decode failure description.
        reason: String,
    },

    /// A wrapped operator faulted while processing one record.
    #[error("record processing failed in {element}: {reason}")]
    RecordProcessing {
        /// Description of the stack element whose operator faulted.
        element: String,
        /// Underlying fault description.
        reason: String,
    },

    /// Malformed serialized record data.
    ///
    /// Examples:
    /// - truncated element payload
    /// - unknown element type tag
    #[error("record decode error: {0}")]
    Decode(String),

    /// Transparent std IO failures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard grist result alias.
pub type Result<T> = std::result::Result<T, GristError>;
