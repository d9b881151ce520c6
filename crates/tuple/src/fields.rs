//! Schema of a tuple: ordered field names plus optional per-field comparator
//! declarations.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use grist_common::{GristError, Result};
use serde::{Deserialize, Serialize};

use crate::compare::ComparatorSpec;

/// Immutable ordered set of unique field names, optionally carrying one
/// comparator declaration per field.
///
/// `None` at a position means "use the default delegating comparison" for
/// that field. Resolved once per stack element and cached there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fields {
    names: Vec<String>,
    comparators: Vec<Option<ComparatorSpec>>,
}

impl Fields {
    /// Build a schema from field names; duplicate names are a construction
    /// error.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(GristError::InvalidRecord(format!(
                    "duplicate field name `{name}` in schema"
                )));
            }
        }
        let comparators = vec![None; names.len()];
        Ok(Self { names, comparators })
    }

    /// Number of fields.
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// Field names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of `name`, if declared.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Declare a comparator for one field.
    pub fn with_comparator(mut self, name: &str, spec: ComparatorSpec) -> Result<Self> {
        match self.position_of(name) {
            Some(pos) => {
                self.comparators[pos] = Some(spec);
                Ok(self)
            }
            None => Err(GristError::InvalidRecord(format!(
                "unknown field `{name}` in schema"
            ))),
        }
    }

    /// Per-field comparator declarations, aligned with [`Fields::names`].
    pub fn comparator_specs(&self) -> &[Option<ComparatorSpec>] {
        &self.comparators
    }

    /// Encode this schema as a base64 blob for transport through the runtime
    /// configuration.
    pub fn to_base64(&self) -> Result<String> {
        let json = serde_json::to_vec(self)
            .map_err(|e| GristError::Decode(format!("fields blob encode failed: {e}")))?;
        Ok(BASE64.encode(json))
    }

    /// Decode a schema from its base64 blob form.
    pub fn from_base64(blob: &str) -> Result<Self> {
        let json = BASE64
            .decode(blob.trim())
            .map_err(|e| GristError::Decode(format!("fields blob is not valid base64: {e}")))?;
        serde_json::from_slice(&json)
            .map_err(|e| GristError::Decode(format!("fields blob decode failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use grist_common::GristError;

    use super::Fields;
    use crate::compare::ComparatorSpec;

    #[test]
    fn rejects_duplicate_names() {
        let err = Fields::new(["name", "age", "name"]).unwrap_err();
        assert!(matches!(err, GristError::InvalidRecord(_)));
    }

    #[test]
    fn comparator_declarations_align_with_positions() {
        let fields = Fields::new(["name", "age"])
            .unwrap()
            .with_comparator("age", ComparatorSpec::Reversed)
            .unwrap();
        assert_eq!(fields.comparator_specs()[0], None);
        assert_eq!(fields.comparator_specs()[1], Some(ComparatorSpec::Reversed));

        assert!(fields
            .with_comparator("missing", ComparatorSpec::Natural)
            .is_err());
    }

    #[test]
    fn base64_blob_round_trips() {
        let fields = Fields::new(["k"])
            .unwrap()
            .with_comparator("k", ComparatorSpec::NaturalStreaming)
            .unwrap();
        let blob = fields.to_base64().unwrap();
        assert_eq!(Fields::from_base64(&blob).unwrap(), fields);
    }

    #[test]
    fn garbage_blob_is_a_decode_error() {
        assert!(matches!(
            Fields::from_base64("%%%not-base64%%%").unwrap_err(),
            GristError::Decode(_)
        ));
        // valid base64, invalid payload
        assert!(matches!(
            Fields::from_base64("aGVsbG8=").unwrap_err(),
            GristError::Decode(_)
        ));
    }
}
