//! Schema-bound, reusable view over the current record.

use grist_common::{GristError, Result};

use crate::fields::Fields;
use crate::tuple::Tuple;
use crate::value::Value;

/// Pairs a [`Fields`] schema with a mutable [`Tuple`] slot.
///
/// The schema is fixed at construction; the tuple reference is swapped per
/// record via [`TupleEntry::set_tuple`] so the wrapper is allocated once per
/// stack element, not once per record.
#[derive(Debug)]
pub struct TupleEntry {
    fields: Fields,
    tuple: Tuple,
}

impl TupleEntry {
    /// Create an entry bound to `fields`, holding an empty tuple until the
    /// first record is swapped in.
    pub fn new(fields: Fields) -> Self {
        Self {
            fields,
            tuple: Tuple::default(),
        }
    }

    /// Schema this entry is bound to.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Swap the current record in place, returning the previous one.
    pub fn set_tuple(&mut self, tuple: Tuple) -> Tuple {
        std::mem::replace(&mut self.tuple, tuple)
    }

    /// The current record.
    pub fn tuple(&self) -> &Tuple {
        &self.tuple
    }

    /// Look up an element by field name.
    ///
    /// The tuple's arity must match the schema's arity for by-name access.
    pub fn get(&self, name: &str) -> Result<&Value> {
        if self.tuple.len() != self.fields.size() {
            return Err(GristError::InvalidRecord(format!(
                "tuple arity {} does not match schema arity {}",
                self.tuple.len(),
                self.fields.size()
            )));
        }
        let pos = self.fields.position_of(name).ok_or_else(|| {
            GristError::InvalidRecord(format!("unknown field `{name}` in schema"))
        })?;
        self.tuple
            .get(pos)
            .ok_or_else(|| GristError::InvalidRecord(format!("no element at position {pos}")))
    }
}
