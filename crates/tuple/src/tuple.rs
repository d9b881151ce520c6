//! The record unit: an ordered, mutable sequence of typed values.

use grist_common::{GristError, Result};

use crate::value::Value;

/// An ordered, fixed-length sequence of typed values representing one record.
///
/// Slots may be overwritten in place so that a single allocation can be
/// reused across records on hot paths. Never shared mutably across tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    /// Create a tuple from its element values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the tuple has no elements.
    ///
    /// Several operations treat non-emptiness as a validity precondition;
    /// an empty tuple is never a valid emission.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the element at `pos`.
    pub fn get(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    /// Overwrite the element at `pos` in place.
    pub fn set(&mut self, pos: usize, value: Value) -> Result<()> {
        match self.values.get_mut(pos) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(GristError::InvalidRecord(format!(
                "position {pos} out of bounds for tuple of arity {}",
                self.values.len()
            ))),
        }
    }

    /// Append an element.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// All elements in order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Tuple::new(values)
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Tuple::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use grist_common::GristError;

    use super::{Tuple, Value};

    #[test]
    fn in_place_overwrite() {
        let mut t = Tuple::new(vec![Value::Int(1), Value::Text("a".into())]);
        t.set(0, Value::Int(2)).unwrap();
        assert_eq!(t.get(0), Some(&Value::Int(2)));

        let err = t.set(5, Value::Null).unwrap_err();
        assert!(matches!(err, GristError::InvalidRecord(_)));
    }

    #[test]
    fn element_wise_equality_and_hash() {
        use std::collections::HashSet;

        let a = Tuple::new(vec![Value::Long(7), Value::Double(1.5)]);
        let b = Tuple::new(vec![Value::Long(7), Value::Double(1.5)]);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }
}
