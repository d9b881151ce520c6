//! Typed record elements and the default cross-type ordering.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// One element of a [`Tuple`](crate::Tuple).
///
/// Equality and hashing are structural: values of different kinds are never
/// equal, and floats compare by bit pattern so that `Eq`/`Hash` stay
/// consistent even in the presence of NaN.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value; sorts before everything else.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw byte payload.
    Bytes(Vec<u8>),
}

impl Value {
    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Long(_) | Value::Double(_) => 2,
            Value::Text(_) => 3,
            Value::Bytes(_) => 4,
        }
    }

    /// Total ordering over all values, including across kinds.
    ///
    /// Nulls sort first; the numeric kinds compare numerically with each
    /// other; otherwise values order by type rank, then by value within the
    /// kind. Floats use `f64::total_cmp`.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        use Value::*;

        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Long(a), Long(b)) => a.cmp(b),
            (Int(a), Long(b)) => i64::from(*a).cmp(b),
            (Long(a), Int(b)) => a.cmp(&i64::from(*b)),
            (Double(a), Double(b)) => a.total_cmp(b),
            (Int(a), Double(b)) => f64::from(*a).total_cmp(b),
            (Double(a), Int(b)) => a.total_cmp(&f64::from(*b)),
            (Long(a), Double(b)) => cmp_long_double(*a, *b),
            (Double(a), Long(b)) => cmp_long_double(*b, *a).reverse(),
            (Text(a), Text(b)) => a.cmp(b),
            (Bytes(a), Bytes(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

// `i64 as f64` loses precision above 2^53, which would collapse distinct
// longs onto one double and break transitivity. Classify the double against
// the i64 range, then compare against its truncation with a fractional
// tie-break, all in integer space.
fn cmp_long_double(a: i64, b: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if b.is_nan() {
        // match f64::total_cmp NaN placement: -NaN below all, +NaN above all
        return if b.is_sign_positive() {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    if b >= TWO_POW_63 {
        return Ordering::Less;
    }
    if b < -TWO_POW_63 {
        return Ordering::Greater;
    }

    let trunc = b.trunc();
    // trunc is within [-2^63, 2^63) here, so the cast is exact
    let whole = trunc as i64;
    match a.cmp(&whole) {
        Ordering::Equal if b > trunc => Ordering::Less,
        Ordering::Equal if b < trunc => Ordering::Greater,
        // -0.0 sorts below 0 under total_cmp; keep the order total
        Ordering::Equal if a == 0 && b.is_sign_negative() => Ordering::Greater,
        other => other,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Text(a), Text(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
        }
    }
}
