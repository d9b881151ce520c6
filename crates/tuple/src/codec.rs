//! Minimal element wire codec and the reusable decode stream.
//!
//! Record layout: a `u32` little-endian element count, then each element as a
//! one-byte type tag followed by its little-endian payload. `Text` and
//! `Bytes` payloads carry a `u32` little-endian length prefix.

use grist_common::{GristError, Result};

use crate::tuple::Tuple;
use crate::value::Value;

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_LONG: u8 = 3;
const TAG_DOUBLE: u8 = 4;
const TAG_TEXT: u8 = 5;
const TAG_BYTES: u8 = 6;

/// Append the serialized form of `tuple` to `out`.
pub fn write_tuple(tuple: &Tuple, out: &mut Vec<u8>) {
    out.extend_from_slice(&(tuple.len() as u32).to_le_bytes());
    for value in tuple.values() {
        write_value(value, out);
    }
}

/// Serialize a tuple into a fresh buffer.
pub fn serialize_tuple(tuple: &Tuple) -> Vec<u8> {
    let mut out = Vec::new();
    write_tuple(tuple, &mut out);
    out
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.push(TAG_NULL),
        Value::Bool(v) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*v));
        }
        Value::Int(v) => {
            out.push(TAG_INT);
            out.extend_from_slice(&v.to_le_bytes());
        }
        Value::Long(v) => {
            out.push(TAG_LONG);
            out.extend_from_slice(&v.to_le_bytes());
        }
        Value::Double(v) => {
            out.push(TAG_DOUBLE);
            out.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        Value::Text(v) => {
            out.push(TAG_TEXT);
            out.extend_from_slice(&(v.len() as u32).to_le_bytes());
            out.extend_from_slice(v.as_bytes());
        }
        Value::Bytes(v) => {
            out.push(TAG_BYTES);
            out.extend_from_slice(&(v.len() as u32).to_le_bytes());
            out.extend_from_slice(v);
        }
    }
}

/// Decode a full tuple from one serialized record.
pub fn deserialize_tuple(bytes: &[u8]) -> Result<Tuple> {
    let mut reader = TupleReader::new();
    reader.reset(bytes);
    let n = reader.num_elements()?;
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        values.push(reader.read_value()?);
    }
    Ok(Tuple::new(values))
}

/// Reusable decode buffer plus cursor over one serialized record.
///
/// One reader serves one comparison side; `reset` reloads the next record
/// without reallocating, `num_elements` consumes only the count header, and
/// `read_value` decodes exactly one element and advances the cursor past it.
#[derive(Debug, Default)]
pub struct TupleReader {
    buf: Vec<u8>,
    pos: usize,
}

impl TupleReader {
    /// Create an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a serialized record, rewinding the cursor to the header.
    pub fn reset(&mut self, record: &[u8]) {
        self.buf.clear();
        self.buf.extend_from_slice(record);
        self.pos = 0;
    }

    /// Read the declared element count from the record header.
    pub fn num_elements(&mut self) -> Result<usize> {
        let bytes = self.take(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(raw) as usize)
    }

    /// Decode the element at the cursor.
    pub fn read_value(&mut self) -> Result<Value> {
        let tag = self.take(1)?[0];
        match tag {
            TAG_NULL => Ok(Value::Null),
            TAG_BOOL => Ok(Value::Bool(self.take(1)?[0] != 0)),
            TAG_INT => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(self.take(4)?);
                Ok(Value::Int(i32::from_le_bytes(raw)))
            }
            TAG_LONG => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(self.take(8)?);
                Ok(Value::Long(i64::from_le_bytes(raw)))
            }
            TAG_DOUBLE => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(self.take(8)?);
                Ok(Value::Double(f64::from_bits(u64::from_le_bytes(raw))))
            }
            TAG_TEXT => {
                let len = self.read_len()?;
                let bytes = self.take(len)?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| GristError::Decode(format!("invalid utf8 in text element: {e}")))?
                    .to_string();
                Ok(Value::Text(text))
            }
            TAG_BYTES => {
                let len = self.read_len()?;
                Ok(Value::Bytes(self.take(len)?.to_vec()))
            }
            other => Err(GristError::Decode(format!(
                "unknown element type tag {other} at offset {}",
                self.pos - 1
            ))),
        }
    }

    fn read_len(&mut self) -> Result<usize> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw) as usize)
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.buf.len());
        match end {
            Some(end) => {
                let slice = &self.buf[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(GristError::Decode(format!(
                "record truncated: need {n} bytes at offset {} of {}",
                self.pos,
                self.buf.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use grist_common::GristError;

    use super::{deserialize_tuple, serialize_tuple, TupleReader};
    use crate::tuple::Tuple;
    use crate::value::Value;

    fn sample() -> Tuple {
        Tuple::new(vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(-7),
            Value::Long(1 << 40),
            Value::Double(2.5),
            Value::Text("grist".into()),
            Value::Bytes(vec![0, 255, 1]),
        ])
    }

    #[test]
    fn header_reads_count_without_full_decode() {
        let bytes = serialize_tuple(&sample());
        let mut reader = TupleReader::new();
        reader.reset(&bytes);
        assert_eq!(reader.num_elements().unwrap(), 7);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let tuple = sample();
        let back = deserialize_tuple(&serialize_tuple(&tuple)).unwrap();
        assert_eq!(back, tuple);
    }

    #[test]
    fn reader_is_reusable_across_records() {
        let a = serialize_tuple(&Tuple::new(vec![Value::Int(1)]));
        let b = serialize_tuple(&Tuple::new(vec![Value::Text("x".into()), Value::Null]));

        let mut reader = TupleReader::new();
        reader.reset(&a);
        assert_eq!(reader.num_elements().unwrap(), 1);
        assert_eq!(reader.read_value().unwrap(), Value::Int(1));

        reader.reset(&b);
        assert_eq!(reader.num_elements().unwrap(), 2);
        assert_eq!(reader.read_value().unwrap(), Value::Text("x".into()));
        assert_eq!(reader.read_value().unwrap(), Value::Null);
    }

    #[test]
    fn truncated_payload_is_a_decode_error() {
        let mut bytes = serialize_tuple(&Tuple::new(vec![Value::Long(42)]));
        bytes.truncate(bytes.len() - 2);

        let mut reader = TupleReader::new();
        reader.reset(&bytes);
        reader.num_elements().unwrap();
        assert!(matches!(
            reader.read_value().unwrap_err(),
            GristError::Decode(_)
        ));
    }

    #[test]
    fn unknown_tag_is_a_decode_error() {
        let mut reader = TupleReader::new();
        reader.reset(&[1, 0, 0, 0, 99]);
        reader.num_elements().unwrap();
        assert!(matches!(
            reader.read_value().unwrap_err(),
            GristError::Decode(_)
        ));
    }
}
