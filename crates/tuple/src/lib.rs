//! Tuple data model, element wire codec, and comparison strategies.
//!
//! Architecture role:
//! - defines the record unit ([`Tuple`]) and its schema ([`Fields`])
//! - provides the reusable schema-bound record view ([`TupleEntry`])
//! - hosts the element wire codec and per-side decode stream ([`TupleReader`])
//! - defines comparator strategy contracts and built-in strategies
//!
//! Key modules:
//! - [`value`]
//! - [`tuple`]
//! - [`fields`]
//! - [`entry`]
//! - [`codec`]
//! - [`compare`]
//! - [`serialization`]

pub mod codec;
pub mod compare;
pub mod entry;
pub mod fields;
pub mod serialization;
pub mod tuple;
pub mod value;

pub use codec::{deserialize_tuple, serialize_tuple, write_tuple, TupleReader};
pub use compare::{
    ComparatorSpec, FieldComparatorRef, NaturalOrder, NaturalStreamingOrder, ReversedOrder,
    StreamComparator, ValueComparator,
};
pub use entry::TupleEntry;
pub use fields::Fields;
pub use serialization::{DelegatingElementComparator, TupleSerialization};
pub use tuple::Tuple;
pub use value::Value;
