pub mod comparator;
pub mod delegate;

pub use comparator::{RawTupleComparator, GROUP_COMPARATOR_KEY};
pub use delegate::DelegatedComparator;
