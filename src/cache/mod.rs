//! Per-connection caches of type metadata.
//!
//! Both caches grow only; entries are never evicted or refreshed. They
//! classify types through the same [`TypeClass::of`](crate::TypeClass::of)
//! table, so they agree on every OID.

mod datatype;
mod type_name;

pub use datatype::DatatypeCache;
pub use type_name::{CachedTypeEntry, TypeNameCache};
