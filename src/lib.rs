//! PostgreSQL type metadata for admin tools
//!
//! Resolves type OIDs from result sets and catalogs into display names,
//! semantic classes and structured [`Datatype`] definitions, with
//! per-connection caches so that repeated lookups cost no round trips.
//!
//! The crate does not speak the wire protocol. Callers supply a
//! [`Connection`] that runs SQL and returns text rows.
//!
//! # Example
//!
//! ```no_run
//! use pg_typecache::{Connection, ResultCursor, TypeNameCache};
//!
//! fn print_columns(conn: &impl Connection) {
//!     let mut types = TypeNameCache::new(conn);
//!     types.pre_cache(0);
//!
//!     if let Some(cursor) = ResultCursor::query(conn, "SELECT * FROM pg_database") {
//!         for col in 0..cursor.column_count() {
//!             println!(
//!                 "{}: {}",
//!                 cursor.column_name(col),
//!                 cursor.column_full_type_name(col, &mut types)
//!             );
//!         }
//!     }
//! }
//! ```

pub mod cache;
pub mod connection;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod options;
pub mod quote;
pub mod reader;
pub mod types;

// Re-export main types
pub use cache::{CachedTypeEntry, DatatypeCache, TypeNameCache};
pub use connection::{Connection, QueryResult, ResultStatus};
pub use cursor::{ColumnRef, ResultCursor, RowIter};
pub use error::{Error, Result};
pub use options::{PreCacheLimit, ReaderOptions};
pub use quote::{quote_ident, quote_type_ident};
pub use reader::DatatypeReader;
pub use types::{
    ColumnMetadata, Datatype, SchemaContext, SearchPath, TypeClass, TypeKind, TypeModParts,
    UNKNOWN_TYPE_NAME,
};
pub use types::oid::*;
