//! PostgreSQL type metadata: OIDs, classification, column metadata and
//! the datatype naming grammar.

mod datatype;
mod metadata;
pub mod oid;
mod type_class;

pub use datatype::{
    Datatype, SchemaContext, SearchPath, TypeKind, TypeModParts, UNKNOWN_TYPE_NAME,
};
pub use metadata::ColumnMetadata;
pub use oid::*;
pub use type_class::TypeClass;
