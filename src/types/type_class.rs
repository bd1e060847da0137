//! Semantic classification of built-in types.
//!
//! Both caches classify through [`TypeClass::of`], so a type never lands
//! in different classes depending on which cache answered.

use std::fmt;

use super::oid::*;

/// Broad semantic class of a type, used for alignment and editing in grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeClass {
    Boolean,
    Numeric,
    String,
    DateTime,
    #[default]
    Other,
}

impl TypeClass {
    /// Classify a base type OID.
    ///
    /// Domains should be classified by their base type; composite and
    /// user-defined types are always `Other`.
    pub fn of(oid: Oid) -> Self {
        match oid {
            PG_TYPE_BOOL => TypeClass::Boolean,

            PG_TYPE_INT8 | PG_TYPE_INT2 | PG_TYPE_INT4 | PG_TYPE_OID | PG_TYPE_XID
            | PG_TYPE_TID | PG_TYPE_CID | PG_TYPE_FLOAT4 | PG_TYPE_FLOAT8 | PG_TYPE_MONEY
            | PG_TYPE_BIT | PG_TYPE_NUMERIC => TypeClass::Numeric,

            PG_TYPE_BYTEA | PG_TYPE_CHAR | PG_TYPE_NAME | PG_TYPE_TEXT | PG_TYPE_VARCHAR => {
                TypeClass::String
            }

            PG_TYPE_TIMESTAMP | PG_TYPE_TIMESTAMPTZ | PG_TYPE_TIME | PG_TYPE_TIMETZ
            | PG_TYPE_INTERVAL => TypeClass::DateTime,

            _ => TypeClass::Other,
        }
    }

    /// Classify a type whose catalog row reports `typbasetype`.
    ///
    /// A zero base type means the type is not a domain.
    pub fn of_base(oid: Oid, base_oid: Oid) -> Self {
        Self::of(if base_oid == 0 { oid } else { base_oid })
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeClass::Boolean => "boolean",
            TypeClass::Numeric => "numeric",
            TypeClass::String => "string",
            TypeClass::DateTime => "datetime",
            TypeClass::Other => "other",
        };
        f.write_str(name)
    }
}
