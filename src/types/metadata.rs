//! Column metadata reported with a query result.

use super::oid::Oid;

/// Description of one result column (`PQfname`, `PQftype`, `PQfmod`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column label as sent by the server.
    pub name: String,
    /// OID of the column's data type.
    pub type_oid: Oid,
    /// Type modifier, -1 when the type has none.
    pub type_modifier: i32,
}

impl ColumnMetadata {
    /// Create new column metadata without a type modifier.
    pub fn new(name: impl Into<String>, type_oid: Oid) -> Self {
        Self {
            name: name.into(),
            type_oid,
            type_modifier: -1,
        }
    }

    /// Set the type modifier.
    pub fn with_modifier(mut self, type_modifier: i32) -> Self {
        self.type_modifier = type_modifier;
        self
    }
}
