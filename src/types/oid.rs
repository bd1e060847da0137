//! Well-known PostgreSQL type OIDs.
//!
//! Values match the `oid` column of `pg_catalog.pg_type` for the built-in
//! types. Only the types the classifier and the tests care about are listed.

/// Type identifier as stored in `pg_type.oid`.
pub type Oid = u32;

// Boolean
pub const PG_TYPE_BOOL: Oid = 16;

// Binary and character
pub const PG_TYPE_BYTEA: Oid = 17;
pub const PG_TYPE_CHAR: Oid = 18;
pub const PG_TYPE_NAME: Oid = 19;
pub const PG_TYPE_TEXT: Oid = 25;
pub const PG_TYPE_BPCHAR: Oid = 1042;
pub const PG_TYPE_VARCHAR: Oid = 1043;

// Integers and system identifiers
pub const PG_TYPE_INT8: Oid = 20;
pub const PG_TYPE_INT2: Oid = 21;
pub const PG_TYPE_INT4: Oid = 23;
pub const PG_TYPE_OID: Oid = 26;
pub const PG_TYPE_TID: Oid = 27;
pub const PG_TYPE_XID: Oid = 28;
pub const PG_TYPE_CID: Oid = 29;

// Floating point and money
pub const PG_TYPE_FLOAT4: Oid = 700;
pub const PG_TYPE_FLOAT8: Oid = 701;
pub const PG_TYPE_MONEY: Oid = 790;
pub const PG_TYPE_NUMERIC: Oid = 1700;

// Bit strings
pub const PG_TYPE_BIT: Oid = 1560;
pub const PG_TYPE_VARBIT: Oid = 1562;

// Date and time
pub const PG_TYPE_DATE: Oid = 1082;
pub const PG_TYPE_TIME: Oid = 1083;
pub const PG_TYPE_TIMESTAMP: Oid = 1114;
pub const PG_TYPE_TIMESTAMPTZ: Oid = 1184;
pub const PG_TYPE_INTERVAL: Oid = 1186;
pub const PG_TYPE_TIMETZ: Oid = 1266;

// Pseudo types
pub const PG_TYPE_UNKNOWN: Oid = 705;

// Arrays
pub const PG_TYPE_NAME_ARRAY: Oid = 1003;
pub const PG_TYPE_INT4_ARRAY: Oid = 1007;

/// Every OID listed above, in catalog order.
pub const WELL_KNOWN_OIDS: &[Oid] = &[
    PG_TYPE_BOOL,
    PG_TYPE_BYTEA,
    PG_TYPE_CHAR,
    PG_TYPE_NAME,
    PG_TYPE_INT8,
    PG_TYPE_INT2,
    PG_TYPE_INT4,
    PG_TYPE_TEXT,
    PG_TYPE_OID,
    PG_TYPE_TID,
    PG_TYPE_XID,
    PG_TYPE_CID,
    PG_TYPE_FLOAT4,
    PG_TYPE_FLOAT8,
    PG_TYPE_UNKNOWN,
    PG_TYPE_MONEY,
    PG_TYPE_NAME_ARRAY,
    PG_TYPE_INT4_ARRAY,
    PG_TYPE_BPCHAR,
    PG_TYPE_VARCHAR,
    PG_TYPE_DATE,
    PG_TYPE_TIME,
    PG_TYPE_TIMESTAMP,
    PG_TYPE_TIMESTAMPTZ,
    PG_TYPE_INTERVAL,
    PG_TYPE_TIMETZ,
    PG_TYPE_BIT,
    PG_TYPE_VARBIT,
    PG_TYPE_NUMERIC,
];
