//! SQL identifier quoting.
//!
//! Identifiers are emitted bare whenever PostgreSQL would read them back
//! unchanged, and double-quoted otherwise.

/// Keywords that cannot be used as a bare column or table name.
///
/// This is the union of PostgreSQL's reserved and type/function-name
/// keyword categories. Unreserved keywords never need quoting.
const RESERVED_KEYWORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant",
    "group", "having", "ilike", "in", "initially", "inner", "intersect", "into", "is",
    "isnull", "join", "lateral", "leading", "left", "like", "limit", "localtime",
    "localtimestamp", "natural", "not", "notnull", "null", "offset", "on", "only", "or",
    "order", "outer", "overlaps", "placing", "primary", "references", "returning", "right",
    "select", "session_user", "similar", "some", "symmetric", "table", "tablesample",
    "then", "to", "trailing", "true", "union", "unique", "user", "using", "variadic",
    "verbose", "when", "where", "window", "with",
];

/// Keywords that may not name a column but are fine as a type name.
const COLUMN_NAME_KEYWORDS: &[&str] = &[
    "between", "bigint", "bit", "boolean", "char", "character", "coalesce", "dec",
    "decimal", "exists", "extract", "float", "greatest", "grouping", "inout", "int",
    "integer", "interval", "least", "national", "nchar", "none", "nullif", "numeric", "out",
    "overlay", "position", "precision", "real", "row", "setof", "smallint", "substring",
    "time", "timestamp", "treat", "trim", "values", "varchar", "xmlattributes",
    "xmlconcat", "xmlelement", "xmlexists", "xmlforest", "xmlparse", "xmlpi", "xmlroot",
    "xmlserialize",
];

/// Type spellings that contain spaces or quotes but must stay bare.
const BARE_TYPE_NAMES: &[&str] = &[
    "\"char\"",
    "bit varying",
    "character",
    "character varying",
    "double precision",
    "time with time zone",
    "time without time zone",
    "timestamp with time zone",
    "timestamp without time zone",
];

/// Quote an identifier (table, column, schema) if needed.
pub fn quote_ident(ident: &str) -> String {
    if needs_quoting(ident, false) {
        force_quote(ident)
    } else {
        ident.to_string()
    }
}

/// Quote a type name if needed.
///
/// Type names may use column-name keywords (`integer`, `numeric`, ...)
/// and the multi-word SQL spellings bare.
pub fn quote_type_ident(ident: &str) -> String {
    if needs_quoting(ident, true) {
        force_quote(ident)
    } else {
        ident.to_string()
    }
}

/// Wrap an identifier in double quotes, doubling embedded quotes.
pub fn force_quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn needs_quoting(ident: &str, for_types: bool) -> bool {
    if ident.is_empty() || ident.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    let base = if for_types {
        ident.strip_suffix("[]").unwrap_or(ident)
    } else {
        ident
    };

    if for_types
        && BARE_TYPE_NAMES
            .iter()
            .any(|name| name.eq_ignore_ascii_case(base))
    {
        return false;
    }

    let plain = base.chars().enumerate().all(|(pos, c)| {
        c.is_ascii_lowercase() || c == '_' || (pos > 0 && (c.is_ascii_digit() || c == '$'))
    });
    if !plain {
        return true;
    }

    if RESERVED_KEYWORDS.contains(&base) {
        return true;
    }
    !for_types && COLUMN_NAME_KEYWORDS.contains(&base)
}
