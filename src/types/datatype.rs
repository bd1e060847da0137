//! Catalog datatypes and the type-modifier grammar.
//!
//! A [`Datatype`] is built from the output of `format_type()` plus the
//! type's schema. It splits that text into a bare name and an array suffix,
//! and renders it back with a type modifier applied, following the
//! per-family rules PostgreSQL itself uses:
//!
//! | family | length | precision | text |
//! |--------|--------|-----------|------|
//! | `numeric` | `(m-4) >> 16` | `(m-4) & 0xFFFF` | `(l,p)`, or `(l)` when p is 0 |
//! | time, timestamp, bit families | `m` | 0 | `(l)` |
//! | `interval` | `m & 0xFFFF` | 0 | `(l)` |
//! | `date` | 0 | 0 | empty |
//! | anything else | `m-4` | 0 | `(l)` |
//!
//! A modifier of -1 means "no modifier" for every family.

use std::fmt;

use super::oid::Oid;
use super::type_class::TypeClass;
use crate::quote::{quote_ident, quote_type_ident};

/// Display text used for types that could not be resolved.
pub const UNKNOWN_TYPE_NAME: &str = "(unknown)";

/// Names whose modifier is stored verbatim (`length = typmod`).
const VERBATIM_TYPMOD_NAMES: &[&str] = &[
    "time",
    "timetz",
    "time without time zone",
    "time with time zone",
    "timestamp",
    "timestamptz",
    "timestamp without time zone",
    "timestamp with time zone",
    "bit",
    "bit varying",
    "varbit",
];

/// Kind of a catalog type (`pg_type.typtype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeKind {
    Base,
    Composite,
    Domain,
    Enum,
    Range,
    Pseudo,
    /// Not loaded from the catalog (column instances, placeholders).
    #[default]
    Unknown,
}

impl TypeKind {
    /// Map a `typtype` code.
    pub fn from_code(code: char) -> Self {
        match code {
            'b' => TypeKind::Base,
            'c' => TypeKind::Composite,
            'd' => TypeKind::Domain,
            'e' => TypeKind::Enum,
            'r' => TypeKind::Range,
            'p' => TypeKind::Pseudo,
            _ => TypeKind::Unknown,
        }
    }

    /// The `typtype` code, `'\0'` for `Unknown`.
    pub fn code(&self) -> char {
        match self {
            TypeKind::Base => 'b',
            TypeKind::Composite => 'c',
            TypeKind::Domain => 'd',
            TypeKind::Enum => 'e',
            TypeKind::Range => 'r',
            TypeKind::Pseudo => 'p',
            TypeKind::Unknown => '\0',
        }
    }
}

/// Decides whether a schema must be spelled out in generated SQL.
///
/// Implemented by whatever knows the session's `search_path`.
pub trait SchemaContext {
    /// Return `"schema."` if objects in `schema` need qualification, else `""`.
    fn schema_prefix(&self, schema: &str) -> String;
}

/// A `search_path` snapshot: schemas on the path are left unqualified.
///
/// An empty path qualifies every schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    schemas: Vec<String>,
}

impl SearchPath {
    /// Create a search path from schema names in lookup order.
    pub fn new<I, S>(schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schemas: schemas.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the text of `SHOW search_path`, e.g. `"$user", public`.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.split(',')
                .map(|s| s.trim().trim_matches('"'))
                .filter(|s| !s.is_empty()),
        )
    }

    /// Check if a schema is on the path.
    pub fn contains(&self, schema: &str) -> bool {
        schema == "pg_catalog" || self.schemas.iter().any(|s| s == schema)
    }
}

impl SchemaContext for SearchPath {
    fn schema_prefix(&self, schema: &str) -> String {
        if self.contains(schema) {
            String::new()
        } else {
            format!("{schema}.")
        }
    }
}

/// Length text, length and precision decoded from a type modifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeModParts {
    /// Parenthesized text such as `(10,2)`; empty when there is none.
    pub text: String,
    pub length: i32,
    pub precision: i32,
}

/// A catalog datatype, or the type of one specific column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datatype {
    schema: String,
    name: String,
    array: String,
    typmod: i32,
    oid: Oid,
    base_oid: Oid,
    kind: TypeKind,
    needs_schema: bool,
}

impl Default for Datatype {
    fn default() -> Self {
        Self {
            schema: String::new(),
            name: String::new(),
            array: String::new(),
            typmod: -1,
            oid: 0,
            base_oid: 0,
            kind: TypeKind::Unknown,
            needs_schema: false,
        }
    }
}

impl Datatype {
    /// A type definition loaded from `pg_type`.
    ///
    /// `typname` is the output of `format_type(oid, NULL)`; `duplicate`
    /// marks names that exist in more than one schema.
    pub fn catalog(
        oid: Oid,
        schema: impl Into<String>,
        typname: &str,
        kind: TypeKind,
        duplicate: bool,
    ) -> Self {
        let mut datatype = Self {
            schema: schema.into(),
            oid,
            kind,
            needs_schema: duplicate,
            ..Self::default()
        };
        datatype.init(typname, 0);
        datatype
    }

    /// The type of a specific table column.
    ///
    /// `dimensions` overrides the array depth implied by `typname`.
    pub fn instance(
        schema: impl Into<String>,
        typname: &str,
        duplicate: bool,
        dimensions: usize,
        typmod: i32,
    ) -> Self {
        let mut datatype = Self {
            schema: schema.into(),
            typmod,
            needs_schema: duplicate,
            ..Self::default()
        };
        datatype.init(typname, dimensions);
        datatype
    }

    /// Placeholder for an OID that could not be resolved.
    pub fn unknown(oid: Oid) -> Self {
        Self {
            name: UNKNOWN_TYPE_NAME.to_string(),
            oid,
            ..Self::default()
        }
    }

    /// Record the base type of a domain (`pg_type.typbasetype`).
    pub fn with_base_oid(mut self, base_oid: Oid) -> Self {
        self.base_oid = base_oid;
        self
    }

    fn init(&mut self, typname: &str, mut dimensions: usize) {
        // format_type() qualifies names that are not on the search path.
        let quoted_prefix = format!("\"{}\".", self.schema);
        let plain_prefix = format!("{}.", self.schema);
        let mut name = if self.schema.is_empty() {
            typname
        } else if let Some(rest) = typname.strip_prefix(&quoted_prefix) {
            rest
        } else {
            typname.strip_prefix(&plain_prefix).unwrap_or(typname)
        };

        if let Some(stripped) = name.strip_prefix('_') {
            if dimensions == 0 {
                dimensions = 1;
            }
            name = stripped;
        }
        if let Some(stripped) = name.strip_suffix("[]") {
            if dimensions == 0 {
                dimensions = 1;
            }
            name = stripped;
        }
        if name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
            name = &name[1..name.len() - 1];
        }

        self.name = name.to_string();
        self.array = "[]".repeat(dimensions);
    }

    /// Bare type name, without schema, quotes or array brackets.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn oid(&self) -> Oid {
        self.oid
    }

    /// Base type OID for domains, 0 otherwise.
    pub fn base_oid(&self) -> Oid {
        self.base_oid
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Array suffix, one `[]` per dimension.
    pub fn array(&self) -> &str {
        &self.array
    }

    /// Whether the bare name exists in more than one schema.
    pub fn needs_schema(&self) -> bool {
        self.needs_schema
    }

    /// Stored type modifier; -1 for catalog definitions.
    pub fn typmod(&self) -> i32 {
        self.typmod
    }

    /// Whether this is the placeholder for an unresolvable OID.
    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_TYPE_NAME
    }

    /// Semantic class, using the base type for domains.
    pub fn type_class(&self) -> TypeClass {
        TypeClass::of_base(self.oid, self.base_oid)
    }

    /// Decode a type modifier according to this type's family.
    pub fn parse_type_mod(&self, typmod: i32) -> TypeModParts {
        if typmod == -1 {
            return TypeModParts::default();
        }

        let name = self.name.as_str();
        let (length, precision) = if name == "numeric" {
            let m = typmod.wrapping_sub(4);
            (m >> 16, m & 0xFFFF)
        } else if VERBATIM_TYPMOD_NAMES.contains(&name) {
            (typmod, 0)
        } else if name == "interval" {
            (typmod & 0xFFFF, 0)
        } else if name == "date" {
            return TypeModParts::default();
        } else {
            (typmod.wrapping_sub(4), 0)
        };

        let text = if precision != 0 {
            format!("({length},{precision})")
        } else {
            format!("({length})")
        };

        TypeModParts {
            text,
            length,
            precision,
        }
    }

    /// Length decoded from the stored modifier.
    pub fn length(&self) -> i32 {
        self.length_with_typmod(self.typmod)
    }

    /// Precision decoded from the stored modifier.
    pub fn precision(&self) -> i32 {
        self.precision_with_typmod(self.typmod)
    }

    pub fn length_with_typmod(&self, typmod: i32) -> i32 {
        self.parse_type_mod(typmod).length
    }

    pub fn precision_with_typmod(&self, typmod: i32) -> i32 {
        self.parse_type_mod(typmod).precision
    }

    /// Full name with the stored modifier and array suffix.
    pub fn full_name(&self) -> String {
        self.full_name_with_typmod(self.typmod)
    }

    /// Full name with the stored modifier, the bare name quoted if needed.
    pub fn quoted_full_name(&self) -> String {
        self.quoted_full_name_with_typmod(self.typmod)
    }

    /// Full name rendered with `typmod` instead of the stored modifier.
    pub fn full_name_with_typmod(&self, typmod: i32) -> String {
        self.render(typmod, false)
    }

    pub fn quoted_full_name_with_typmod(&self, typmod: i32) -> String {
        self.render(typmod, true)
    }

    fn render(&self, typmod: i32, quoted: bool) -> String {
        let length = self.parse_type_mod(typmod).text;
        let array = &self.array;

        if self.name == "char" && self.schema == "pg_catalog" {
            return format!("\"char\"{array}");
        }

        let zoned = match self.name.as_str() {
            "time with time zone" => Some(("time", " with time zone")),
            "time without time zone" => Some(("time", " without time zone")),
            "timestamp with time zone" => Some(("timestamp", " with time zone")),
            "timestamp without time zone" => Some(("timestamp", " without time zone")),
            _ => None,
        };

        match zoned {
            Some((base, zone)) => format!("{base}{length}{zone}{array}"),
            None if quoted => format!("{}{length}{array}", quote_type_ident(&self.name)),
            None => format!("{}{length}{array}", self.name),
        }
    }

    /// Schema prefix (`"schema."`) needed to reference this type.
    ///
    /// Without a context, `pg_catalog` types and types whose name is unique
    /// are left unqualified.
    pub fn schema_prefix(&self, context: Option<&dyn SchemaContext>) -> String {
        if self.schema.is_empty() || (context.is_none() && self.schema == "pg_catalog") {
            return String::new();
        }
        if self.needs_schema {
            return format!("{}.", self.schema);
        }
        context.map_or_else(String::new, |ctx| ctx.schema_prefix(&self.schema))
    }

    /// Schema prefix with the schema name quoted if needed.
    pub fn quoted_schema_prefix(&self, context: Option<&dyn SchemaContext>) -> String {
        let prefix = self.schema_prefix(context);
        match prefix.strip_suffix('.') {
            Some(schema) => format!("{}.", quote_ident(schema)),
            None => prefix,
        }
    }

    /// Encode user-entered length and precision as a type modifier.
    ///
    /// Returns -1 when no length is given. Unparsable numbers count as 0.
    ///
    /// ```
    /// use pg_typecache::Datatype;
    ///
    /// assert_eq!(Datatype::typmod_for("numeric", "10", "2"), (10 << 16) + 2 + 4);
    /// assert_eq!(Datatype::typmod_for("varchar", "20", ""), 24);
    /// assert_eq!(Datatype::typmod_for("timestamp", "3", ""), 3);
    /// assert_eq!(Datatype::typmod_for("text", "", ""), -1);
    /// ```
    pub fn typmod_for(name: &str, length: &str, precision: &str) -> i32 {
        if length.is_empty() {
            return -1;
        }
        let len = length.trim().parse::<i32>().unwrap_or(0);

        if name == "numeric" {
            let prec = precision.trim().parse::<i32>().unwrap_or(0);
            (len << 16).wrapping_add(prec).wrapping_add(4)
        } else if name == "interval" || VERBATIM_TYPMOD_NAMES.contains(&name) {
            len
        } else {
            len.wrapping_add(4)
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
