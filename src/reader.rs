//! Forward-only reader over `pg_type` rows.
//!
//! A [`DatatypeReader`] runs its query once, on construction, and then
//! walks the rows. To read again, build a new reader.
//!
//! Rows are ordered with `pg_catalog` first, then `public`, then the other
//! schemas by name, then by type name, so that type pickers show the
//! everyday types before user schemas.

use crate::connection::Connection;
use crate::cursor::ResultCursor;
use crate::options::ReaderOptions;
use crate::types::{Datatype, Oid, TypeKind};

/// Filter excluding pseudo types, table row types and their implicit arrays.
const LISTING_FILTER: &str = "AND NOT EXISTS (SELECT 1 FROM pg_class WHERE relnamespace=typnamespace AND relname = typname AND relkind != 'c') \
     AND (typname NOT LIKE '_%' OR NOT EXISTS (SELECT 1 FROM pg_class WHERE relnamespace=typnamespace AND relname = substring(typname FROM 2)::name AND relkind != 'c'))";

/// Streams catalog type definitions.
///
/// # Example
///
/// ```no_run
/// use pg_typecache::{Connection, DatatypeReader, ReaderOptions};
///
/// fn type_choices(conn: &impl Connection) -> Vec<String> {
///     DatatypeReader::new(conn, &ReaderOptions::new().with_serials(true))
///         .map(|datatype| datatype.full_name())
///         .collect()
/// }
/// ```
#[derive(Debug)]
pub struct DatatypeReader {
    cursor: Option<ResultCursor>,
    sql: String,
}

impl DatatypeReader {
    /// List user-selectable types according to `options`.
    pub fn new<C: Connection + ?Sized>(conn: &C, options: &ReaderOptions) -> Self {
        let mut condition = String::from("typisdefined AND typtype ");
        if options.domains {
            condition.push_str("IN ('b', 'c', 'd', 'e', 'r') ");
        } else {
            condition.push_str("IN ('b', 'c', 'e', 'r') ");
        }
        condition.push_str(LISTING_FILTER);
        if !options.system_objects {
            condition.push_str(" AND nsp.nspname != 'information_schema'");
        }

        Self::run(conn, &condition, options.serials, false, options.limit)
    }

    /// List the types matching a caller-supplied `WHERE` condition.
    ///
    /// The condition may reference `t` (`pg_type`) and `nsp` (`pg_namespace`).
    pub fn with_condition<C: Connection + ?Sized>(
        conn: &C,
        condition: &str,
        add_serials: bool,
    ) -> Self {
        Self::run(conn, condition, add_serials, false, None)
    }

    /// Read the single type with the given OID, pseudo types included.
    pub fn by_oid<C: Connection + ?Sized>(conn: &C, oid: Oid) -> Self {
        Self::run(conn, &format!("t.oid = {oid}"), false, true, None)
    }

    fn run<C: Connection + ?Sized>(
        conn: &C,
        condition: &str,
        add_serials: bool,
        allow_unknown: bool,
        limit: Option<usize>,
    ) -> Self {
        let sql = build_sql(condition, add_serials, allow_unknown, limit);
        let cursor = ResultCursor::query(conn, &sql);
        if let Some(cursor) = &cursor {
            tracing::debug!(rows = cursor.row_count(), "datatype reader loaded");
        }
        Self { cursor, sql }
    }

    /// The query this reader ran.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Whether the query ran. False means it failed and nothing can be read.
    pub fn is_loaded(&self) -> bool {
        self.cursor.is_some()
    }

    /// Whether a current row is available.
    pub fn has_more(&self) -> bool {
        self.cursor.as_ref().is_some_and(|c| !c.eof())
    }

    pub fn move_next(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.move_next();
        }
    }

    /// Project the current row into a [`Datatype`].
    pub fn datatype(&self) -> Datatype {
        Datatype::catalog(
            self.oid(),
            self.schema(),
            self.type_name(),
            self.kind(),
            self.cursor.as_ref().is_some_and(|c| c.get_bool("isdup")),
        )
        .with_base_oid(self.cursor.as_ref().map_or(0, |c| c.get_oid("typbasetype")))
    }

    /// Type name as printed by `format_type(oid, NULL)`.
    pub fn type_name(&self) -> &str {
        self.text("typname")
    }

    pub fn schema(&self) -> &str {
        self.text("nspname")
    }

    pub fn oid(&self) -> Oid {
        self.cursor.as_ref().map_or(0, |c| c.get_oid("oid"))
    }

    /// OID of the current row as text.
    pub fn oid_str(&self) -> &str {
        self.text("oid")
    }

    pub fn kind(&self) -> TypeKind {
        self.text("typtype")
            .chars()
            .next()
            .map_or(TypeKind::Unknown, TypeKind::from_code)
    }

    pub fn is_domain(&self) -> bool {
        self.kind() == TypeKind::Domain
    }

    fn text(&self, column: &str) -> &str {
        self.cursor.as_ref().map_or("", |c| c.get_text(column))
    }
}

impl Iterator for DatatypeReader {
    type Item = Datatype;

    fn next(&mut self) -> Option<Datatype> {
        if !self.has_more() {
            return None;
        }
        let datatype = self.datatype();
        self.move_next();
        Some(datatype)
    }
}

fn build_sql(condition: &str, add_serials: bool, allow_unknown: bool, limit: Option<usize>) -> String {
    let mut sql = String::from(
        "SELECT * FROM (SELECT format_type(t.oid,NULL) AS typname, typtype, t.oid AS oid, nspname, typbasetype,\n\
         \x20      (SELECT COUNT(1) FROM pg_type t2 WHERE t2.typname = t.typname) > 1 AS isdup\n\
         \x20 FROM pg_type t\n\
         \x20 JOIN pg_namespace nsp ON typnamespace=nsp.oid\n\
         \x20WHERE ",
    );
    if !allow_unknown {
        sql.push_str("(NOT (typname = 'unknown' AND nspname = 'pg_catalog')) AND ");
    }
    sql.push_str(condition);
    sql.push('\n');

    if add_serials {
        sql.push_str(" UNION SELECT 'bigserial', 'b', 0, 'pg_catalog', 0, false\n");
        sql.push_str(" UNION SELECT 'serial', 'b', 0, 'pg_catalog', 0, false\n");
    }

    sql.push_str("  ) AS dummy ORDER BY nspname <> 'pg_catalog', nspname <> 'public', nspname, 1");
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::QueryResult;
    use crate::error::{Error, Result};
    use crate::types::{ColumnMetadata, PG_TYPE_INT4, PG_TYPE_TEXT};
    use std::cell::RefCell;

    /// Answers every query with the same rows and remembers the SQL.
    struct Canned {
        rows: Vec<[&'static str; 6]>,
        seen: RefCell<Vec<String>>,
    }

    impl Canned {
        fn new(rows: Vec<[&'static str; 6]>) -> Self {
            Self {
                rows,
                seen: RefCell::new(Vec::new()),
            }
        }

        fn last_sql(&self) -> String {
            self.seen.borrow().last().cloned().unwrap_or_default()
        }
    }

    impl Connection for Canned {
        fn execute_query(&self, sql: &str) -> Result<QueryResult> {
            self.seen.borrow_mut().push(sql.to_string());
            let columns = ["typname", "typtype", "oid", "nspname", "typbasetype", "isdup"]
                .iter()
                .map(|name| ColumnMetadata::new(*name, PG_TYPE_TEXT))
                .collect();
            let rows = self
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
                .collect();
            Ok(QueryResult::new(columns, rows))
        }
    }

    #[test]
    fn test_iterates_rows() {
        let conn = Canned::new(vec![
            ["integer", "b", "23", "pg_catalog", "0", "f"],
            ["mood", "e", "16400", "public", "0", "t"],
            ["app.zip", "d", "16410", "app", "25", "f"],
        ]);

        let mut reader = DatatypeReader::new(&conn, &ReaderOptions::new());
        assert!(reader.has_more());
        assert_eq!(reader.type_name(), "integer");
        assert_eq!(reader.oid(), PG_TYPE_INT4);
        assert_eq!(reader.oid_str(), "23");
        assert!(!reader.is_domain());

        reader.move_next();
        let mood = reader.datatype();
        assert_eq!(mood.name(), "mood");
        assert_eq!(mood.kind(), TypeKind::Enum);
        assert!(mood.needs_schema());

        reader.move_next();
        assert!(reader.is_domain());
        assert_eq!(reader.schema(), "app");
        let zip = reader.datatype();
        assert_eq!(zip.name(), "zip");
        assert_eq!(zip.base_oid(), PG_TYPE_TEXT);

        reader.move_next();
        assert!(!reader.has_more());
    }

    #[test]
    fn test_iterator_adapter() {
        let conn = Canned::new(vec![
            ["integer", "b", "23", "pg_catalog", "0", "f"],
            ["_int4", "b", "1007", "pg_catalog", "0", "f"],
        ]);
        let names: Vec<String> = DatatypeReader::new(&conn, &ReaderOptions::new())
            .map(|d| d.full_name())
            .collect();
        assert_eq!(names, vec!["integer", "int4[]"]);
    }

    #[test]
    fn test_default_filter() {
        let conn = Canned::new(vec![]);
        let reader = DatatypeReader::new(&conn, &ReaderOptions::new());
        let sql = reader.sql();
        assert!(sql.contains("IN ('b', 'c', 'd', 'e', 'r')"));
        assert!(sql.contains("nsp.nspname != 'information_schema'"));
        assert!(sql.contains("NOT (typname = 'unknown' AND nspname = 'pg_catalog')"));
        assert!(sql.ends_with("ORDER BY nspname <> 'pg_catalog', nspname <> 'public', nspname, 1"));
        assert!(!sql.contains("serial"));
        assert_eq!(conn.last_sql(), sql);
    }

    #[test]
    fn test_options_shape_query() {
        let conn = Canned::new(vec![]);
        let options = ReaderOptions::new()
            .with_domains(false)
            .with_serials(true)
            .show_system_objects(true)
            .with_limit(25);
        let reader = DatatypeReader::new(&conn, &options);
        let sql = reader.sql();
        assert!(sql.contains("IN ('b', 'c', 'e', 'r')"));
        assert!(!sql.contains("information_schema"));
        assert!(sql.contains("UNION SELECT 'bigserial'"));
        assert!(sql.contains("UNION SELECT 'serial'"));
        assert!(sql.ends_with(" LIMIT 25"));
    }

    #[test]
    fn test_by_oid_allows_unknown() {
        let conn = Canned::new(vec![["unknown", "p", "705", "pg_catalog", "0", "f"]]);
        let reader = DatatypeReader::by_oid(&conn, 705);
        assert!(reader.sql().contains("t.oid = 705"));
        assert!(!reader.sql().contains("typname = 'unknown'"));
        assert_eq!(reader.kind(), TypeKind::Pseudo);
    }

    #[test]
    fn test_custom_condition() {
        let conn = Canned::new(vec![]);
        let reader = DatatypeReader::with_condition(&conn, "typtype = 'e'", false);
        assert!(reader.sql().contains("AND typtype = 'e'\n"));
        assert!(!reader.has_more());
        assert!(reader.is_loaded());
    }

    #[test]
    fn test_failed_query_reads_nothing() {
        struct Broken;
        impl Connection for Broken {
            fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
                Err(Error::query("permission denied for table pg_type"))
            }
        }

        let mut reader = DatatypeReader::new(&Broken, &ReaderOptions::new());
        assert!(!reader.is_loaded());
        assert!(!reader.has_more());
        assert_eq!(reader.type_name(), "");
        assert_eq!(reader.oid(), 0);
        assert_eq!(reader.kind(), TypeKind::Unknown);
        assert!(reader.next().is_none());
    }
}
