//! Cursor over one completed query result.
//!
//! [`ResultCursor`] owns the [`QueryResult`] it was built from and exposes
//! the rows through a 1-based position that can move in both directions.
//! Getters never fail: a NULL cell, a missing column or a read outside the
//! row range produces the zero value of the requested type.
//!
//! [`RowIter`] wraps a cursor for the common "loop over every row" shape.

use chrono::{NaiveDate, NaiveDateTime};

use crate::cache::TypeNameCache;
use crate::connection::{Connection, QueryResult, ResultStatus};
use crate::decode;
use crate::types::{ColumnMetadata, Oid, TypeClass};

/// A column reference accepted by the cursor getters: an index or a name.
pub trait ColumnRef {
    /// Resolve to a column index of `cursor`, or `None` if there is no such column.
    fn index(&self, cursor: &ResultCursor) -> Option<usize>;
}

impl ColumnRef for usize {
    fn index(&self, cursor: &ResultCursor) -> Option<usize> {
        cursor.check_column(*self).then_some(*self)
    }
}

impl ColumnRef for &str {
    fn index(&self, cursor: &ResultCursor) -> Option<usize> {
        cursor.column_index(self)
    }
}

impl ColumnRef for &String {
    fn index(&self, cursor: &ResultCursor) -> Option<usize> {
        cursor.column_index(self)
    }
}

/// Bidirectional cursor over a completed result.
///
/// # Example
///
/// ```
/// use pg_typecache::{ColumnMetadata, QueryResult, ResultCursor};
///
/// let result = QueryResult::new(
///     vec![ColumnMetadata::new("relname", 19), ColumnMetadata::new("relpages", 23)],
///     vec![
///         vec![Some("pg_class".to_string()), Some("14".to_string())],
///         vec![Some("pg_type".to_string()), None],
///     ],
/// );
///
/// let mut cursor = ResultCursor::new(result);
/// let mut pages = 0;
/// while !cursor.eof() {
///     pages += cursor.get_i64("relpages");
///     cursor.move_next();
/// }
/// assert_eq!(pages, 14);
/// ```
#[derive(Debug, Clone)]
pub struct ResultCursor {
    /// The owned result; released when the cursor is dropped.
    result: QueryResult,
    /// Number of columns (0 for non-row results).
    num_columns: usize,
    /// Number of rows (0 for non-row results).
    num_rows: usize,
    /// Current 1-based row; 0 is before the first row.
    pos: usize,
    /// Whether column names are looked up as quoted identifiers.
    quote_columns: bool,
}

impl ResultCursor {
    /// Create a cursor positioned on the first row.
    pub fn new(result: QueryResult) -> Self {
        let (num_columns, num_rows) = match result.status {
            ResultStatus::Tuples => (result.columns.len(), result.rows.len()),
            ResultStatus::Command => (0, 0),
        };

        let mut cursor = Self {
            result,
            num_columns,
            num_rows,
            pos: 0,
            quote_columns: false,
        };
        cursor.move_first();
        cursor
    }

    /// Look up column names as quoted identifiers.
    ///
    /// Needed when the producer labels columns with names that are not
    /// lower-case identifiers; the name is escaped and quoted before lookup.
    pub fn with_column_quoting(mut self, quote_columns: bool) -> Self {
        self.quote_columns = quote_columns;
        self
    }

    /// Execute `sql` and wrap the result.
    ///
    /// Returns `None` after logging if the query fails.
    pub fn query<C: Connection + ?Sized>(conn: &C, sql: &str) -> Option<Self> {
        match conn.execute_query(sql) {
            Ok(result) => Some(Self::new(result)),
            Err(e) => {
                tracing::error!(error = %e, sql, "query failed");
                None
            }
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.num_columns
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.num_rows
    }

    /// Current 1-based row position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the cursor is past the last row (or there are no rows).
    pub fn eof(&self) -> bool {
        self.num_rows == 0 || self.pos > self.num_rows
    }

    /// Whether the cursor is before the first row (or there are no rows).
    pub fn bof(&self) -> bool {
        self.num_rows == 0 || self.pos < 1
    }

    pub fn move_first(&mut self) {
        self.pos = 1;
    }

    pub fn move_last(&mut self) {
        self.pos = self.num_rows;
    }

    pub fn move_next(&mut self) {
        if self.pos <= self.num_rows {
            self.pos += 1;
        }
    }

    pub fn move_previous(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
        }
    }

    /// Rows affected by the command, or -1 if the command reports no count.
    pub fn affected_row_count(&self) -> i64 {
        if self.result.command_tuples.is_empty() {
            -1
        } else {
            decode::decode_i64(&self.result.command_tuples)
        }
    }

    /// Get column metadata.
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.result.columns[..self.num_columns]
    }

    /// Get the label of a column.
    pub fn column_name(&self, col: usize) -> &str {
        self.column(col).map_or("", |c| c.name.as_str())
    }

    /// Get the type OID of a column.
    pub fn column_type_oid(&self, col: usize) -> Oid {
        self.column(col).map_or(0, |c| c.type_oid)
    }

    /// Get the type modifier of a column (-1 when it has none).
    pub fn column_type_modifier(&self, col: usize) -> i32 {
        self.column(col).map_or(-1, |c| c.type_modifier)
    }

    /// Basic type name of a column (`format_type(oid, NULL)`).
    pub fn column_type_name<C: Connection + ?Sized>(
        &self,
        col: usize,
        cache: &mut TypeNameCache<'_, C>,
    ) -> String {
        cache.basic_name(self.column_type_oid(col))
    }

    /// Full type name of a column, including its modifier.
    pub fn column_full_type_name<C: Connection + ?Sized>(
        &self,
        col: usize,
        cache: &mut TypeNameCache<'_, C>,
    ) -> String {
        cache.full_name(self.column_type_oid(col), self.column_type_modifier(col))
    }

    /// Semantic class of a column's type.
    pub fn column_type_class<C: Connection + ?Sized>(
        &self,
        col: usize,
        cache: &mut TypeNameCache<'_, C>,
    ) -> TypeClass {
        cache.type_class(self.column_type_oid(col))
    }

    /// Resolve a column name to its index.
    ///
    /// Logs an error and returns `None` if the column does not exist.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let index = self.find_column(name);
        if index.is_none() {
            tracing::error!(column = name, "column not found in result set");
        }
        index
    }

    /// Check whether a column exists, without logging a miss.
    pub fn has_column(&self, name: &str) -> bool {
        self.find_column(name).is_some()
    }

    /// Raw text of a cell, `None` for NULL or an unavailable cell.
    pub fn get_raw<I: ColumnRef>(&self, col: I) -> Option<&str> {
        let index = col.index(self)?;
        if self.bof() || self.eof() {
            return None;
        }
        self.result
            .rows
            .get(self.pos - 1)?
            .get(index)?
            .as_deref()
    }

    /// Whether a cell is NULL (or unavailable).
    pub fn is_null<I: ColumnRef>(&self, col: I) -> bool {
        self.get_raw(col).is_none()
    }

    /// Text of a cell; empty for NULL.
    pub fn get_text<I: ColumnRef>(&self, col: I) -> &str {
        self.get_raw(col).unwrap_or_default()
    }

    /// Integer value of a cell; 0 for NULL.
    pub fn get_i64<I: ColumnRef>(&self, col: I) -> i64 {
        self.get_raw(col).map_or(0, decode::decode_i64)
    }

    /// Wide unsigned integer value of a cell; 0 for NULL.
    pub fn get_u64<I: ColumnRef>(&self, col: I) -> u64 {
        self.get_raw(col).map_or(0, decode::decode_u64)
    }

    /// Floating point value of a cell; 0.0 for NULL.
    pub fn get_f64<I: ColumnRef>(&self, col: I) -> f64 {
        self.get_raw(col).map_or(0.0, decode::decode_f64)
    }

    /// Boolean value of a cell; false for NULL.
    pub fn get_bool<I: ColumnRef>(&self, col: I) -> bool {
        self.get_raw(col).is_some_and(decode::decode_bool)
    }

    /// OID value of a cell; 0 for NULL.
    pub fn get_oid<I: ColumnRef>(&self, col: I) -> Oid {
        self.get_raw(col).map_or(0, decode::decode_oid)
    }

    /// Timestamp value of a cell; `None` for NULL or unparsable text.
    pub fn get_datetime<I: ColumnRef>(&self, col: I) -> Option<NaiveDateTime> {
        self.get_raw(col).and_then(decode::decode_datetime)
    }

    /// Date value of a cell; `None` for NULL or unparsable text.
    pub fn get_date<I: ColumnRef>(&self, col: I) -> Option<NaiveDate> {
        self.get_raw(col).and_then(decode::decode_date)
    }

    fn column(&self, col: usize) -> Option<&ColumnMetadata> {
        if self.check_column(col) {
            self.result.columns.get(col)
        } else {
            None
        }
    }

    /// Index bounds check. Out of range is a caller bug.
    fn check_column(&self, col: usize) -> bool {
        debug_assert!(
            col < self.num_columns,
            "column index {col} out of bounds (columns: {})",
            self.num_columns
        );
        col < self.num_columns
    }

    fn find_column(&self, name: &str) -> Option<usize> {
        let lookup = if self.quote_columns {
            format!("\"{}\"", name.replace('"', "\"\""))
        } else {
            name.to_string()
        };
        let wanted = fold_field_name(&lookup);
        self.columns().iter().position(|c| c.name == wanted)
    }
}

/// Normalize a field name the way `PQfnumber` does.
///
/// Quoted parts are taken verbatim with `""` collapsed to `"`; everything
/// outside quotes is folded to lower case.
fn fold_field_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    let mut in_quotes = false;
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                folded.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if in_quotes {
            folded.push(c);
        } else {
            folded.extend(c.to_lowercase());
        }
    }
    folded
}

/// Row loop over a cursor.
///
/// The first call to [`RowIter::rows_left`] stays on the first row; each
/// later call advances by one.
///
/// ```
/// use pg_typecache::{ColumnMetadata, QueryResult, ResultCursor, RowIter};
///
/// let result = QueryResult::new(
///     vec![ColumnMetadata::new("n", 23)],
///     vec![vec![Some("1".to_string())], vec![Some("2".to_string())]],
/// );
/// let mut rows = RowIter::new(ResultCursor::new(result));
/// let mut sum = 0;
/// while rows.rows_left() {
///     sum += rows.cursor().map_or(0, |c| c.get_i64(0));
/// }
/// assert_eq!(sum, 3);
/// ```
#[derive(Debug)]
pub struct RowIter {
    cursor: Option<ResultCursor>,
    first: bool,
}

impl RowIter {
    /// Iterate over an existing cursor.
    pub fn new(cursor: ResultCursor) -> Self {
        Self {
            cursor: Some(cursor),
            first: true,
        }
    }

    /// Execute `sql` and iterate over its rows.
    ///
    /// A failed query is logged and yields no rows.
    pub fn query<C: Connection + ?Sized>(conn: &C, sql: &str) -> Self {
        Self {
            cursor: ResultCursor::query(conn, sql),
            first: true,
        }
    }

    /// Advance to the next row; returns false once the rows are exhausted.
    pub fn rows_left(&mut self) -> bool {
        let Some(cursor) = self.cursor.as_mut() else {
            return false;
        };

        if self.first {
            if cursor.row_count() == 0 {
                return false;
            }
            self.first = false;
        } else {
            cursor.move_next();
        }

        !cursor.eof()
    }

    /// Step back one row. Returns false if there is no cursor.
    pub fn move_prev(&mut self) -> bool {
        match self.cursor.as_mut() {
            Some(cursor) => {
                cursor.move_previous();
                true
            }
            None => false,
        }
    }

    /// The underlying cursor, if the query succeeded.
    pub fn cursor(&self) -> Option<&ResultCursor> {
        self.cursor.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::types::{PG_TYPE_BOOL, PG_TYPE_INT4, PG_TYPE_TEXT, PG_TYPE_TIMESTAMP};

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn make_result() -> QueryResult {
        QueryResult::new(
            vec![
                ColumnMetadata::new("id", PG_TYPE_INT4),
                ColumnMetadata::new("name", PG_TYPE_TEXT).with_modifier(-1),
                ColumnMetadata::new("active", PG_TYPE_BOOL),
                ColumnMetadata::new("created", PG_TYPE_TIMESTAMP).with_modifier(3),
            ],
            vec![
                vec![cell("1"), cell("alpha"), cell("t"), cell("2024-10-21 12:36:05")],
                vec![cell("2"), None, cell("on"), None],
                vec![cell("-3"), cell("gamma"), cell("f"), cell("infinity")],
            ],
        )
    }

    #[test]
    fn test_counts_and_initial_position() {
        let cursor = ResultCursor::new(make_result());
        assert_eq!(cursor.column_count(), 4);
        assert_eq!(cursor.row_count(), 3);
        assert_eq!(cursor.position(), 1);
        assert!(!cursor.bof());
        assert!(!cursor.eof());
    }

    #[test]
    fn test_navigation_bounds() {
        let mut cursor = ResultCursor::new(make_result());
        cursor.move_next();
        cursor.move_next();
        assert_eq!(cursor.get_i64(0), -3);
        cursor.move_next();
        assert!(cursor.eof());
        cursor.move_next();
        assert_eq!(cursor.position(), 4, "position never passes row_count + 1");

        cursor.move_last();
        assert_eq!(cursor.get_text("name"), "gamma");

        cursor.move_first();
        cursor.move_previous();
        assert!(cursor.bof());
        cursor.move_previous();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.get_text(1), "", "no cell before the first row");
    }

    #[test]
    fn test_typed_getters() {
        let mut cursor = ResultCursor::new(make_result());
        assert_eq!(cursor.get_i64("id"), 1);
        assert_eq!(cursor.get_text("name"), "alpha");
        assert!(cursor.get_bool("active"));
        assert_eq!(
            cursor.get_datetime("created").map(|d| d.to_string()),
            Some("2024-10-21 12:36:05".to_string())
        );
        assert_eq!(cursor.get_f64(0), 1.0);
        assert_eq!(cursor.get_u64(0), 1);
        assert_eq!(cursor.get_oid(0), 1);

        cursor.move_next();
        assert!(cursor.get_bool(2), "'on' is true");
        assert!(cursor.is_null(1));
        assert_eq!(cursor.get_text(1), "");
        assert!(cursor.get_datetime(3).is_none());
        assert!(cursor.get_date(3).is_none());

        cursor.move_next();
        assert!(!cursor.get_bool(2));
        assert!(cursor.get_datetime(3).is_none(), "infinity is not a date");
    }

    #[test]
    fn test_column_metadata() {
        let cursor = ResultCursor::new(make_result());
        assert_eq!(cursor.column_name(3), "created");
        assert_eq!(cursor.column_type_oid(3), PG_TYPE_TIMESTAMP);
        assert_eq!(cursor.column_type_modifier(3), 3);
        assert_eq!(cursor.column_type_modifier(0), -1);
    }

    #[test]
    fn test_missing_column_name_is_zero_value() {
        let cursor = ResultCursor::new(make_result());
        assert_eq!(cursor.column_index("missing"), None);
        assert!(!cursor.has_column("missing"));
        assert_eq!(cursor.get_i64("missing"), 0);
        assert_eq!(cursor.get_text("missing"), "");
        assert!(!cursor.get_bool("missing"));
    }

    #[test]
    fn test_unquoted_lookup_folds_case() {
        let cursor = ResultCursor::new(make_result());
        assert_eq!(cursor.column_index("NAME"), Some(1));
    }

    #[test]
    fn test_quoted_lookup_escapes_embedded_quotes() {
        let result = QueryResult::new(
            vec![
                ColumnMetadata::new("say\"hi", PG_TYPE_TEXT),
                ColumnMetadata::new("Mixed Case", PG_TYPE_TEXT),
            ],
            vec![vec![cell("one"), cell("two")]],
        );

        let plain = ResultCursor::new(result.clone());
        assert!(!plain.has_column("Mixed Case"));

        let cursor = ResultCursor::new(result).with_column_quoting(true);
        assert_eq!(cursor.column_index("say\"hi"), Some(0));
        assert_eq!(cursor.get_text("Mixed Case"), "two");
        assert!(!cursor.has_column("mixed case"));
    }

    #[test]
    fn test_fold_field_name() {
        assert_eq!(fold_field_name("AbC"), "abc");
        assert_eq!(fold_field_name("\"AbC\""), "AbC");
        assert_eq!(fold_field_name("\"a\"\"b\""), "a\"b");
        assert_eq!(fold_field_name("X\"Y\"z"), "xYz");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of bounds")]
    fn test_index_out_of_range_asserts() {
        let cursor = ResultCursor::new(make_result());
        cursor.get_text(9);
    }

    #[test]
    fn test_affected_row_count() {
        let select = ResultCursor::new(make_result());
        assert_eq!(select.affected_row_count(), -1);

        let update = ResultCursor::new(QueryResult::command("5"));
        assert_eq!(update.affected_row_count(), 5);
        assert_eq!(update.row_count(), 0);
        assert!(update.eof() && update.bof());

        let ddl = ResultCursor::new(QueryResult::command(""));
        assert_eq!(ddl.affected_row_count(), -1);
    }

    #[test]
    fn test_command_result_hides_columns() {
        let mut result = make_result();
        result.status = ResultStatus::Command;
        let cursor = ResultCursor::new(result);
        assert_eq!(cursor.column_count(), 0);
        assert_eq!(cursor.row_count(), 0);
        assert!(cursor.columns().is_empty());
    }

    #[test]
    fn test_row_iter() {
        let mut rows = RowIter::new(ResultCursor::new(make_result()));
        let mut ids = Vec::new();
        while rows.rows_left() {
            ids.push(rows.cursor().map_or(0, |c| c.get_i64("id")));
        }
        assert_eq!(ids, vec![1, 2, -3]);

        assert!(rows.move_prev());
        assert_eq!(rows.cursor().map(|c| c.get_i64(0)), Some(-3));
    }

    #[test]
    fn test_row_iter_empty_and_failed() {
        struct Failing;
        impl Connection for Failing {
            fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
                Err(Error::query("server closed the connection"))
            }
        }

        let mut failed = RowIter::query(&Failing, "SELECT 1");
        assert!(!failed.rows_left());
        assert!(!failed.move_prev());
        assert!(failed.cursor().is_none());

        let empty = QueryResult::new(vec![ColumnMetadata::new("n", PG_TYPE_INT4)], vec![]);
        let mut rows = RowIter::new(ResultCursor::new(empty));
        assert!(!rows.rows_left());
    }
}
