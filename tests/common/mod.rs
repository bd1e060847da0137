//! In-memory stand-in for a PostgreSQL server's type catalog.
//!
//! Understands the handful of catalog queries the caches and the reader
//! send, and records every statement so tests can count round trips.

#![allow(dead_code)]

use pg_typecache::{ColumnMetadata, Connection, Error, Oid, QueryResult, Result, PG_TYPE_TEXT};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone)]
pub struct TypeRow {
    pub oid: Oid,
    pub basic: &'static str,
    pub typtype: char,
    pub schema: &'static str,
    pub base_oid: Oid,
    pub typtypmod: i32,
}

impl TypeRow {
    fn new(oid: Oid, basic: &'static str, typtype: char, schema: &'static str) -> Self {
        Self {
            oid,
            basic,
            typtype,
            schema,
            base_oid: 0,
            typtypmod: -1,
        }
    }

    /// Mimics `format_type(oid, typmod)` for the types used in tests.
    fn format(&self, typmod: i32) -> String {
        if typmod < 0 {
            return self.basic.to_string();
        }
        match self.basic {
            "numeric" => {
                let m = typmod - 4;
                format!("numeric({},{})", m >> 16, m & 0xFFFF)
            }
            "character varying" | "character" => format!("{}({})", self.basic, typmod - 4),
            "timestamp without time zone" => format!("timestamp({typmod}) without time zone"),
            _ => self.basic.to_string(),
        }
    }
}

pub struct FakeCatalog {
    rows: Vec<TypeRow>,
    queries: RefCell<Vec<String>>,
    failing: Cell<bool>,
}

impl FakeCatalog {
    pub fn new(rows: Vec<TypeRow>) -> Self {
        Self {
            rows,
            queries: RefCell::new(Vec::new()),
            failing: Cell::new(false),
        }
    }

    /// A catalog holding the common built-in types plus a domain.
    pub fn standard() -> Self {
        let mut short_text = TypeRow::new(16_500, "short_text", 'd', "public");
        short_text.base_oid = 1043;
        short_text.typtypmod = 24;

        Self::new(vec![
            TypeRow::new(16, "boolean", 'b', "pg_catalog"),
            TypeRow::new(17, "bytea", 'b', "pg_catalog"),
            TypeRow::new(18, "\"char\"", 'b', "pg_catalog"),
            TypeRow::new(19, "name", 'b', "pg_catalog"),
            TypeRow::new(20, "bigint", 'b', "pg_catalog"),
            TypeRow::new(21, "smallint", 'b', "pg_catalog"),
            TypeRow::new(23, "integer", 'b', "pg_catalog"),
            TypeRow::new(25, "text", 'b', "pg_catalog"),
            TypeRow::new(26, "oid", 'b', "pg_catalog"),
            TypeRow::new(27, "tid", 'b', "pg_catalog"),
            TypeRow::new(28, "xid", 'b', "pg_catalog"),
            TypeRow::new(29, "cid", 'b', "pg_catalog"),
            TypeRow::new(700, "real", 'b', "pg_catalog"),
            TypeRow::new(701, "double precision", 'b', "pg_catalog"),
            TypeRow::new(705, "unknown", 'p', "pg_catalog"),
            TypeRow::new(790, "money", 'b', "pg_catalog"),
            TypeRow::new(1003, "name[]", 'b', "pg_catalog"),
            TypeRow::new(1007, "integer[]", 'b', "pg_catalog"),
            TypeRow::new(1042, "character", 'b', "pg_catalog"),
            TypeRow::new(1043, "character varying", 'b', "pg_catalog"),
            TypeRow::new(1082, "date", 'b', "pg_catalog"),
            TypeRow::new(1083, "time without time zone", 'b', "pg_catalog"),
            TypeRow::new(1114, "timestamp without time zone", 'b', "pg_catalog"),
            TypeRow::new(1184, "timestamp with time zone", 'b', "pg_catalog"),
            TypeRow::new(1186, "interval", 'b', "pg_catalog"),
            TypeRow::new(1266, "time with time zone", 'b', "pg_catalog"),
            TypeRow::new(1560, "bit", 'b', "pg_catalog"),
            TypeRow::new(1562, "bit varying", 'b', "pg_catalog"),
            TypeRow::new(1700, "numeric", 'b', "pg_catalog"),
            short_text,
        ])
    }

    pub fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    pub fn last_query(&self) -> String {
        self.queries.borrow().last().cloned().unwrap_or_default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn find(&self, oid: Oid) -> Option<&TypeRow> {
        self.rows.iter().find(|row| row.oid == oid)
    }

    fn name_cache_result(&self, rows: &[&TypeRow], with_oid: bool, bymod: Option<i32>) -> QueryResult {
        let mut names = Vec::new();
        if with_oid {
            names.push("oid");
        }
        names.extend(["typtypmod", "typbasetype", "basic", "def"]);
        if bymod.is_some() {
            names.push("bymod");
        }
        let columns = names
            .iter()
            .map(|name| ColumnMetadata::new(*name, PG_TYPE_TEXT))
            .collect();

        let data = rows
            .iter()
            .map(|row| {
                let mut cells = Vec::new();
                if with_oid {
                    cells.push(Some(row.oid.to_string()));
                }
                cells.push(Some(row.typtypmod.to_string()));
                cells.push(Some(row.base_oid.to_string()));
                cells.push(Some(row.basic.to_string()));
                cells.push(Some(row.format(row.typtypmod)));
                if let Some(typmod) = bymod {
                    cells.push(Some(row.format(typmod)));
                }
                cells
            })
            .collect();
        QueryResult::new(columns, data)
    }

    fn reader_result(&self, rows: &[&TypeRow]) -> QueryResult {
        let columns = ["typname", "typtype", "oid", "nspname", "typbasetype", "isdup"]
            .iter()
            .map(|name| ColumnMetadata::new(*name, PG_TYPE_TEXT))
            .collect();
        let data = rows
            .iter()
            .map(|row| {
                vec![
                    Some(row.basic.to_string()),
                    Some(row.typtype.to_string()),
                    Some(row.oid.to_string()),
                    Some(row.schema.to_string()),
                    Some(row.base_oid.to_string()),
                    Some("f".to_string()),
                ]
            })
            .collect();
        QueryResult::new(columns, data)
    }
}

/// Integer following `marker` in `sql`, if any.
fn number_after(sql: &str, marker: &str) -> Option<i64> {
    let rest = sql.split(marker).nth(1)?;
    let digits: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    digits.parse().ok()
}

impl Connection for FakeCatalog {
    fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.queries.borrow_mut().push(sql.to_string());
        if self.failing.get() {
            return Err(Error::query("terminating connection due to administrator command"));
        }

        let limit = number_after(sql, " LIMIT ").map_or(usize::MAX, |n| n as usize);

        if let Some(oid) = number_after(sql, "SELECT format_type(") {
            let typmod = sql
                .split(',')
                .nth(1)
                .and_then(|rest| rest.trim_end_matches(')').parse::<i32>().ok())
                .unwrap_or(-1);
            let name = self
                .find(oid as Oid)
                .map(|row| row.format(typmod))
                .unwrap_or_default();
            let columns = vec![ColumnMetadata::new("format_type", PG_TYPE_TEXT)];
            return Ok(QueryResult::new(columns, vec![vec![Some(name)]]));
        }

        if sql.contains("FROM pg_type WHERE oid=") {
            let oid = number_after(sql, "WHERE oid=").unwrap_or(0) as Oid;
            let bymod = sql
                .split("format_type(oid,")
                .filter_map(|part| part.split(')').next())
                .find_map(|m| m.parse::<i32>().ok());
            let rows: Vec<&TypeRow> = self.find(oid).into_iter().collect();
            return Ok(self.name_cache_result(&rows, false, bymod));
        }

        if sql.starts_with("SELECT oid,") {
            let rows: Vec<&TypeRow> = self.rows.iter().take(limit).collect();
            return Ok(self.name_cache_result(&rows, true, None));
        }

        if let Some(oid) = number_after(sql, "t.oid = ") {
            let rows: Vec<&TypeRow> = self.find(oid as Oid).into_iter().collect();
            return Ok(self.reader_result(&rows));
        }

        if sql.contains("FROM pg_type t") {
            let with_domains = sql.contains("'d'");
            let rows: Vec<&TypeRow> = self
                .rows
                .iter()
                .filter(|row| {
                    matches!(row.typtype, 'b' | 'c' | 'e' | 'r')
                        || (with_domains && row.typtype == 'd')
                })
                .take(limit)
                .collect();
            return Ok(self.reader_result(&rows));
        }

        Err(Error::query(format!("syntax error in {sql:?}")))
    }
}
