//! The database connection seam.
//!
//! Connecting, authenticating and speaking the wire protocol are the job of
//! whatever owns the session. This crate only needs to run a query and get
//! back a complete result, which is what [`Connection`] describes.

use crate::error::Result;
use crate::types::ColumnMetadata;

/// Outcome status of a completed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultStatus {
    /// The command returned a row set (`PGRES_TUPLES_OK`).
    #[default]
    Tuples,
    /// The command completed without returning rows (`PGRES_COMMAND_OK`).
    Command,
}

/// A completed query result in text format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Outcome status.
    pub status: ResultStatus,
    /// Column metadata.
    pub columns: Vec<ColumnMetadata>,
    /// Rows of nullable text cells, one entry per column.
    pub rows: Vec<Vec<Option<String>>>,
    /// Row count reported in the command tag (`PQcmdTuples`), empty when
    /// the command does not report one.
    pub command_tuples: String,
}

impl QueryResult {
    /// Create a row set result.
    ///
    /// The command tag carries no row count; use [`QueryResult::with_tuples`]
    /// for `INSERT ... RETURNING` style results that report one.
    pub fn new(columns: Vec<ColumnMetadata>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            status: ResultStatus::Tuples,
            columns,
            rows,
            command_tuples: String::new(),
        }
    }

    /// Set the row count reported in the command tag.
    pub fn with_tuples(mut self, tuples: impl Into<String>) -> Self {
        self.command_tuples = tuples.into();
        self
    }

    /// Create the result of a command that returns no rows.
    ///
    /// `tuples` is the affected-row text of the command tag, e.g. `"5"` for
    /// `UPDATE 5`, or empty for commands like `CREATE TABLE`.
    pub fn command(tuples: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Command,
            columns: Vec::new(),
            rows: Vec::new(),
            command_tuples: tuples.into(),
        }
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A synchronous database session able to run catalog queries.
///
/// Every call blocks the calling thread until the server has answered.
/// Methods take `&self` so that several caches can borrow the same session;
/// implementations keep whatever interior state they need.
pub trait Connection {
    /// Run a query and return its complete result.
    fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Run a query and return the first cell of its first row.
    ///
    /// A NULL cell or an empty result yields an empty string.
    fn execute_scalar(&self, sql: &str) -> Result<String> {
        let result = self.execute_query(sql)?;
        Ok(result
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next().flatten())
            .unwrap_or_default())
    }
}
