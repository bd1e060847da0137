//! Error types for the type metadata layer.
//!
//! Errors only travel across the [`Connection`](crate::Connection) seam.
//! Caches, cursors and readers log them and fall back to sentinel values.

use thiserror::Error;

/// Result type alias for database round trips.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for database round trips and catalog decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The query failed on the server or in the transport.
    #[error("Query failed: {message}")]
    Query { message: String },

    /// A server response could not be turned into a [`QueryResult`](crate::QueryResult).
    #[error("Type conversion error: {message}")]
    TypeConversion { message: String },
}

impl Error {
    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a type conversion error.
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }
}
