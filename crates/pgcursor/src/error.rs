//! Error types for pgcursor

use crate::cursor::StatementKind;
use thiserror::Error;

/// Result type alias for pgcursor operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// A condition pair had the wrong shape (or `and`/`or` came before `where_`)
    #[error("Malformed condition: {0}")]
    MalformedCondition(String),

    /// The condition expression starts with no known operator and has no wildcard
    #[error("Unrecognized operator in condition on '{column}': {expression:?}")]
    UnrecognizedOperator { column: String, expression: String },

    /// UPDATE/DELETE rendered without a WHERE clause
    #[error("{0} requires a WHERE condition")]
    MissingCondition(StatementKind),

    /// Execution needs a completion handler to deliver its rows
    #[error("{0} requires a completion handler")]
    MissingCallback(StatementKind),

    /// A second operation was selected on the same cursor
    #[error("Cursor already builds {current}; cannot switch to {requested}")]
    OperationAlreadySet {
        current: StatementKind,
        requested: StatementKind,
    },

    /// Structural builder error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error reported by the Postgres driver
    #[error("Driver error: {0}")]
    Driver(#[from] tokio_postgres::Error),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl DbError {
    /// Create a malformed condition error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedCondition(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a malformed condition error
    pub fn is_malformed_condition(&self) -> bool {
        matches!(self, Self::MalformedCondition(_))
    }

    /// Check if this is a missing condition error
    pub fn is_missing_condition(&self) -> bool {
        matches!(self, Self::MissingCondition(_))
    }

    /// Check if this error came from the driver or the pool, i.e. after dispatch
    pub fn is_driver_error(&self) -> bool {
        matches!(self, Self::Driver(_) | Self::Pool(_))
    }
}

impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_statement_kind() {
        let err = DbError::MissingCondition(StatementKind::Delete);
        assert_eq!(err.to_string(), "DELETE requires a WHERE condition");

        let err = DbError::OperationAlreadySet {
            current: StatementKind::Insert,
            requested: StatementKind::Update,
        };
        assert_eq!(
            err.to_string(),
            "Cursor already builds INSERT; cannot switch to UPDATE"
        );
    }

    #[test]
    fn predicates() {
        assert!(DbError::malformed("x").is_malformed_condition());
        assert!(DbError::MissingCondition(StatementKind::Update).is_missing_condition());
        assert!(DbError::Pool("exhausted".into()).is_driver_error());
        assert!(!DbError::validation("x").is_driver_error());
    }
}
