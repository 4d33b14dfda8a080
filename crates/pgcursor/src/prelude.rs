//! Convenient imports for typical `pgcursor` usage.
//!
//! ```ignore
//! use pgcursor::prelude::*;
//! ```

pub use crate::{
    Cursor, Database, DatabaseConfig, DbError, DbResult, GenericClient, LogConfig, Statement,
    StatementKind, Value,
};
