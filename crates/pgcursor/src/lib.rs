//! # pgcursor
//!
//! A fluent statement builder for PostgreSQL.
//!
//! Chained calls on a [`Cursor`] become one parameterized statement (SQL text
//! with `$1, $2, ...` placeholders plus the matching argument list), which is
//! sent through a pooled connection.
//!
//! ## Features
//!
//! - **Compact conditions**: `{column: expression}` pairs carry their operator
//!   as a prefix (`"=5"`, `">=18"`, `"<>x"`, `"Jo*"` for LIKE)
//! - **Injection-safe**: literals are always bound, never interpolated
//! - **Correct numbering**: SET/VALUES placeholders first, then conditions, in
//!   the same order as the argument list
//! - **Safe defaults**: UPDATE and DELETE require a WHERE condition
//! - **Fail fast**: builder errors surface before anything is sent
//!
//! ## Example
//!
//! ```ignore
//! use pgcursor::prelude::*;
//!
//! let db = Database::connect(&DatabaseConfig::from_env()?).await?;
//!
//! // SELECT name, age FROM users WHERE age >= $1 AND name LIKE $2 ORDER BY age DESC
//! let rows = db
//!     .sql()
//!     .select(["name", "age"])?
//!     .in_table("users")
//!     .where_([("age", ">=18")])?
//!     .and([("name", "A*")])?
//!     .in_order([("age", "DESC")])?
//!     .execute()
//!     .await?;
//!
//! // INSERT INTO users(name, age) VALUES ($1, $2)
//! db.sql()
//!     .insert([("name", Value::from("alice")), ("age", Value::from(30))])?
//!     .in_table("users")
//!     .execute()
//!     .await?;
//!
//! // UPDATE users SET age = $1 WHERE id = $2
//! db.sql()
//!     .update([("age", 31)])?
//!     .in_table("users")
//!     .where_([("id", "=1")])?
//!     .execute()
//!     .await?;
//!
//! // DELETE FROM users WHERE id = $1
//! db.sql().delete()?.in_table("users").where_([("id", "=1")])?.execute().await?;
//! ```

pub mod client;
pub mod condition;
pub mod config;
pub mod cursor;
pub mod database;
pub mod error;
pub mod logging;
pub mod pool;
pub mod prelude;
pub mod value;

pub use client::GenericClient;
pub use condition::{Condition, Op};
pub use config::DatabaseConfig;
pub use cursor::{Cursor, Statement, StatementKind};
pub use database::Database;
pub use error::{DbError, DbResult};
pub use logging::LogConfig;
pub use pool::{DEFAULT_POOL_SIZE, create_pool, create_pool_with_config, create_pool_with_tls};
pub use value::Value;
