//! The chainable statement builder.
//!
//! A [`Cursor`] accumulates one statement: its operation, target table,
//! fields and values, conditions and ordering. It renders exactly one of four
//! statement shapes and sends it through the [`Database`]'s client.
//!
//! ```ignore
//! let rows = db
//!     .sql()
//!     .select(["id", "name"])?
//!     .in_table("users")
//!     .where_([("age", ">=18")])?
//!     .or([("name", "adm*")])?
//!     .in_order([("name", "")])?
//!     .execute()
//!     .await?;
//! // SELECT id, name FROM users WHERE age >= $1 OR name LIKE $2 ORDER BY name ASC
//! ```
//!
//! A cursor is single-owner: every chain method takes it by value, and
//! [`Cursor::build`] / [`Cursor::execute`] consume it. Use one cursor per
//! in-flight statement.

mod render;


pub use render::Statement;

use crate::client::GenericClient;
use crate::condition::{self, Condition};
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::value::Value;
use std::fmt;

/// The kind of statement a cursor builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// SQL keyword for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The selected operation, carrying what its renderer needs.
#[derive(Debug, Clone, PartialEq)]
enum Operation {
    Select { columns: Vec<String> },
    Insert { assignments: Vec<(String, Value)> },
    Update { assignments: Vec<(String, Value)> },
    Delete,
}

impl Operation {
    fn kind(&self) -> StatementKind {
        match self {
            Operation::Select { .. } => StatementKind::Select,
            Operation::Insert { .. } => StatementKind::Insert,
            Operation::Update { .. } => StatementKind::Update,
            Operation::Delete => StatementKind::Delete,
        }
    }

    fn value_count(&self) -> usize {
        match self {
            Operation::Insert { assignments } | Operation::Update { assignments } => {
                assignments.len()
            }
            Operation::Select { .. } | Operation::Delete => 0,
        }
    }
}

/// How a condition joins the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connector {
    And,
    Or,
}

impl Connector {
    fn as_sql(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// A base condition plus the `AND`/`OR` conditions chained after it.
#[derive(Debug, Clone, PartialEq)]
struct WhereClause {
    base: Condition,
    rest: Vec<(Connector, Condition)>,
}

impl WhereClause {
    fn len(&self) -> usize {
        1 + self.rest.len()
    }
}

/// Chainable builder for one SELECT, INSERT, UPDATE or DELETE statement.
#[must_use]
pub struct Cursor<'db, C> {
    db: &'db Database<C>,
    operation: Option<Operation>,
    table: Option<String>,
    where_clause: Option<WhereClause>,
    order_by: Vec<String>,
    returning: Vec<String>,
}

impl<C> fmt::Debug for Cursor<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("operation", &self.operation)
            .field("table", &self.table)
            .field("where_clause", &self.where_clause)
            .field("order_by", &self.order_by)
            .field("returning", &self.returning)
            .finish_non_exhaustive()
    }
}

impl<'db, C: GenericClient> Cursor<'db, C> {
    pub(crate) fn new(db: &'db Database<C>) -> Self {
        Self {
            db,
            operation: None,
            table: None,
            where_clause: None,
            order_by: Vec::new(),
            returning: Vec::new(),
        }
    }

    /// The statement kind selected so far, if any.
    pub fn kind(&self) -> Option<StatementKind> {
        self.operation.as_ref().map(Operation::kind)
    }

    // ==================== Operations ====================

    /// Project `columns` (in the given order) in a SELECT.
    ///
    /// Columns are rendered as given; `"*"` is the wildcard. Calling `select`
    /// again appends more columns.
    pub fn select<I, S>(mut self, columns: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.begin(StatementKind::Select)?;
        if let Some(Operation::Select { columns: existing }) = &mut self.operation {
            existing.extend(columns.into_iter().map(Into::into));
        }
        Ok(self)
    }

    /// `SELECT *`.
    pub fn select_all(self) -> DbResult<Self> {
        self.select(["*"])
    }

    /// Insert one row from `(field, value)` pairs, in iteration order.
    ///
    /// A second `insert` on the same cursor appends more fields to the same row.
    pub fn insert<I, K, V>(mut self, fields: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.begin(StatementKind::Insert)?;
        if let Some(Operation::Insert { assignments }) = &mut self.operation {
            assignments.extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
        Ok(self)
    }

    /// Set `(field, value)` pairs, in iteration order. Requires a condition.
    pub fn update<I, K, V>(mut self, fields: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.begin(StatementKind::Update)?;
        if let Some(Operation::Update { assignments }) = &mut self.operation {
            assignments.extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
        Ok(self)
    }

    /// Delete rows. Requires a condition.
    pub fn delete(mut self) -> DbResult<Self> {
        self.begin(StatementKind::Delete)?;
        Ok(self)
    }

    /// Select the operation kind, once. Repeating the same kind is allowed.
    fn begin(&mut self, requested: StatementKind) -> DbResult<()> {
        match &self.operation {
            Some(op) if op.kind() == requested => Ok(()),
            Some(op) => Err(DbError::OperationAlreadySet {
                current: op.kind(),
                requested,
            }),
            None => {
                self.operation = Some(match requested {
                    StatementKind::Select => Operation::Select {
                        columns: Vec::new(),
                    },
                    StatementKind::Insert => Operation::Insert {
                        assignments: Vec::new(),
                    },
                    StatementKind::Update => Operation::Update {
                        assignments: Vec::new(),
                    },
                    StatementKind::Delete => Operation::Delete,
                });
                Ok(())
            }
        }
    }

    // ==================== Conditions ====================

    /// Set the base condition from one `(column, expression)` pair.
    ///
    /// Calling `where_` again replaces every earlier condition, together with
    /// its bound literal. Use [`Cursor::and`] / [`Cursor::or`] to combine.
    pub fn where_<I, K, V>(mut self, pair: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.where_clause = None;
        let base = condition::parse(pair, self.next_placeholder())?;
        self.where_clause = Some(WhereClause {
            base,
            rest: Vec::new(),
        });
        Ok(self)
    }

    /// Append `AND <condition>`. Fails if no base condition was set.
    pub fn and<I, K, V>(self, pair: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.chain(Connector::And, pair)
    }

    /// Append `OR <condition>`. Fails if no base condition was set.
    pub fn or<I, K, V>(self, pair: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.chain(Connector::Or, pair)
    }

    fn chain<I, K, V>(mut self, connector: Connector, pair: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let start = self.next_placeholder();
        let Some(clause) = self.where_clause.as_mut() else {
            return Err(DbError::malformed(format!(
                "`{}` needs a preceding `where_` condition",
                connector.as_sql().to_ascii_lowercase()
            )));
        };
        let cond = condition::parse(pair, start)?;
        clause.rest.push((connector, cond));
        Ok(self)
    }

    /// Index the next bound value will take.
    fn next_placeholder(&self) -> usize {
        let values = self.operation.as_ref().map_or(0, Operation::value_count);
        let conditions = self.where_clause.as_ref().map_or(0, WhereClause::len);
        values + conditions + 1
    }

    // ==================== Table, ordering, RETURNING ====================

    /// Set the target table. The last call wins.
    pub fn in_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Append `ORDER BY` keys from `(column, direction)` pairs.
    ///
    /// The direction is `ASC` or `DESC` in any case; empty means `ASC`.
    /// Repeated calls append.
    pub fn in_order<I, K, D>(mut self, keys: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: AsRef<str>,
    {
        for (column, direction) in keys {
            let direction = match direction.as_ref().trim().to_ascii_uppercase().as_str() {
                "" | "ASC" => "ASC",
                "DESC" => "DESC",
                _ => {
                    return Err(DbError::validation(format!(
                        "invalid sort direction {:?}; expected ASC or DESC",
                        direction.as_ref()
                    )));
                }
            };
            self.order_by.push(format!("{} {}", column.into(), direction));
        }
        Ok(self)
    }

    /// Add a `RETURNING` list to an INSERT, UPDATE or DELETE.
    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning.extend(columns.into_iter().map(Into::into));
        self
    }

    // ==================== Render & execute ====================

    /// Render the statement, consuming the cursor.
    pub fn build(self) -> DbResult<Statement> {
        self.render()
    }

    /// Render the SQL text without consuming the cursor (for debugging).
    pub fn to_sql(&self) -> DbResult<String> {
        self.render().map(|statement| statement.sql)
    }

    /// Render and execute the statement.
    ///
    /// Returns `Some(rows)` for a SELECT or a statement with `RETURNING`, and
    /// `None` for a plain INSERT, UPDATE or DELETE. Builder errors are
    /// returned before anything is sent; driver errors are passed through
    /// unchanged.
    pub async fn execute(self) -> DbResult<Option<Vec<C::Row>>> {
        let db = self.db;
        let statement = self.build()?;
        db.dispatch(&statement).await
    }

    /// Render and execute, delivering the outcome to `on_complete`.
    ///
    /// The returned `Result` only carries builder errors, which are detected
    /// before dispatch. Driver errors reach `on_complete` and nowhere else.
    /// A statement that produces rows needs a handler and fails with
    /// [`DbError::MissingCallback`] without one; a write without a handler
    /// still runs, and a driver error is logged.
    pub async fn execute_with<F>(self, on_complete: Option<F>) -> DbResult<()>
    where
        F: FnOnce(DbResult<Option<Vec<C::Row>>>),
    {
        let db = self.db;
        let statement = self.build()?;

        match on_complete {
            Some(on_complete) => {
                on_complete(db.dispatch(&statement).await);
            }
            None if statement.returns_rows() => {
                return Err(DbError::MissingCallback(statement.kind));
            }
            None => {
                if let Err(err) = db.dispatch(&statement).await {
                    tracing::error!(
                        target: crate::logging::SQL_TARGET,
                        kind = statement.kind.as_str(),
                        error = %err,
                        "statement failed with no completion handler"
                    );
                }
            }
        }
        Ok(())
    }
}
