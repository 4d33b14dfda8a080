//! Rendering a cursor into SQL text and its argument list.
//!
//! Placeholders are numbered here, not when chain methods run: INSERT values
//! and UPDATE assignments take `$1..$n`, conditions continue from `$n+1` in
//! chain order, and `args` is filled in exactly that order.

use super::{Cursor, Operation, StatementKind, WhereClause};
use crate::error::{DbError, DbResult};
use crate::value::Value;
use std::fmt;

/// A rendered statement: SQL text plus the values for `$1..$n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub sql: String,
    pub args: Vec<Value>,
    returning: bool,
}

impl Statement {
    /// Whether executing this statement yields a result set.
    pub fn returns_rows(&self) -> bool {
        self.kind == StatementKind::Select || self.returning
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl<C> Cursor<'_, C> {
    pub(super) fn render(&self) -> DbResult<Statement> {
        let operation = self.operation.as_ref().ok_or_else(|| {
            DbError::validation("no operation selected; call select, insert, update or delete")
        })?;
        let kind = operation.kind();
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| DbError::validation(format!("{kind} has no table; call in_table")))?;

        if !self.order_by.is_empty() && kind != StatementKind::Select {
            return Err(DbError::validation(format!(
                "ORDER BY is only valid for SELECT, not {kind}"
            )));
        }
        if !self.returning.is_empty() && kind == StatementKind::Select {
            return Err(DbError::validation("RETURNING is not valid for SELECT"));
        }

        let mut args = Vec::new();
        let mut sql = match operation {
            Operation::Select { columns } => {
                format!("SELECT {} FROM {}", columns.join(", "), table)
            }
            Operation::Insert { assignments } => {
                if assignments.is_empty() {
                    return Err(DbError::validation("INSERT requires at least one field"));
                }
                if self.where_clause.is_some() {
                    return Err(DbError::validation("INSERT does not take a WHERE condition"));
                }
                let fields = assignments
                    .iter()
                    .map(|(field, _)| field.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let placeholders = (1..=assignments.len())
                    .map(|i| format!("${i}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                args.extend(assignments.iter().map(|(_, value)| value.clone()));
                format!("INSERT INTO {table}({fields}) VALUES ({placeholders})")
            }
            Operation::Update { assignments } => {
                if self.where_clause.is_none() {
                    return Err(DbError::MissingCondition(kind));
                }
                if assignments.is_empty() {
                    return Err(DbError::validation("UPDATE requires at least one field to SET"));
                }
                let set = assignments
                    .iter()
                    .enumerate()
                    .map(|(i, (field, _))| format!("{field} = ${}", i + 1))
                    .collect::<Vec<_>>()
                    .join(", ");
                args.extend(assignments.iter().map(|(_, value)| value.clone()));
                format!("UPDATE {table} SET {set}")
            }
            Operation::Delete => {
                if self.where_clause.is_none() {
                    return Err(DbError::MissingCondition(kind));
                }
                format!("DELETE FROM {table}")
            }
        };

        if let Some(clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            render_where(clause, &mut sql, &mut args);
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        if !self.returning.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning.join(", "));
        }

        Ok(Statement {
            kind,
            sql,
            args,
            returning: !self.returning.is_empty(),
        })
    }
}

fn render_where(clause: &WhereClause, sql: &mut String, args: &mut Vec<Value>) {
    let base = clause.base.clone().with_placeholder(args.len() + 1);
    sql.push_str(&base.fragment());
    args.push(Value::Text(base.value));

    for (connector, cond) in &clause.rest {
        let cond = cond.clone().with_placeholder(args.len() + 1);
        sql.push(' ');
        sql.push_str(connector.as_sql());
        sql.push(' ');
        sql.push_str(&cond.fragment());
        args.push(Value::Text(cond.value));
    }
}
