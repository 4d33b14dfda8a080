//! Condition parser for the operator-prefix mini-language.
//!
//! A condition is written as a single `{column: expression}` pair, where the
//! expression carries its comparison operator as a prefix:
//!
//! ```ignore
//! use pgcursor::condition::parse;
//!
//! let cond = parse([("age", ">=18")], 1)?;
//! assert_eq!(cond.fragment(), "age >= $1");
//! assert_eq!(cond.value, "18");
//!
//! // Wildcards without a prefix select LIKE: `*` -> `%`, `?` -> `_`
//! let cond = parse([("name", "Jo*")], 3)?;
//! assert_eq!(cond.fragment(), "name LIKE $3");
//! assert_eq!(cond.value, "Jo%");
//! ```
//!
//! Literals never reach the SQL text: only the column and a placeholder are
//! rendered, and the literal is returned for binding.

use crate::error::{DbError, DbResult};
use std::fmt;

/// Comparison operator of a parsed condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `=`
    Eq,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `<>` (also written `!=`)
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `LIKE`, selected by `*` / `?` wildcards
    Like,
}

impl Op {
    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ge => ">=",
            Op::Le => "<=",
            Op::Ne => "<>",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Like => "LIKE",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

// Two-character prefixes come first so `>=` is never read as `>`.
const PREFIXES: &[(&str, Op)] = &[
    (">=", Op::Ge),
    ("<=", Op::Le),
    ("<>", Op::Ne),
    ("!=", Op::Ne),
    ("=", Op::Eq),
    (">", Op::Gt),
    ("<", Op::Lt),
];

/// One parsed comparison: `<column> <op> $<placeholder>` plus its literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub op: Op,
    pub column: String,
    /// 1-based placeholder index.
    pub placeholder: usize,
    /// Literal bound at `placeholder`, with the operator prefix stripped.
    pub value: String,
}

impl Condition {
    /// Render the comparison fragment.
    pub fn fragment(&self) -> String {
        self.to_string()
    }

    /// The same condition bound at another placeholder index.
    pub fn with_placeholder(mut self, placeholder: usize) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ${}", self.column, self.op, self.placeholder)
    }
}

/// Split an operator expression into its operator and literal.
///
/// Returns `None` when the expression has no known prefix and no wildcard.
pub fn parse_expression(expression: &str) -> Option<(Op, String)> {
    for (prefix, op) in PREFIXES {
        if let Some(literal) = expression.strip_prefix(prefix) {
            return Some((*op, literal.to_string()));
        }
    }

    if expression.contains(['*', '?']) {
        let pattern = expression.replace('*', "%").replace('?', "_");
        return Some((Op::Like, pattern));
    }

    None
}

/// Parse exactly one `(column, expression)` pair into a [`Condition`] bound at
/// `start_index`.
///
/// `pair` may be any collection of pairs (`[("id", "=5")]`, a map, a vec) but
/// must hold exactly one entry.
pub fn parse<I, K, V>(pair: I, start_index: usize) -> DbResult<Condition>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    if start_index == 0 {
        return Err(DbError::validation("placeholder indices start at 1"));
    }

    let mut entries = pair.into_iter();
    let (column, expression) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        (None, _) => {
            return Err(DbError::malformed("must be exactly one condition, got none"));
        }
        (Some(_), Some(_)) => {
            let count = 2 + entries.count();
            return Err(DbError::malformed(format!(
                "must be exactly one condition, got {count}"
            )));
        }
    };

    let column = column.into();
    let expression = expression.as_ref();
    let (op, value) =
        parse_expression(expression).ok_or_else(|| DbError::UnrecognizedOperator {
            column: column.clone(),
            expression: expression.to_string(),
        })?;

    Ok(Condition {
        op,
        column,
        placeholder: start_index,
        value,
    })
}
