//! The pool collaborator seam.
//!
//! The statement builder needs exactly one capability from the database side:
//! run a parameterized statement and hand back its rows. [`GenericClient`] is
//! that capability. It is implemented for `tokio_postgres::Client`, for a
//! `deadpool_postgres::Pool` (one checkout per statement) and for a checked-out
//! `deadpool_postgres::Object`.

use crate::error::{DbError, DbResult};
use crate::value::Value;
use deadpool_postgres::{Object, Pool};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A client that can execute one parameterized statement.
///
/// Implementations are expected to be safe to share between many in-flight
/// cursors; queueing of physical connections, timeouts and retries belong to
/// the implementation, not to the builder.
pub trait GenericClient: Send + Sync {
    /// The row type produced by this client.
    type Row: Send;

    /// Execute `sql` with `args` bound to `$1..$n` and return all rows.
    ///
    /// Statements without a result set return an empty vector.
    fn query(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = DbResult<Vec<Self::Row>>> + Send;

    /// Release the underlying connections. The default does nothing.
    fn close(&self) {}
}

fn param_refs(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl GenericClient for tokio_postgres::Client {
    type Row = Row;

    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Vec<Row>> {
        let params = param_refs(args);
        tokio_postgres::Client::query(self, sql, &params)
            .await
            .map_err(DbError::from)
    }
}

impl GenericClient for Object {
    type Row = Row;

    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Vec<Row>> {
        let params = param_refs(args);
        tokio_postgres::Client::query(self, sql, &params)
            .await
            .map_err(DbError::from)
    }
}

impl GenericClient for Pool {
    type Row = Row;

    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Vec<Row>> {
        let client = self.get().await?;
        GenericClient::query(&client, sql, args).await
    }

    fn close(&self) {
        Pool::close(self);
    }
}
