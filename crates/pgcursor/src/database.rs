//! The database handle that cursors are created from.

use crate::client::GenericClient;
use crate::config::DatabaseConfig;
use crate::cursor::{Cursor, Statement};
use crate::error::DbResult;
use crate::logging::{LogConfig, POOL_TARGET};
use crate::pool::create_pool_with_config;
use crate::value::Value;
use deadpool_postgres::Pool;

/// A handle on one pool collaborator.
///
/// `Database` is cheap to share by reference: every [`Database::sql`] call
/// borrows it for one statement, and the client is expected to serve many
/// concurrent statements.
pub struct Database<C = Pool> {
    client: C,
    log: LogConfig,
}

impl<C> std::fmt::Debug for Database<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl Database<Pool> {
    /// Create the pool described by `config` and run its `init_sql`, if any.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = DatabaseConfig::from_env()?;
    /// let db = Database::connect(&config).await?;
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        config.validate()?;
        let pool = create_pool_with_config(&config.url, config.max_size)?;
        tracing::info!(target: POOL_TARGET, max_size = config.max_size, "created pool");

        let db = Database::new(pool).with_log_config(config.log.clone());
        if let Some(init_sql) = config.init_sql.as_deref() {
            db.run_init_sql(init_sql).await?;
        }
        tracing::info!(target: POOL_TARGET, "database ready");
        Ok(db)
    }

    async fn run_init_sql(&self, init_sql: &str) -> DbResult<()> {
        let outcome = async {
            let conn = self.client.get().await?;
            conn.batch_execute(init_sql).await?;
            DbResult::Ok(())
        }
        .await;

        match &outcome {
            Ok(()) => tracing::info!(target: POOL_TARGET, "database initialization succeeded"),
            Err(err) => {
                tracing::error!(target: POOL_TARGET, error = %err, "database initialization failed")
            }
        }
        outcome
    }
}

impl<C: GenericClient> Database<C> {
    /// Wrap an existing client.
    pub fn new(client: C) -> Self {
        Self {
            client,
            log: LogConfig::default(),
        }
    }

    /// Replace the statement logging settings.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Start building a statement.
    pub fn sql(&self) -> Cursor<'_, C> {
        Cursor::new(self)
    }

    /// Run hand-written SQL with `$1..$n` placeholders.
    pub async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Vec<C::Row>> {
        self.log.statement("RAW", sql, args.len());
        self.client.query(sql, args).await
    }

    pub(crate) async fn dispatch(&self, statement: &Statement) -> DbResult<Option<Vec<C::Row>>> {
        self.log
            .statement(statement.kind.as_str(), &statement.sql, statement.args.len());
        let rows = self.client.query(&statement.sql, &statement.args).await?;
        Ok(statement.returns_rows().then_some(rows))
    }

    /// Close the client's connections.
    pub fn close(&self) {
        self.client.close();
        tracing::info!(target: POOL_TARGET, "closed pool");
    }
}
