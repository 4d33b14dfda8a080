//! `tracing` output for dispatched SQL.
//!
//! Every statement sent to the pool collaborator is logged **before** it is
//! dispatched, under the `pgcursor.sql` target. Pool lifecycle events use
//! `pgcursor.pool`.

use serde::{Deserialize, Deserializer};
use tracing::Level;

/// Target for per-statement events.
pub const SQL_TARGET: &str = "pgcursor.sql";
/// Target for pool lifecycle events.
pub const POOL_TARGET: &str = "pgcursor.pool";

/// Statement logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether statements are logged at all.
    pub enabled: bool,
    /// Tracing event level to emit at.
    #[serde(deserialize_with = "deserialize_level")]
    pub level: Level,
    /// Truncate long SQL strings (in bytes, at a char boundary). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl LogConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Turn statement logging off.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    /// Emit one event for a statement about to be dispatched.
    pub(crate) fn statement(&self, kind: &str, sql: &str, param_count: usize) {
        if !self.enabled {
            return;
        }

        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: SQL_TARGET,
            kind,
            param_count,
            sql = %sql,
            "dispatching statement"
        );
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<Level>().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
        // 'é' is two bytes; cutting inside it backs off to the boundary
        assert_eq!(truncate_sql_bytes("né", 2), "n");
    }

    #[test]
    fn truncate_sql_appends_ellipsis_only_when_cut() {
        let log = LogConfig::new().max_sql_length(6);
        assert_eq!(log.truncate_sql("SELECT a FROM t"), "SELECT...");
        assert_eq!(log.truncate_sql("DELETE"), "DELETE");
        assert_eq!(LogConfig::new().no_truncate().truncate_sql("SELECT a FROM t"), "SELECT a FROM t");
    }

    #[test]
    fn level_deserializes_from_name() {
        let log: LogConfig = toml::from_str("level = \"info\"\nmax_sql_length = 50").unwrap();
        assert_eq!(log.level, Level::INFO);
        assert_eq!(log.max_sql_length, Some(50));
        assert!(log.enabled);

        assert!(toml::from_str::<LogConfig>("level = \"loud\"").is_err());
    }
}
