pub mod connection;
pub mod options;
pub mod types;

use std::sync::Arc;

pub use connection::EngineConnection;
pub use options::{ConnectionTarget, EngineOptions, EngineOptionsBuilder};
pub use types::EnginePool;

use crate::error::DbToolsError;
use crate::translation::PlaceholderStyle;
use crate::types::DatabaseType;

/// A configured database: its connection pool plus the settings every call shares.
///
/// Cloning is cheap; clones share the same pool.
///
/// ```rust,no_run
/// use db_tools::prelude::*;
///
/// # async fn demo() -> Result<(), DbToolsError> {
/// let engine = Engine::from_url("sqlite::memory:").await?;
/// engine.execute_command("CREATE TABLE t (id INTEGER PRIMARY KEY)").await?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct Engine {
    pool: EnginePool,
    db_type: DatabaseType,
    label: Arc<str>,
    statement_log_limit: usize,
}

impl Engine {
    /// Build an engine from options.
    ///
    /// `SQLite` engines open one connection immediately so an unusable path
    /// fails here. Postgres engines connect on first use.
    ///
    /// # Errors
    /// Returns `DbToolsError` if the options are invalid or the `SQLite` file cannot be opened.
    pub async fn new(options: EngineOptions) -> Result<Self, DbToolsError> {
        let label: Arc<str> = Arc::from(options.resolved_label());
        let db_type = options.target.db_type();
        let EngineOptions {
            target,
            max_connections,
            connection_timeout,
            statement_log_limit,
            ..
        } = options;

        let pool = match target {
            #[cfg(feature = "sqlite")]
            ConnectionTarget::Sqlite { db_path } => EnginePool::Sqlite(
                connection::sqlite::build_pool(db_path, max_connections, connection_timeout)
                    .await?,
            ),
            #[cfg(feature = "postgres")]
            ConnectionTarget::Postgres(config) => EnginePool::Postgres(
                connection::postgres::build_pool(config, max_connections, connection_timeout)?,
            ),
        };

        tracing::debug!(label = %label, db_type = ?db_type, "engine ready");
        Ok(Self {
            pool,
            db_type,
            label,
            statement_log_limit,
        })
    }

    /// Build an engine from a database URL; see [`EngineOptions::from_url`].
    ///
    /// # Errors
    /// Returns `DbToolsError::ConfigError` for a malformed URL, or any error from [`Engine::new`].
    pub async fn from_url(url: &str) -> Result<Self, DbToolsError> {
        Self::new(EngineOptions::from_url(url)?).await
    }

    /// Start a builder for a `SQLite` engine.
    #[cfg(feature = "sqlite")]
    #[must_use]
    pub fn sqlite_builder(db_path: impl Into<String>) -> EngineOptionsBuilder {
        EngineOptionsBuilder::new(ConnectionTarget::Sqlite {
            db_path: db_path.into(),
        })
    }

    /// Start a builder for a Postgres engine.
    #[cfg(feature = "postgres")]
    #[must_use]
    pub fn postgres_builder(config: tokio_postgres::Config) -> EngineOptionsBuilder {
        EngineOptionsBuilder::new(ConnectionTarget::Postgres(config))
    }

    /// Check a connection out of the pool for several calls in a row.
    ///
    /// # Errors
    /// Returns `DbToolsError` if no connection becomes available in time.
    pub async fn connect(&self) -> Result<EngineConnection, DbToolsError> {
        self.pool.get_connection().await
    }

    #[must_use]
    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn pool(&self) -> &EnginePool {
        &self.pool
    }

    #[must_use]
    pub fn statement_log_limit(&self) -> usize {
        self.statement_log_limit
    }

    #[must_use]
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self.db_type {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => PlaceholderStyle::Sqlite,
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => PlaceholderStyle::Postgres,
        }
    }
}
