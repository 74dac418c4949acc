#[cfg(feature = "postgres")]
pub(super) mod postgres;
#[cfg(feature = "sqlite")]
pub(super) mod sqlite;

use bb8::PooledConnection;

#[cfg(feature = "postgres")]
use crate::postgres::PgManager;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteManager;

use super::types::EnginePool;
use crate::error::DbToolsError;
use crate::results::QueryOutcome;
use crate::types::{DatabaseType, RowValues};

/// A connection checked out of an [`EnginePool`]; returned to the pool on drop.
pub enum EngineConnection {
    #[cfg(feature = "sqlite")]
    Sqlite(PooledConnection<'static, SqliteManager>),
    #[cfg(feature = "postgres")]
    Postgres(PooledConnection<'static, PgManager>),
}

impl std::fmt::Debug for EngineConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => f.debug_tuple("Sqlite").field(&"<Connection>").finish(),
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => f.debug_tuple("Postgres").field(&"<Client>").finish(),
        }
    }
}

impl EnginePool {
    /// Check a connection out of the pool.
    ///
    /// # Errors
    /// Returns `DbToolsError` if the pool times out or cannot open a new connection.
    pub async fn get_connection(&self) -> Result<EngineConnection, DbToolsError> {
        match self {
            #[cfg(feature = "sqlite")]
            EnginePool::Sqlite(pool) => sqlite::get_connection(pool).await,
            #[cfg(feature = "postgres")]
            EnginePool::Postgres(pool) => postgres::get_connection(pool).await,
        }
    }
}

impl EngineConnection {
    #[must_use]
    pub fn db_type(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => DatabaseType::Sqlite,
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => DatabaseType::Postgres,
        }
    }

    /// Run raw SQL in a transaction on this connection.
    ///
    /// # Errors
    /// Returns the backend error; the transaction has been rolled back.
    pub async fn execute_command(&mut self, sql: &str) -> Result<(), DbToolsError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => crate::sqlite::execute_command(conn, sql).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(client) => crate::postgres::execute_command(client, sql).await,
        }
    }

    /// Run one statement with positional values already in backend order.
    ///
    /// # Errors
    /// Returns the backend error; the transaction has been rolled back.
    pub async fn run_query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<QueryOutcome, DbToolsError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => crate::sqlite::run_query(conn, sql, params).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(client) => crate::postgres::run_query(client, sql, params).await,
        }
    }
}
