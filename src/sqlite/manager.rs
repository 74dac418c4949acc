use std::future::Future;
use std::sync::Arc;

use bb8::ManageConnection;
use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::error::DbToolsError;

/// A `SQLite` connection that can be handed to a blocking worker thread.
pub type SharedSqliteConnection = Arc<Mutex<Connection>>;

/// Path that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// bb8 manager for `SQLite` connections.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    db_path: String,
}

impl SqliteManager {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    #[must_use]
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// In-memory databases live and die with their connection.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.db_path == MEMORY_PATH || self.db_path.starts_with("file::memory:")
    }
}

impl ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = DbToolsError;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let path = self.db_path.clone();
        async move {
            let conn = tokio::task::spawn_blocking(move || {
                Connection::open(&path).map_err(DbToolsError::SqliteError)
            })
            .await
            .map_err(|e| {
                DbToolsError::ConnectionError(format!("sqlite open join error: {e}"))
            })??;
            Ok(Arc::new(Mutex::new(conn)))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let handle = Arc::clone(conn);
        async move {
            run_blocking(handle, |guard| {
                guard
                    .query_row("SELECT 1", [], |_| Ok(()))
                    .map_err(DbToolsError::SqliteError)
            })
            .await
        }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// Run synchronous `rusqlite` work on the blocking pool.
pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, DbToolsError>
where
    F: FnOnce(&mut Connection) -> Result<R, DbToolsError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| DbToolsError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}
