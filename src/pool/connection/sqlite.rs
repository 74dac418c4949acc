use std::time::Duration;

use bb8::ManageConnection;

use super::EngineConnection;
use crate::error::DbToolsError;
use crate::sqlite::SqliteManager;
use crate::sqlite::manager::run_blocking;

pub(super) async fn get_connection(
    pool: &bb8::Pool<SqliteManager>,
) -> Result<EngineConnection, DbToolsError> {
    let conn = pool.get_owned().await?;
    Ok(EngineConnection::Sqlite(conn))
}

/// Build the `SQLite` pool, opening one connection first so a bad path fails here.
///
/// File databases are switched to WAL so readers do not block the writer.
/// An in-memory database lives only as long as its connection, so memory pools
/// hold exactly one connection, open it eagerly and never expire it.
pub(in crate::pool) async fn build_pool(
    db_path: String,
    max_connections: u32,
    connection_timeout: Duration,
) -> Result<bb8::Pool<SqliteManager>, DbToolsError> {
    let manager = SqliteManager::new(db_path);

    // bb8 retries failed connects until the checkout timeout; surface the open error directly.
    if !manager.is_memory() {
        let conn = manager.connect().await?;
        run_blocking(conn, |guard| {
            guard
                .execute_batch("PRAGMA journal_mode = WAL;")
                .map_err(DbToolsError::SqliteError)
        })
        .await?;
    }

    let builder = bb8::Pool::builder().connection_timeout(connection_timeout);
    let builder = if manager.is_memory() {
        builder
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        builder.max_size(max_connections.max(1))
    };
    builder.build(manager).await
}
