use std::time::Duration;

use super::EngineConnection;
use crate::error::DbToolsError;
use crate::postgres::PgManager;
use crate::postgres::manager::ensure_plaintext;

pub(super) async fn get_connection(
    pool: &bb8::Pool<PgManager>,
) -> Result<EngineConnection, DbToolsError> {
    let client = pool.get_owned().await?;
    Ok(EngineConnection::Postgres(client))
}

/// Build the Postgres pool without connecting; the first call opens a connection.
pub(in crate::pool) fn build_pool(
    config: tokio_postgres::Config,
    max_connections: u32,
    connection_timeout: Duration,
) -> Result<bb8::Pool<PgManager>, DbToolsError> {
    if config.get_hosts().is_empty() {
        return Err(DbToolsError::ConfigError(
            "postgres config has no host".to_string(),
        ));
    }
    ensure_plaintext(&config)?;
    let manager = PgManager::new(config);
    Ok(bb8::Pool::builder()
        .max_size(max_connections.max(1))
        .connection_timeout(connection_timeout)
        .build_unchecked(manager))
}

#[cfg(test)]
mod tests {
    use tokio_postgres::config::SslMode;

    use super::*;

    #[test]
    fn refuses_config_that_requires_tls() {
        let mut config = tokio_postgres::Config::new();
        config.host("localhost").ssl_mode(SslMode::Require);
        let err = build_pool(config, 2, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, DbToolsError::ConfigError(_)));
    }
}
