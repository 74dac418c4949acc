#[cfg(feature = "postgres")]
use crate::postgres::PgManager;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteManager;

use crate::types::DatabaseType;

/// Connection pool behind an [`Engine`](super::Engine).
#[derive(Clone)]
pub enum EnginePool {
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(bb8::Pool<SqliteManager>),
    /// `PostgreSQL` connection pool
    #[cfg(feature = "postgres")]
    Postgres(bb8::Pool<PgManager>),
}

// Manual Debug so the postgres manager never prints its password
impl std::fmt::Debug for EnginePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f
                .debug_struct("Sqlite")
                .field("state", &pool.state())
                .finish(),
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => f
                .debug_struct("Postgres")
                .field("state", &pool.state())
                .finish(),
        }
    }
}

impl EnginePool {
    #[must_use]
    pub fn db_type(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => DatabaseType::Sqlite,
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => DatabaseType::Postgres,
        }
    }

    /// Connections currently open and how many of them are idle.
    #[must_use]
    pub fn state(&self) -> bb8::State {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => pool.state(),
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => pool.state(),
        }
    }
}
