//! Small async helpers for running SQL against a pooled `SQLite` or Postgres database.
//!
//! - [`Engine`]: a configured connection pool for one database
//! - [`CommandExecutor`]: raw DDL/DCL in a transaction
//! - [`QueryRunner`]: one parameterized statement, returning rows or an affected-row count
//! - [`provision_read_only_user`]: create a login that can only read one database
//!
//! Every call checks out its own connection and runs in its own transaction.
//! The [`tools`] module offers the same operations with `bool` / `Option`
//! results for callers that only care whether the call worked.
//!
//! ```rust,no_run
//! use db_tools::prelude::*;
//!
//! # async fn demo() -> Result<(), DbToolsError> {
//! let engine = Engine::sqlite_builder("app.db").max_connections(4).build().await?;
//! engine
//!     .execute_command("CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, email TEXT)")
//!     .await?;
//! engine
//!     .run_query("INSERT INTO users (email) VALUES (:email)", [("email", "a@example.com")])
//!     .await?;
//! let users = engine.run_query("SELECT id, email FROM users ORDER BY id", ()).await?;
//! println!("{}", users.rows().map(ResultSet::to_json).unwrap_or_default());
//! # Ok(()) }
//! ```

pub mod error;
pub mod executor;
pub mod logging;
pub mod params;
pub mod pool;
pub mod prelude;
pub mod provision;
pub mod results;
pub mod tools;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use error::{DbToolsError, ErrorKind};
pub use executor::{CommandExecutor, QueryRunner};
pub use params::ParameterSet;
pub use pool::{ConnectionTarget, Engine, EngineConnection, EngineOptions, EngineOptionsBuilder};
pub use provision::{
    ProvisionDialect, ProvisionError, ProvisionStep, ReadOnlyUser, drop_read_only_user,
    provision_read_only_user,
};
pub use results::{CustomDbRow, QueryOutcome, ResultSet};
pub use translation::{BoundStatement, PlaceholderStyle, bind_parameters};
pub use types::{DatabaseType, RowValues};
