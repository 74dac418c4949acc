//! Flat helpers that report failure as `false` / `None`.
//!
//! Each one wraps the typed call of the same name; the error itself has
//! already been logged by the time the sentinel comes back. Use the
//! [`Engine`] methods when the caller needs to inspect the error.

use crate::params::ParameterSet;
use crate::pool::Engine;
use crate::provision::{ProvisionDialect, ReadOnlyUser, provision_read_only_user};
use crate::results::QueryOutcome;

/// Run raw DDL/DCL in a transaction. `true` means committed.
pub async fn execute_command(sql: &str, engine: &Engine) -> bool {
    engine.execute_command(sql).await.is_ok()
}

/// Run one statement. `None` means it failed and nothing was committed.
///
/// ```rust,no_run
/// use db_tools::prelude::*;
///
/// # async fn demo(engine: &Engine) {
/// match run_sql("UPDATE items SET quantity = 0", engine, ()).await {
///     Some(QueryOutcome::RowCount(n)) => println!("{n} rows zeroed"),
///     Some(QueryOutcome::Rows(rows)) => println!("{} rows", rows.len()),
///     None => eprintln!("update failed"),
/// }
/// # }
/// ```
pub async fn run_sql(
    sql: &str,
    engine: &Engine,
    params: impl Into<ParameterSet>,
) -> Option<QueryOutcome> {
    engine.run_query(sql, params).await.ok()
}

/// Create a login that may only read `database`. `true` means all three steps succeeded.
///
/// The dialect follows the engine: Postgres statements for a Postgres engine,
/// MySQL-style statements otherwise.
pub async fn create_read_only_user(
    username: &str,
    password: &str,
    database: &str,
    engine: &Engine,
) -> bool {
    let user = ReadOnlyUser::new(username, password, database);
    let dialect = ProvisionDialect::from(engine.db_type());
    provision_read_only_user(engine, &user, dialect).await.is_ok()
}
