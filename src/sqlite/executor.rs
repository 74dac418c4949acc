use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Transaction, params_from_iter};

use super::manager::{SharedSqliteConnection, run_blocking};
use super::params::Params;
use super::query::build_result_set;
use crate::error::DbToolsError;
use crate::results::QueryOutcome;
use crate::types::RowValues;

/// Execute raw SQL (no parameter binding) in its own transaction.
///
/// # Errors
/// Returns `DbToolsError` if the transaction cannot be opened, the SQL fails
/// (after which the transaction is rolled back), or the commit fails.
pub async fn execute_command(
    conn: &SharedSqliteConnection,
    sql: &str,
) -> Result<(), DbToolsError> {
    let sql_owned = sql.to_owned();
    run_blocking(Arc::clone(conn), move |guard| {
        let tx = guard.transaction()?;
        let result = tx.execute_batch(&sql_owned).map_err(DbToolsError::from);
        finish(tx, result)
    })
    .await
}

/// Execute one positional-parameter statement in its own transaction.
///
/// Statements that report result columns are read to completion and returned
/// as rows; all others return the affected-row count.
///
/// # Errors
/// Returns `DbToolsError` if preparing, binding or executing fails (the
/// transaction is rolled back first), or if the commit fails.
pub async fn run_query(
    conn: &SharedSqliteConnection,
    sql: &str,
    params: &[RowValues],
) -> Result<QueryOutcome, DbToolsError> {
    let sql_owned = sql.to_owned();
    let values = Params::convert(params).0;
    run_blocking(Arc::clone(conn), move |guard| {
        let tx = guard.transaction()?;
        let result = execute_in_tx(&tx, &sql_owned, &values);
        finish(tx, result)
    })
    .await
}

fn execute_in_tx(
    tx: &Transaction<'_>,
    sql: &str,
    values: &[Value],
) -> Result<QueryOutcome, DbToolsError> {
    let mut stmt = tx.prepare(sql)?;
    if stmt.column_count() > 0 {
        build_result_set(&mut stmt, values).map(QueryOutcome::Rows)
    } else {
        let affected = stmt.execute(params_from_iter(values.iter()))?;
        Ok(QueryOutcome::RowCount(affected))
    }
}

/// Commit on success; roll back on failure and hand back the original error.
fn finish<T>(tx: Transaction<'_>, result: Result<T, DbToolsError>) -> Result<T, DbToolsError> {
    match result {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(error = %rollback_err, "sqlite rollback failed");
            }
            Err(err)
        }
    }
}
