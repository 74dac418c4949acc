use tokio_postgres::{Client, Transaction};

use super::params::Params;
use super::query::build_result_set;
use crate::error::DbToolsError;
use crate::results::QueryOutcome;
use crate::types::RowValues;

/// Execute raw SQL over the simple-query protocol in its own transaction.
///
/// # Errors
/// Returns `DbToolsError` if the transaction cannot be opened, the SQL fails
/// (after which the transaction is rolled back), or the commit fails.
pub async fn execute_command(client: &mut Client, sql: &str) -> Result<(), DbToolsError> {
    let tx = client.transaction().await?;
    let result = tx.batch_execute(sql).await.map_err(DbToolsError::from);
    finish(tx, result).await
}

/// Execute one `$N`-parameter statement in its own transaction.
///
/// The statement is prepared first; if the server reports result columns the
/// rows are returned, otherwise the affected-row count.
///
/// # Errors
/// Returns `DbToolsError` if preparing, binding or executing fails (the
/// transaction is rolled back first), or if the commit fails.
pub async fn run_query(
    client: &mut Client,
    sql: &str,
    params: &[RowValues],
) -> Result<QueryOutcome, DbToolsError> {
    let tx = client.transaction().await?;
    let result = execute_in_tx(&tx, sql, params).await;
    finish(tx, result).await
}

async fn execute_in_tx(
    tx: &Transaction<'_>,
    sql: &str,
    params: &[RowValues],
) -> Result<QueryOutcome, DbToolsError> {
    let stmt = tx.prepare(sql).await?;
    let converted = Params::convert(params);
    if stmt.columns().is_empty() {
        let affected = tx.execute(&stmt, converted.as_refs()).await?;
        let affected = usize::try_from(affected).map_err(|e| {
            DbToolsError::ExecutionError(format!("postgres affected rows conversion error: {e}"))
        })?;
        Ok(QueryOutcome::RowCount(affected))
    } else {
        let rows = tx.query(&stmt, converted.as_refs()).await?;
        build_result_set(&stmt, &rows).map(QueryOutcome::Rows)
    }
}

async fn finish<T>(tx: Transaction<'_>, result: Result<T, DbToolsError>) -> Result<T, DbToolsError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "postgres rollback failed");
            }
            Err(err)
        }
    }
}
