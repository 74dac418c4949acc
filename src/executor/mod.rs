mod dispatch;

use async_trait::async_trait;

use crate::error::DbToolsError;
use crate::params::ParameterSet;
use crate::results::QueryOutcome;

/// Runs raw DDL/DCL text with no parameter binding.
///
/// Each call is its own transaction: committed on success, rolled back on
/// failure. A text holding several `;`-separated statements is all-or-nothing
/// on backends with transactional DDL.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// # Errors
    /// Returns the database error that aborted the command.
    async fn execute_command(&self, sql: &str) -> Result<(), DbToolsError>;
}

/// Runs one parameterized statement and reports what it produced.
///
/// Row-producing statements yield [`QueryOutcome::Rows`] in the order the
/// database returned them; all others yield [`QueryOutcome::RowCount`].
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// # Errors
    /// Returns `DbToolsError::ParameterError` for an unbound placeholder, or the
    /// database error that aborted the statement.
    async fn run_query(&self, sql: &str, params: ParameterSet)
    -> Result<QueryOutcome, DbToolsError>;
}

#[async_trait]
impl<T: CommandExecutor + ?Sized> CommandExecutor for std::sync::Arc<T> {
    async fn execute_command(&self, sql: &str) -> Result<(), DbToolsError> {
        (**self).execute_command(sql).await
    }
}

#[async_trait]
impl<T: QueryRunner + ?Sized> QueryRunner for std::sync::Arc<T> {
    async fn run_query(
        &self,
        sql: &str,
        params: ParameterSet,
    ) -> Result<QueryOutcome, DbToolsError> {
        (**self).run_query(sql, params).await
    }
}
