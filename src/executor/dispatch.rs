use async_trait::async_trait;

use super::{CommandExecutor, QueryRunner};
use crate::error::DbToolsError;
use crate::logging::{error_text, statement_excerpt};
use crate::params::ParameterSet;
use crate::pool::Engine;
use crate::results::QueryOutcome;
use crate::translation::bind_parameters;

impl Engine {
    /// Run raw SQL in its own transaction on a pooled connection.
    ///
    /// Commits on success; on failure the transaction is rolled back and no
    /// part of the text takes effect.
    ///
    /// # Errors
    /// Returns `DbToolsError` if no connection is available or the database rejects the SQL.
    pub async fn execute_command(&self, sql: &str) -> Result<(), DbToolsError> {
        let excerpt = statement_excerpt(sql, self.statement_log_limit());
        tracing::debug!(label = %self.label(), sql = %excerpt, "executing command");

        let result: Result<(), DbToolsError> = async {
            let mut conn = self.connect().await?;
            conn.execute_command(sql).await
        }
        .await;

        match &result {
            Ok(()) => tracing::info!(label = %self.label(), sql = %excerpt, "command committed"),
            Err(err) => tracing::error!(
                label = %self.label(),
                sql = %excerpt,
                kind = ?err.kind(),
                error = %error_text(err),
                "command failed"
            ),
        }
        result
    }

    /// Run one statement with optional parameters in its own transaction.
    ///
    /// Named parameters fill `:name` placeholders; positional parameters fill
    /// the backend's native placeholders. Row-producing statements (including
    /// `INSERT ... RETURNING`) are read fully and still committed.
    ///
    /// ```rust,no_run
    /// use db_tools::prelude::*;
    ///
    /// # async fn demo(engine: &Engine) -> Result<(), DbToolsError> {
    /// let outcome = engine
    ///     .run_query(
    ///         "SELECT id, email FROM users WHERE email LIKE :pattern",
    ///         [("pattern", "%@example.com")],
    ///     )
    ///     .await?;
    /// for row in outcome.rows().into_iter().flatten() {
    ///     println!("{:?}", row.get("email"));
    /// }
    /// # Ok(()) }
    /// ```
    ///
    /// # Errors
    /// Returns `DbToolsError::ParameterError` for an unbound named placeholder,
    /// or the backend error that aborted the statement.
    pub async fn run_query(
        &self,
        sql: &str,
        params: impl Into<ParameterSet>,
    ) -> Result<QueryOutcome, DbToolsError> {
        let params = params.into();
        let excerpt = statement_excerpt(sql, self.statement_log_limit());
        tracing::debug!(
            label = %self.label(),
            sql = %excerpt,
            params = params.len(),
            "running query"
        );

        let result: Result<QueryOutcome, DbToolsError> = async {
            let bound = bind_parameters(sql, &params, self.placeholder_style())?;
            let mut conn = self.connect().await?;
            conn.run_query(&bound.sql, &bound.values).await
        }
        .await;

        match &result {
            Ok(QueryOutcome::Rows(rs)) => tracing::info!(
                label = %self.label(),
                sql = %excerpt,
                rows = rs.len(),
                "query returned rows"
            ),
            Ok(QueryOutcome::RowCount(affected)) => tracing::info!(
                label = %self.label(),
                sql = %excerpt,
                affected = *affected,
                "query committed"
            ),
            Err(err) => tracing::error!(
                label = %self.label(),
                sql = %excerpt,
                kind = ?err.kind(),
                error = %error_text(err),
                "query failed"
            ),
        }
        result
    }
}

#[async_trait]
impl CommandExecutor for Engine {
    async fn execute_command(&self, sql: &str) -> Result<(), DbToolsError> {
        Engine::execute_command(self, sql).await
    }
}

#[async_trait]
impl QueryRunner for Engine {
    async fn run_query(
        &self,
        sql: &str,
        params: ParameterSet,
    ) -> Result<QueryOutcome, DbToolsError> {
        Engine::run_query(self, sql, params).await
    }
}
