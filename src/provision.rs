//! Creating a login that can read one database and nothing else.
//!
//! The statements are built by interpolating the user name, password and
//! database name straight into SQL text: identifiers and passwords cannot be
//! bound parameters in `CREATE USER` / `GRANT`. Only pass trusted values.
//!
//! The three steps are separate commands, so a failure part-way leaves the
//! earlier steps in place. [`drop_read_only_user`] undoes a partial run.

use std::fmt;

use thiserror::Error;

use crate::error::DbToolsError;
use crate::executor::CommandExecutor;
use crate::logging::error_text;
use crate::types::DatabaseType;

/// SQL flavour used for the provisioning statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionDialect {
    /// `'user'@'%'` accounts with server-wide `USAGE` and a per-schema `SELECT`.
    MySql,
    /// Roles with `CONNECT` on the database and `SELECT` on its `public` schema.
    ///
    /// The engine must be connected to the named database; the select grant
    /// fails otherwise.
    Postgres,
}

impl From<DatabaseType> for ProvisionDialect {
    fn from(db_type: DatabaseType) -> Self {
        match db_type {
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => ProvisionDialect::Postgres,
            #[allow(unreachable_patterns)]
            _ => ProvisionDialect::MySql,
        }
    }
}

/// The three provisioning steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    CreateUser,
    GrantConnect,
    GrantSelect,
}

impl ProvisionStep {
    pub const ALL: [ProvisionStep; 3] = [
        ProvisionStep::CreateUser,
        ProvisionStep::GrantConnect,
        ProvisionStep::GrantSelect,
    ];
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProvisionStep::CreateUser => "create user",
            ProvisionStep::GrantConnect => "grant connect",
            ProvisionStep::GrantSelect => "grant select",
        })
    }
}

/// A provisioning step failed; the steps before it were applied.
#[derive(Debug, Error)]
#[error("read-only user provisioning failed at {step}: {source}")]
pub struct ProvisionError {
    pub step: ProvisionStep,
    #[source]
    pub source: DbToolsError,
}

/// Login to create, with the database it may read.
#[derive(Clone, PartialEq, Eq)]
pub struct ReadOnlyUser {
    pub username: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for ReadOnlyUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl ReadOnlyUser {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// SQL for one step.
    #[must_use]
    pub fn statement(&self, step: ProvisionStep, dialect: ProvisionDialect) -> String {
        let Self {
            username: u,
            password: p,
            database: db,
        } = self;
        match (dialect, step) {
            (ProvisionDialect::MySql, ProvisionStep::CreateUser) => {
                format!("CREATE USER '{u}'@'%' IDENTIFIED BY '{p}';")
            }
            (ProvisionDialect::MySql, ProvisionStep::GrantConnect) => {
                format!("GRANT USAGE ON *.* TO '{u}'@'%';")
            }
            (ProvisionDialect::MySql, ProvisionStep::GrantSelect) => {
                format!("GRANT SELECT ON `{db}`.* TO '{u}'@'%';")
            }
            (ProvisionDialect::Postgres, ProvisionStep::CreateUser) => {
                format!("CREATE USER \"{u}\" WITH PASSWORD '{p}';")
            }
            (ProvisionDialect::Postgres, ProvisionStep::GrantConnect) => {
                format!("GRANT CONNECT ON DATABASE \"{db}\" TO \"{u}\";")
            }
            // Table grants apply to the connected database only, so refuse to
            // report success from any other one.
            (ProvisionDialect::Postgres, ProvisionStep::GrantSelect) => format!(
                "DO $grant$ BEGIN \
                 IF current_database() <> '{db}' THEN \
                 RAISE EXCEPTION 'SELECT grants for {db} must run while connected to it, not to %', current_database(); \
                 END IF; \
                 GRANT SELECT ON ALL TABLES IN SCHEMA public TO \"{u}\"; \
                 END $grant$;"
            ),
        }
    }

    /// All three statements in execution order.
    #[must_use]
    pub fn statements(&self, dialect: ProvisionDialect) -> [String; 3] {
        ProvisionStep::ALL.map(|step| self.statement(step, dialect))
    }

    /// SQL that removes the login and its grants.
    ///
    /// The Postgres form expects the role to exist and must run in the
    /// database the grants were made in.
    #[must_use]
    pub fn drop_statement(&self, dialect: ProvisionDialect) -> String {
        let u = &self.username;
        match dialect {
            ProvisionDialect::MySql => format!("DROP USER IF EXISTS '{u}'@'%';"),
            ProvisionDialect::Postgres => format!("DROP OWNED BY \"{u}\"; DROP USER \"{u}\";"),
        }
    }
}

/// Create `user` and grant it read access, one step at a time.
///
/// Stops at the first failing step; later steps are not attempted.
///
/// # Errors
/// Returns [`ProvisionError`] naming the failed step and carrying its database error.
pub async fn provision_read_only_user<E>(
    executor: &E,
    user: &ReadOnlyUser,
    dialect: ProvisionDialect,
) -> Result<(), ProvisionError>
where
    E: CommandExecutor + ?Sized,
{
    for step in ProvisionStep::ALL {
        tracing::debug!(user = %user.username, %step, "provisioning step");
        let sql = user.statement(step, dialect);
        if let Err(source) = executor.execute_command(&sql).await {
            tracing::error!(
                user = %user.username,
                database = %user.database,
                %step,
                error = %error_text(&source),
                "read-only user provisioning failed"
            );
            return Err(ProvisionError { step, source });
        }
    }
    tracing::info!(
        user = %user.username,
        database = %user.database,
        "read-only user provisioned"
    );
    Ok(())
}

/// Remove a user created by [`provision_read_only_user`].
///
/// # Errors
/// Returns the database error from the drop command.
pub async fn drop_read_only_user<E>(
    executor: &E,
    user: &ReadOnlyUser,
    dialect: ProvisionDialect,
) -> Result<(), DbToolsError>
where
    E: CommandExecutor + ?Sized,
{
    executor
        .execute_command(&user.drop_statement(dialect))
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records each command and fails the `fail_on`-th one (1-based).
    struct Recorder {
        fail_on: Option<usize>,
        seen: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                fail_on,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandExecutor for Recorder {
        async fn execute_command(&self, sql: &str) -> Result<(), DbToolsError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(sql.to_string());
            if Some(seen.len()) == self.fail_on {
                return Err(DbToolsError::ExecutionError("permission denied".into()));
            }
            Ok(())
        }
    }

    fn reader() -> ReadOnlyUser {
        ReadOnlyUser::new("reader", "s3cret", "analytics")
    }

    #[tokio::test]
    async fn runs_all_three_steps_in_order() {
        let exec = Recorder::new(None);
        provision_read_only_user(&exec, &reader(), ProvisionDialect::MySql)
            .await
            .unwrap();
        assert_eq!(
            exec.seen(),
            vec![
                "CREATE USER 'reader'@'%' IDENTIFIED BY 's3cret';".to_string(),
                "GRANT USAGE ON *.* TO 'reader'@'%';".to_string(),
                "GRANT SELECT ON `analytics`.* TO 'reader'@'%';".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn stops_after_first_failure() {
        for (fail_on, step) in [
            (1, ProvisionStep::CreateUser),
            (2, ProvisionStep::GrantConnect),
            (3, ProvisionStep::GrantSelect),
        ] {
            let exec = Recorder::new(Some(fail_on));
            let err = provision_read_only_user(&exec, &reader(), ProvisionDialect::Postgres)
                .await
                .unwrap_err();
            assert_eq!(err.step, step);
            assert_eq!(exec.seen().len(), fail_on);
        }
    }

    #[test]
    fn postgres_statements() {
        let [create, connect, select] = reader().statements(ProvisionDialect::Postgres);
        assert_eq!(create, "CREATE USER \"reader\" WITH PASSWORD 's3cret';");
        assert_eq!(connect, "GRANT CONNECT ON DATABASE \"analytics\" TO \"reader\";");
        assert_eq!(
            select,
            "DO $grant$ BEGIN \
             IF current_database() <> 'analytics' THEN \
             RAISE EXCEPTION 'SELECT grants for analytics must run while connected to it, not to %', current_database(); \
             END IF; \
             GRANT SELECT ON ALL TABLES IN SCHEMA public TO \"reader\"; \
             END $grant$;"
        );
        assert_eq!(
            reader().drop_statement(ProvisionDialect::Postgres),
            "DROP OWNED BY \"reader\"; DROP USER \"reader\";"
        );
    }

    #[test]
    fn debug_hides_password() {
        let shown = format!("{:?}", reader());
        assert!(shown.contains("reader"));
        assert!(!shown.contains("s3cret"));
    }

    #[test]
    fn dialect_follows_backend() {
        #[cfg(feature = "sqlite")]
        assert_eq!(
            ProvisionDialect::from(DatabaseType::Sqlite),
            ProvisionDialect::MySql
        );
        #[cfg(feature = "postgres")]
        assert_eq!(
            ProvisionDialect::from(DatabaseType::Postgres),
            ProvisionDialect::Postgres
        );
    }

    #[test]
    fn error_names_the_step() {
        let err = ProvisionError {
            step: ProvisionStep::GrantConnect,
            source: DbToolsError::ExecutionError("denied".into()),
        };
        assert!(err.to_string().contains("grant connect"));
    }
}
