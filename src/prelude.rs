//! Convenient imports for common functionality.

pub use crate::error::{DbToolsError, ErrorKind};
pub use crate::executor::{CommandExecutor, QueryRunner};
pub use crate::params::ParameterSet;
pub use crate::pool::{ConnectionTarget, Engine, EngineOptions, EngineOptionsBuilder};
pub use crate::provision::{
    ProvisionDialect, ProvisionError, ProvisionStep, ReadOnlyUser, drop_read_only_user,
    provision_read_only_user,
};
pub use crate::results::{CustomDbRow, QueryOutcome, ResultSet};
pub use crate::tools::{create_read_only_user, execute_command, run_sql};
pub use crate::translation::{PlaceholderStyle, bind_parameters};
pub use crate::types::{DatabaseType, RowValues};
