// PostgreSQL backend
//
// - manager: bb8 connection manager
// - params: RowValues -> ToSql
// - query: result extraction
// - executor: transactional command/query execution

pub mod executor;
pub mod manager;
pub mod params;
pub mod query;

pub use executor::{execute_command, run_query};
pub use manager::PgManager;
pub use params::Params;
pub use query::build_result_set;
