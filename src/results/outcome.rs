use super::ResultSet;

/// What a parameterized statement produced.
///
/// The variant is chosen by the database client's classification of the
/// prepared statement: anything that yields columns is `Rows`, even when no
/// row matched.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// Rows from a read statement (`SELECT`, `... RETURNING`, row-returning `PRAGMA`).
    Rows(ResultSet),
    /// Affected-row count from a write statement. Zero is a valid count.
    RowCount(usize),
}

impl QueryOutcome {
    #[must_use]
    pub fn rows(&self) -> Option<&ResultSet> {
        match self {
            QueryOutcome::Rows(rs) => Some(rs),
            QueryOutcome::RowCount(_) => None,
        }
    }

    #[must_use]
    pub fn into_rows(self) -> Option<ResultSet> {
        match self {
            QueryOutcome::Rows(rs) => Some(rs),
            QueryOutcome::RowCount(_) => None,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> Option<usize> {
        match self {
            QueryOutcome::Rows(_) => None,
            QueryOutcome::RowCount(n) => Some(*n),
        }
    }
}
