use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use super::row::{CustomDbRow, column_index};
use crate::types::RowValues;

/// Rows returned by a read statement, in the order the database produced them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    /// Column names shared by all rows (to avoid duplicating in each row)
    column_names: Arc<Vec<String>>,
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create an empty result set for the given columns.
    ///
    /// # Arguments
    ///
    /// * `column_names` - Column names reported by the prepared statement
    /// * `capacity` - The initial capacity for the result rows
    #[must_use]
    pub fn with_columns(column_names: Vec<String>, capacity: usize) -> ResultSet {
        let cache = Arc::new(column_index(&column_names));
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: Arc::new(column_names),
            column_index_cache: cache,
        }
    }

    /// Column names, present even when no rows matched.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Add a row to the result set
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        self.results.push(CustomDbRow {
            column_names: Arc::clone(&self.column_names),
            rows: row_values,
            column_index_cache: Arc::clone(&self.column_index_cache),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CustomDbRow> {
        self.results.iter()
    }

    /// Render the rows as a JSON array of `{column: value}` objects.
    ///
    /// Keys keep the statement's column order.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let records = self
            .results
            .iter()
            .map(|row| {
                let mut record = Map::with_capacity(row.len());
                for (column, value) in row.iter() {
                    // serializing RowValues cannot fail; fall back to null regardless
                    record.insert(
                        column.to_string(),
                        serde_json::to_value(value).unwrap_or(JsonValue::Null),
                    );
                }
                JsonValue::Object(record)
            })
            .collect();
        JsonValue::Array(records)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a CustomDbRow;
    type IntoIter = std::slice::Iter<'a, CustomDbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        let mut rs = ResultSet::with_columns(vec!["id".into(), "email".into()], 2);
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Text("a@x".into())]);
        rs.add_row_values(vec![RowValues::Int(2), RowValues::Null]);
        rs
    }

    #[test]
    fn rows_share_columns_and_lookup() {
        let rs = sample();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.results[0].get("email").and_then(RowValues::as_text), Some("a@x"));
        assert_eq!(rs.results[1].get_by_index(0), Some(&RowValues::Int(2)));
        assert!(rs.results[1].get("missing").is_none());
        assert!(Arc::ptr_eq(
            &rs.results[0].column_names,
            &rs.results[1].column_names
        ));
    }

    #[test]
    fn empty_set_keeps_columns() {
        let rs = ResultSet::with_columns(vec!["id".into()], 0);
        assert!(rs.is_empty());
        assert_eq!(rs.column_names(), ["id".to_string()]);
        assert_eq!(rs.to_json(), serde_json::json!([]));
    }

    #[test]
    fn renders_records() {
        assert_eq!(
            sample().to_json(),
            serde_json::json!([
                {"id": 1, "email": "a@x"},
                {"id": 2, "email": null},
            ])
        );
    }

    #[test]
    fn records_keep_column_order() {
        let mut rs = ResultSet::with_columns(vec!["zeta".into(), "alpha".into(), "mid".into()], 1);
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Int(2), RowValues::Int(3)]);
        assert_eq!(
            serde_json::to_string(&rs.to_json()).unwrap(),
            r#"[{"zeta":1,"alpha":2,"mid":3}]"#
        );
    }

    #[test]
    fn duplicate_column_names_resolve_to_first() {
        let mut rs = ResultSet::with_columns(vec!["n".into(), "n".into()], 1);
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Int(2)]);
        assert_eq!(rs.results[0].get("n"), Some(&RowValues::Int(1)));
        let pairs: Vec<_> = rs.results[0].iter().collect();
        assert_eq!(pairs.len(), 2);
    }
}
