use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start,
    is_named_placeholder_start, matches_tag, try_start_dollar_quote,
};
use scanner::{State, scan_identifier};

use crate::error::DbToolsError;
use crate::params::ParameterSet;
use crate::types::RowValues;

/// Positional placeholder form a backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

impl PlaceholderStyle {
    fn placeholder(self, position: usize) -> String {
        match self {
            PlaceholderStyle::Postgres => format!("${position}"),
            PlaceholderStyle::Sqlite => format!("?{position}"),
        }
    }
}

/// A statement with its parameters resolved to positional order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement<'a> {
    pub sql: Cow<'a, str>,
    pub values: Vec<RowValues>,
}

/// Resolve `params` against `sql` for a backend using `style` placeholders.
///
/// Positional sets pass through untouched. Named sets have each `:name`
/// placeholder rewritten to the positional form; a name used twice maps to
/// the same position. Placeholders inside quoted strings, comments and
/// dollar-quoted blocks are left alone, as are Postgres `::` casts. Named
/// values the statement never references are ignored.
///
/// ```rust
/// use db_tools::prelude::*;
///
/// let params = ParameterSet::named().bind("pattern", "%@example.com");
/// let bound = bind_parameters(
///     "SELECT id FROM users WHERE email LIKE :pattern AND note <> ':pattern'",
///     &params,
///     PlaceholderStyle::Postgres,
/// )?;
/// assert_eq!(bound.sql, "SELECT id FROM users WHERE email LIKE $1 AND note <> ':pattern'");
/// # Ok::<(), DbToolsError>(())
/// ```
///
/// # Errors
/// Returns `DbToolsError::ParameterError` when a placeholder has no bound value.
pub fn bind_parameters<'a>(
    sql: &'a str,
    params: &ParameterSet,
    style: PlaceholderStyle,
) -> Result<BoundStatement<'a>, DbToolsError> {
    match params {
        ParameterSet::Positional(values) => Ok(BoundStatement {
            sql: Cow::Borrowed(sql),
            values: values.clone(),
        }),
        ParameterSet::Named(_) => rewrite_named(sql, params, style),
    }
}

fn rewrite_named<'a>(
    sql: &'a str,
    params: &ParameterSet,
    style: PlaceholderStyle,
) -> Result<BoundStatement<'a>, DbToolsError> {
    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut order: Vec<&str> = Vec::new();
    let mut values = Vec::new();
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' if style == PlaceholderStyle::Postgres => {
                    if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = advance;
                    }
                }
                b':' if is_named_placeholder_start(bytes, idx) => {
                    if let Some((end, name)) = scan_identifier(bytes, idx + 1) {
                        let position = match order.iter().position(|seen| *seen == name) {
                            Some(existing) => existing + 1,
                            None => {
                                let value = params.get(name).ok_or_else(|| {
                                    DbToolsError::ParameterError(format!(
                                        "no value bound for named parameter :{name}"
                                    ))
                                })?;
                                order.push(name);
                                values.push(value.clone());
                                order.len()
                            }
                        };
                        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
                        buf.push_str(&sql[copied..idx]);
                        buf.push_str(&style.placeholder(position));
                        copied = end;
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1; // escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }
        idx += 1;
    }

    let sql = match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    };
    Ok(BoundStatement { sql, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(pairs: &[(&str, RowValues)]) -> ParameterSet {
        pairs
            .iter()
            .fold(ParameterSet::named(), |set, (name, value)| {
                set.bind(name, value.clone())
            })
    }

    #[test]
    fn rewrites_named_to_sqlite_positions() {
        let params = named(&[
            ("id", RowValues::Int(1)),
            ("name", RowValues::Text("gadget".into())),
            ("qty", RowValues::Int(10)),
        ]);
        let bound = bind_parameters(
            "INSERT INTO items (id, name, quantity) VALUES (:id, :name, :qty);",
            &params,
            PlaceholderStyle::Sqlite,
        )
        .unwrap();
        assert_eq!(
            bound.sql,
            "INSERT INTO items (id, name, quantity) VALUES (?1, ?2, ?3);"
        );
        assert_eq!(
            bound.values,
            vec![
                RowValues::Int(1),
                RowValues::Text("gadget".into()),
                RowValues::Int(10)
            ]
        );
    }

    #[test]
    fn order_follows_statement_not_binding() {
        let params = named(&[("qty", RowValues::Int(15)), ("name", "gadget".into())]);
        let bound = bind_parameters(
            "UPDATE items SET quantity = :qty WHERE name = :name",
            &params,
            PlaceholderStyle::Postgres,
        )
        .unwrap();
        assert_eq!(bound.sql, "UPDATE items SET quantity = $1 WHERE name = $2");

        let bound = bind_parameters(
            "UPDATE items SET name = :name WHERE quantity < :qty",
            &params,
            PlaceholderStyle::Postgres,
        )
        .unwrap();
        assert_eq!(bound.sql, "UPDATE items SET name = $1 WHERE quantity < $2");
        assert_eq!(
            bound.values,
            vec![RowValues::Text("gadget".into()), RowValues::Int(15)]
        );
    }

    #[test]
    fn repeated_name_reuses_position() {
        let params = named(&[("v", RowValues::Int(7))]);
        let bound =
            bind_parameters("SELECT :v, :v + 1", &params, PlaceholderStyle::Sqlite).unwrap();
        assert_eq!(bound.sql, "SELECT ?1, ?1 + 1");
        assert_eq!(bound.values, vec![RowValues::Int(7)]);
    }

    #[test]
    fn skips_literals_comments_and_casts() {
        let params = named(&[("a", RowValues::Int(1))]);
        let sql = "select ':a', \":a\", x::text -- :a\n/* :a /* :a */ */ from t where a = :a";
        let bound = bind_parameters(sql, &params, PlaceholderStyle::Postgres).unwrap();
        assert_eq!(
            bound.sql,
            "select ':a', \":a\", x::text -- :a\n/* :a /* :a */ */ from t where a = $1"
        );
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let params = named(&[("a", RowValues::Int(1))]);
        let sql = "$body$ select :a $body$ where a = :a";
        let bound = bind_parameters(sql, &params, PlaceholderStyle::Postgres).unwrap();
        assert_eq!(bound.sql, "$body$ select :a $body$ where a = $1");
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let params = named(&[("e", RowValues::Text("é".into()))]);
        let sql = "SELECT 'café' AS drink WHERE x = :e -- ✅";
        let bound = bind_parameters(sql, &params, PlaceholderStyle::Sqlite).unwrap();
        assert_eq!(bound.sql, "SELECT 'café' AS drink WHERE x = ?1 -- ✅");
    }

    #[test]
    fn missing_named_value_is_a_parameter_error() {
        let params = named(&[("a", RowValues::Int(1))]);
        let err = bind_parameters("SELECT :b", &params, PlaceholderStyle::Sqlite).unwrap_err();
        assert!(matches!(err, DbToolsError::ParameterError(_)));
        assert!(err.to_string().contains(":b"));
    }

    #[test]
    fn positional_sets_pass_through() {
        let params = ParameterSet::positional(vec![RowValues::Int(1)]);
        let bound =
            bind_parameters("SELECT * FROM t WHERE id = ?1", &params, PlaceholderStyle::Sqlite)
                .unwrap();
        assert!(matches!(bound.sql, Cow::Borrowed(_)));
        assert_eq!(bound.values, vec![RowValues::Int(1)]);
    }

    #[test]
    fn statement_without_placeholders_is_borrowed() {
        let params = named(&[("unused", RowValues::Null)]);
        let bound =
            bind_parameters("SELECT COUNT(*) FROM t", &params, PlaceholderStyle::Sqlite).unwrap();
        assert!(matches!(bound.sql, Cow::Borrowed(_)));
        assert!(bound.values.is_empty());
    }
}
