use crate::types::RowValues;

/// Values bound to a parameterized statement.
///
/// `Named` values fill `:name` placeholders; `Positional` values fill the
/// backend's native positional placeholders (`?1`/`?` for `SQLite`, `$1` for
/// Postgres) in order. The default is an empty positional set.
///
/// ```rust
/// use db_tools::prelude::*;
///
/// let params = ParameterSet::named()
///     .bind("email", "test@example.com")
///     .bind(":active", true);
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSet {
    Named(Vec<(String, RowValues)>),
    Positional(Vec<RowValues>),
}

impl Default for ParameterSet {
    fn default() -> Self {
        ParameterSet::Positional(Vec::new())
    }
}

impl ParameterSet {
    /// Empty parameter set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Start an empty named set; fill it with [`ParameterSet::bind`].
    #[must_use]
    pub fn named() -> Self {
        ParameterSet::Named(Vec::new())
    }

    #[must_use]
    pub fn positional(values: Vec<RowValues>) -> Self {
        ParameterSet::Positional(values)
    }

    /// Bind a named value. A leading `:`, `@` or `$` on `name` is ignored, and
    /// binding a name twice keeps the last value.
    ///
    /// Binding onto a positional set converts it to a named one only when the
    /// set is still empty; otherwise the value is appended positionally.
    #[must_use]
    pub fn bind(self, name: &str, value: impl Into<RowValues>) -> Self {
        let value = value.into();
        match self {
            ParameterSet::Named(mut entries) => {
                let key = normalize_name(name);
                if let Some(slot) = entries
                    .iter_mut()
                    .find(|(existing, _)| existing.as_str() == key)
                {
                    slot.1 = value;
                } else {
                    entries.push((key.to_string(), value));
                }
                ParameterSet::Named(entries)
            }
            ParameterSet::Positional(values) if values.is_empty() => {
                ParameterSet::named().bind(name, value)
            }
            ParameterSet::Positional(mut values) => {
                values.push(value);
                ParameterSet::Positional(values)
            }
        }
    }

    /// Look up a named value; always `None` for positional sets.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        match self {
            ParameterSet::Named(entries) => {
                let key = normalize_name(name);
                entries
                    .iter()
                    .find(|(existing, _)| existing.as_str() == key)
                    .map(|(_, value)| value)
            }
            ParameterSet::Positional(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ParameterSet::Named(entries) => entries.len(),
            ParameterSet::Positional(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self, ParameterSet::Named(_))
    }
}

fn normalize_name(name: &str) -> &str {
    name.strip_prefix(|c: char| matches!(c, ':' | '@' | '$'))
        .unwrap_or(name)
}

impl From<Vec<RowValues>> for ParameterSet {
    fn from(values: Vec<RowValues>) -> Self {
        ParameterSet::Positional(values)
    }
}

impl From<&[RowValues]> for ParameterSet {
    fn from(values: &[RowValues]) -> Self {
        ParameterSet::Positional(values.to_vec())
    }
}

impl<const N: usize> From<[RowValues; N]> for ParameterSet {
    fn from(values: [RowValues; N]) -> Self {
        ParameterSet::Positional(values.into())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ParameterSet
where
    K: AsRef<str>,
    V: Into<RowValues>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs
            .into_iter()
            .fold(ParameterSet::named(), |set, (name, value)| {
                set.bind(name.as_ref(), value)
            })
    }
}

impl From<()> for ParameterSet {
    fn from((): ()) -> Self {
        ParameterSet::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_a_name_replaces_value() {
        let params = ParameterSet::named()
            .bind("qty", 10_i64)
            .bind(":qty", 15_i64);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("qty"), Some(&RowValues::Int(15)));
        assert_eq!(params.get("@qty"), Some(&RowValues::Int(15)));
    }

    #[test]
    fn bind_on_empty_default_becomes_named() {
        let params = ParameterSet::default().bind("id", 1_i64);
        assert!(params.is_named());
    }

    #[test]
    fn pairs_convert_to_named_set() {
        let params = ParameterSet::from([("id", RowValues::Int(1)), ("name", "gadget".into())]);
        assert!(params.is_named());
        assert_eq!(params.get("name"), Some(&RowValues::Text("gadget".into())));
    }

    #[test]
    fn unit_is_empty() {
        let params = ParameterSet::from(());
        assert!(params.is_empty());
        assert!(!params.is_named());
    }
}
