//! Search parameter intake
//!
//! Reduces decoded query string items to one value per recognized key.
//! Multi-valued keys keep their first value and keys keep the order in
//! which they first appeared, so everything downstream iterates
//! deterministically.

use crate::{Result, SearchError};

/// Parameter names the search endpoint understands. Anything else is dropped.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "first_name",
    "last_name",
    "sex",
    "birth_place",
    "marriage_place",
    "death_place",
    "place",
    "tree_number",
    "individual_id",
    "birth_year",
    "death_year",
    "marriage_year",
    "start",
    "max_results",
    "max_count_results",
];

/// Validated search parameters, one non-empty value per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSearchParams {
    entries: Vec<(String, String)>,
}

impl RawSearchParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Entries in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_entries_unchecked(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Build the search dictionary from ordered `(key, value)` items.
///
/// Fails with `InvalidArgument` when the first value of any key is empty,
/// recognized or not. Unrecognized keys are then dropped.
pub fn build_search_dict<K, V>(items: &[(K, V)]) -> Result<RawSearchParams>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut seen: Vec<&str> = Vec::new();
    let mut entries: Vec<(String, String)> = Vec::new();

    for (key, value) in items {
        let key = key.as_ref();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        let value = value.as_ref();
        if value.is_empty() {
            return Err(SearchError::invalid_argument(format!(
                "{key} argument couldn't be empty"
            )));
        }
        if !RECOGNIZED_KEYS.contains(&key) {
            tracing::debug!(param = key, "Ignoring unrecognized search parameter");
            continue;
        }
        entries.push((key.to_string(), value.to_string()));
    }

    Ok(RawSearchParams { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_wins_and_order_is_kept() {
        let items = [
            ("last_name", "cohen"),
            ("first_name", "yehuda"),
            ("last_name", "levi"),
        ];
        let params = build_search_dict(&items).unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("last_name"), Some("cohen"));
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["last_name", "first_name"]);
    }

    #[test]
    fn empty_value_is_rejected() {
        let err = build_search_dict(&[("birth_place", "")]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "birth_place argument couldn't be empty");
    }

    #[test]
    fn empty_later_duplicate_is_ignored() {
        let params = build_search_dict(&[("sex", "m"), ("sex", "")]).unwrap();
        assert_eq!(params.get("sex"), Some("m"));
    }

    #[test]
    fn unrecognized_keys_are_dropped() {
        let params = build_search_dict(&[("nickname", "bob"), ("sex", "f")]).unwrap();
        assert_eq!(params.len(), 1);
        assert!(!params.contains("nickname"));
    }

    #[test]
    fn empty_unrecognized_key_is_still_rejected() {
        let err = build_search_dict(&[("sex", "f"), ("callback", "")]).unwrap_err();
        assert_eq!(err.to_string(), "callback argument couldn't be empty");

        let params = build_search_dict(&[("callback", "x"), ("callback", "")]).unwrap();
        assert!(params.is_empty());
    }
}
