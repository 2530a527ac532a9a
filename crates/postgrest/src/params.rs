//! Ordered query-string accumulator

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes escaped when writing a key or value into the query string.
///
/// PostgREST syntax (`,` `.` `(` `)` `{` `}` `*` `:` `!` ...) stays literal so
/// the encoded query reads the same as the server documentation.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'|');

/// Query parameters in insertion order.
///
/// Filter keys may repeat (`add`); transform keys such as `select`, `order`,
/// `limit` and `offset` are single-valued (`set`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, keeping any existing values for `key`.
    pub fn add(&mut self, key: &str, value: &str) {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    /// Replace every value for `key` with `value`.
    ///
    /// The key keeps the position of its first insertion.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value.to_string();
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.add(key, value),
        }
    }

    /// First value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values stored for `key`, in the order they were added.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `k=v&k=v`, without a leading `?`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, QUERY_COMPONENT),
                    utf8_percent_encode(v, QUERY_COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_keeps_repeated_keys() {
        let mut params = QueryParams::new();
        params.add("age", "gt.18");
        params.add("age", "lt.65");
        assert_eq!(params.encode(), "age=gt.18&age=lt.65");
        assert_eq!(params.get_all("age"), vec!["gt.18", "lt.65"]);
        assert_eq!(params.get("age"), Some("gt.18"));
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut params = QueryParams::new();
        params.set("select", "*");
        params.add("id", "eq.1");
        params.set("limit", "10");
        params.set("select", "id,name");
        params.set("limit", "5");
        assert_eq!(params.encode(), "select=id,name&id=eq.1&limit=5");
    }

    #[test]
    fn test_set_collapses_added_duplicates() {
        let mut params = QueryParams::new();
        params.add("order", "a.asc");
        params.add("x", "eq.1");
        params.add("order", "b.desc");
        params.set("order", "c.asc");
        assert_eq!(params.encode(), "order=c.asc&x=eq.1");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_empty_select_is_kept() {
        let mut params = QueryParams::new();
        params.set("select", "");
        assert_eq!(params.encode(), "select=");
        assert!(!params.is_empty());
    }

    #[test]
    fn test_encode_leaves_postgrest_syntax_alone() {
        let mut params = QueryParams::new();
        params.add("tags", "cs.{a,b}");
        params.add("id", "in.(1,2,3)");
        params.add("name", "like.*smith*");
        assert_eq!(
            params.encode(),
            "tags=cs.{a,b}&id=in.(1,2,3)&name=like.*smith*"
        );
    }

    #[test]
    fn test_encode_escapes_structural_characters() {
        let mut params = QueryParams::new();
        params.add("name", "eq.Tom & Jerry");
        params.add("expr", "eq.1+1=2");
        params.add("city", "eq.Zürich");
        assert_eq!(
            params.encode(),
            "name=eq.Tom%20%26%20Jerry&expr=eq.1%2B1%3D2&city=eq.Z%C3%BCrich"
        );
    }

    proptest! {
        #[test]
        fn added_values_survive_in_order(values in proptest::collection::vec("[a-z0-9]{1,8}", 1..10)) {
            let mut params = QueryParams::new();
            for value in &values {
                params.add("col", value);
            }
            let stored: Vec<String> = params.get_all("col").into_iter().map(String::from).collect();
            prop_assert_eq!(stored, values.clone());

            let expected = values
                .iter()
                .map(|v| format!("col={}", v))
                .collect::<Vec<_>>()
                .join("&");
            prop_assert_eq!(params.encode(), expected);
        }
    }
}
