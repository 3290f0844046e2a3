//! Query string decoding.

use std::collections::BTreeMap;

/// Decoded query parameters, one value per key.
///
/// Decoding follows `application/x-www-form-urlencoded`: `+` is a space,
/// percent escapes are decoded, a key without `=` maps to `""`, and the last
/// occurrence of a repeated key wins. Values are kept as opaque strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let params = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Value of `key` when present and non-empty.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoding() {
        let query = QueryParams::parse(Some("name=hello+world&q=%E5%91%A8&flag&types=search"));
        assert_eq!(query.get("name"), Some("hello world"));
        assert_eq!(query.get("q"), Some("周"));
        assert_eq!(query.get("flag"), Some(""));
        assert_eq!(query.get("types"), Some("search"));
        assert_eq!(query.len(), 4);
    }

    #[test]
    fn test_last_value_wins() {
        let query = QueryParams::parse(Some("id=1&id=2"));
        assert_eq!(query.get("id"), Some("2"));
    }

    #[test]
    fn test_empty_and_missing() {
        assert!(QueryParams::parse(None).is_empty());
        assert!(QueryParams::parse(Some("")).is_empty());

        let query = QueryParams::parse(Some("target="));
        assert!(query.contains("target"));
        assert_eq!(query.non_empty("target"), None);
    }

    #[test]
    fn test_encoded_target_url() {
        let query =
            QueryParams::parse(Some("target=http%3A%2F%2Fsycdn.kuwo.cn%2Fa.mp3%3Fx%3D1%26y%3D2"));
        assert_eq!(query.get("target"), Some("http://sycdn.kuwo.cn/a.mp3?x=1&y=2"));
    }
}
