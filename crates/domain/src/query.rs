//! Query — the parameters of a list request.
//!
//! A query is an ordered list of `key=value` pairs. The empty query asks the
//! backend for its default, unfiltered page. Values are stored as plain text;
//! percent-encoding happens in the transport adapter.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Parameters sent with a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// The unfiltered default query.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a raw `a=1&b=2` string. Empty segments are skipped and a
    /// leading `?` is ignored; a key without `=` gets an empty value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .trim()
            .trim_start_matches('?')
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (segment.to_string(), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// Append an arbitrary parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Request a given page number.
    #[must_use]
    pub fn page(self, page: u32) -> Self {
        self.param("page", page.to_string())
    }

    /// Request a given page size.
    #[must_use]
    pub fn size(self, size: u32) -> Self {
        self.param("size", size.to_string())
    }

    /// Sort expression, e.g. `updatedAt,desc`.
    #[must_use]
    pub fn sort(self, sort: impl Into<String>) -> Self {
        self.param("sort", sort)
    }

    /// Filter expression in the backend's filter syntax, e.g. `name ~ 'an'`.
    #[must_use]
    pub fn filter(self, filter: impl Into<String>) -> Self {
        self.param("filter", filter)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over the parameters in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromStr for Query {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_empty_string_as_empty_query() {
        assert!(Query::parse("").is_empty());
        assert_eq!(Query::parse(""), Query::empty());
    }

    #[test]
    fn should_parse_pairs_in_order() {
        let query = Query::parse("?page=1&size=10&sort=updatedAt,desc");
        let pairs: Vec<_> = query.pairs().collect();
        assert_eq!(
            pairs,
            vec![("page", "1"), ("size", "10"), ("sort", "updatedAt,desc")]
        );
    }

    #[test]
    fn should_skip_empty_segments_and_keep_bare_keys() {
        let query = Query::parse("a=1&&flag");
        let pairs: Vec<_> = query.pairs().collect();
        assert_eq!(pairs, vec![("a", "1"), ("flag", "")]);
    }

    #[test]
    fn should_build_paging_and_filter_parameters() {
        let query = Query::empty()
            .page(2)
            .size(20)
            .filter("name ~ 'an'")
            .sort("createdAt,asc");
        assert_eq!(
            query.to_string(),
            "page=2&size=20&filter=name ~ 'an'&sort=createdAt,asc"
        );
    }

    #[test]
    fn should_compare_equal_when_parameters_match() {
        let built = Query::empty().page(1).size(10);
        let parsed: Query = "page=1&size=10".parse().unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn should_display_empty_query_as_empty_string() {
        assert_eq!(Query::empty().to_string(), "");
    }
}
