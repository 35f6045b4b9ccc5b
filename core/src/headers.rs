//! Ordered, case-insensitive HTTP header collection.
//!
//! # Design
//! Entries live in an `IndexMap` keyed by the ASCII-lowercased name, so a
//! second write of the same name (in any casing) lands on the slot of the
//! first one: the collection never holds two case-insensitively equal names
//! and a replacement never moves. The stored `Header` keeps the casing of the
//! most recent write.
//!
//! Construction from a mapping or list applies entries in iteration order
//! with update semantics: the later entry wins, at the position of the
//! earlier one.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use base64::Engine as _;
use indexmap::IndexMap;

/// A single `name: value` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn accept_charset(value: impl Into<String>) -> Self {
        Self::new("Accept-Charset", value)
    }

    pub fn accept_encoding(value: impl Into<String>) -> Self {
        Self::new("Accept-Encoding", value)
    }

    pub fn accept_language(value: impl Into<String>) -> Self {
        Self::new("Accept-Language", value)
    }

    pub fn authorization(value: impl Into<String>) -> Self {
        Self::new("Authorization", value)
    }

    /// `Authorization: Basic <base64(username:password)>`.
    pub fn authorization_basic(username: &str, password: &str) -> Self {
        let credential = base64::engine::general_purpose::STANDARD
            .encode(format!("{username}:{password}"));
        Self::authorization(format!("Basic {credential}"))
    }

    pub fn authorization_bearer(token: &str) -> Self {
        Self::authorization(format!("Bearer {token}"))
    }

    pub fn content_disposition(value: impl Into<String>) -> Self {
        Self::new("Content-Disposition", value)
    }

    pub fn content_type(value: impl Into<String>) -> Self {
        Self::new("Content-Type", value)
    }

    pub fn user_agent(value: impl Into<String>) -> Self {
        Self::new("User-Agent", value)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Header {
    fn from((name, value): (K, V)) -> Self {
        Header::new(name, value)
    }
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Ordered header collection with case-insensitive unique names.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: IndexMap<String, Header>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `name: value`, replacing any header with the same name.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.update_header(Header::new(name, value));
    }

    pub fn add_header(&mut self, header: Header) {
        self.update_header(header);
    }

    pub fn update(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.update_header(Header::new(name, value));
    }

    /// Insert-or-replace. A replacement keeps the original position.
    pub fn update_header(&mut self, header: Header) {
        self.entries.insert(key(&header.name), header);
    }

    /// Remove the header named `name`. Absent names are ignored.
    pub fn remove(&mut self, name: &str) {
        self.entries.shift_remove(&key(name));
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries.get(&key(name)).map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&key(name))
    }

    /// Header at `index` in the current order.
    pub fn get(&self, index: usize) -> Option<&Header> {
        self.entries.get_index(index).map(|(_, h)| h)
    }

    /// Sort in place by case-sensitive name.
    pub fn sort(&mut self) {
        self.entries.sort_by(|_, a, _, b| a.name.cmp(&b.name));
    }

    pub fn sorted(&self) -> Headers {
        let mut copy = self.clone();
        copy.sort();
        copy
    }

    /// Collapse into a plain name → value map. Later entries win.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|h| (h.name.clone(), h.value.clone()))
            .collect()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.values())
    }
}

impl PartialEq for Headers {
    /// Order-sensitive, unlike the underlying map.
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for Headers {}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, header) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{header}")?;
        }
        Ok(())
    }
}

/// Borrowing iterator over headers in collection order.
#[derive(Debug, Clone)]
pub struct Iter<'a>(indexmap::map::Values<'a, String, Header>);

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Header;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Owning iterator over headers in collection order.
#[derive(Debug)]
pub struct IntoIter(indexmap::map::IntoValues<String, Header>);

impl Iterator for IntoIter {
    type Item = Header;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Headers {
    type Item = Header;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.entries.into_values())
    }
}

impl Extend<Header> for Headers {
    fn extend<I: IntoIterator<Item = Header>>(&mut self, iter: I) {
        for header in iter {
            self.update_header(header);
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Headers {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(Header::from));
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        let mut headers = Headers::new();
        headers.extend(iter);
        headers
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().map(Header::from).collect()
    }
}

impl<const N: usize> From<[Header; N]> for Headers {
    fn from(list: [Header; N]) -> Self {
        list.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(list: [(K, V); N]) -> Self {
        list.into_iter().collect()
    }
}

impl From<Vec<Header>> for Headers {
    fn from(list: Vec<Header>) -> Self {
        list.into_iter().collect()
    }
}

/// Iteration order of a `HashMap` is unspecified, so which of two
/// case-colliding names wins is too. Use `BTreeMap` for a fixed outcome.
impl<K: Into<String>, V: Into<String>, S> From<HashMap<K, V, S>> for Headers {
    fn from(map: HashMap<K, V, S>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for Headers {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(headers: &Headers) -> Vec<&str> {
        headers.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut headers = Headers::new();
        headers.add("Host", "example.com");
        headers.add("Accept", "*/*");
        headers.add("X-Trace", "1");
        assert_eq!(names(&headers), ["Host", "Accept", "X-Trace"]);
    }

    #[test]
    fn update_with_different_case_replaces_in_place() {
        let mut headers = Headers::from([("Accept", "*/*"), ("Content-Type", "text/plain")]);
        headers.update("content-type", "application/json");

        assert_eq!(headers.len(), 2);
        let second = headers.get(1).unwrap();
        assert_eq!(second.name, "content-type");
        assert_eq!(second.value, "application/json");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let headers = Headers::from([("Content-Type", "text/html")]);
        assert_eq!(headers.value("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(headers.value("content-type"), Some("text/html"));
        assert!(headers.contains("Content-type"));
        assert_eq!(headers.value("Accept"), None);
    }

    #[test]
    fn remove_missing_name_is_a_no_op() {
        let mut headers = Headers::from([("A", "1")]);
        headers.remove("B");
        assert_eq!(headers.len(), 1);
        headers.remove("a");
        assert!(headers.is_empty());
    }

    #[test]
    fn remove_preserves_order_of_the_rest() {
        let mut headers = Headers::from([("A", "1"), ("B", "2"), ("C", "3")]);
        headers.remove("b");
        assert_eq!(names(&headers), ["A", "C"]);
    }

    #[test]
    fn mapping_with_colliding_names_yields_one_header() {
        let map = BTreeMap::from([("A", "1"), ("a", "2")]);
        let headers = Headers::from(map);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(0), Some(&Header::new("a", "2")));
    }

    #[test]
    fn list_with_colliding_names_keeps_first_position_and_last_value() {
        let headers = Headers::from([("X", "0"), ("Accept", "a"), ("y", "1"), ("ACCEPT", "b")]);
        assert_eq!(names(&headers), ["X", "ACCEPT", "y"]);
        assert_eq!(headers.value("accept"), Some("b"));
    }

    #[test]
    fn sorted_orders_by_name_without_touching_the_original() {
        let headers = Headers::from([("Zebra", "1"), ("Apple", "2")]);
        let sorted = headers.sorted();

        assert_eq!(
            sorted.iter().cloned().collect::<Vec<_>>(),
            vec![Header::new("Apple", "2"), Header::new("Zebra", "1")]
        );
        assert_eq!(names(&headers), ["Zebra", "Apple"]);
    }

    #[test]
    fn sort_is_case_sensitive() {
        let mut headers = Headers::from([("b", "1"), ("A", "2"), ("C", "3")]);
        headers.sort();
        assert_eq!(names(&headers), ["A", "C", "b"]);
    }

    #[test]
    fn map_round_trip_preserves_values() {
        let headers = Headers::from([("Accept", "*/*"), ("Host", "example.com")]);
        let back = Headers::from(headers.to_map());

        assert_eq!(back.len(), headers.len());
        for header in &headers {
            assert_eq!(back.value(&header.name), Some(header.value.as_str()));
        }
    }

    #[test]
    fn display_joins_lines_without_trailing_separator() {
        let headers = Headers::from([("Accept", "*/*"), ("Host", "example.com")]);
        assert_eq!(headers.to_string(), "Accept: */*\nHost: example.com");
        assert_eq!(Headers::new().to_string(), "");
    }

    #[test]
    fn iteration_is_restartable() {
        let headers = Headers::from([("A", "1"), ("B", "2")]);
        let first: Vec<_> = headers.iter().collect();
        let second: Vec<_> = headers.iter().collect();
        assert_eq!(first, second);
        assert_eq!(headers.iter().len(), 2);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let a = Headers::from([("A", "1"), ("B", "2")]);
        let b = Headers::from([("B", "2"), ("A", "1")]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn basic_authorization_is_base64_encoded() {
        let header = Header::authorization_basic("user", "pass");
        assert_eq!(header.name, "Authorization");
        assert_eq!(header.value, "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn bearer_authorization() {
        assert_eq!(
            Header::authorization_bearer("t0k3n").to_string(),
            "Authorization: Bearer t0k3n"
        );
    }
}
