//! `application/x-www-form-urlencoded` serialization.
//!
//! # Design
//! Parameters are first turned into a `serde_json::Value` tree, then
//! flattened into `key=value` pairs:
//!
//! - keys are emitted in ascending byte order at every level;
//! - nested objects become `parent[child]`;
//! - arrays follow [`ArrayEncoding`], booleans [`BoolEncoding`], nulls
//!   [`NilEncoding`];
//! - every byte outside the RFC 3986 unreserved set (`A-Z a-z 0-9 - . _ ~`)
//!   is percent-escaped in keys and values, brackets included. Spaces follow
//!   [`SpaceEncoding`].
//!
//! `serde_json` represents non-finite floats as `null`, so they follow the
//! nil policy.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Everything except RFC 3986 unreserved characters.
const FORM_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, thiserror::Error)]
pub enum FormEncodingError {
    /// Only maps and structs have keys to encode under.
    #[error("form parameters must be an object, found {0}")]
    InvalidRootObject(&'static str),

    #[error("parameters could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How array elements are keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayEncoding {
    /// `key[]=a&key[]=b`
    #[default]
    Brackets,
    /// `key=a&key=b`
    NoBrackets,
    /// `key[0]=a&key[1]=b`
    IndexInBrackets,
}

impl ArrayEncoding {
    fn key(&self, key: &str, index: usize) -> String {
        match self {
            ArrayEncoding::Brackets => format!("{key}[]"),
            ArrayEncoding::NoBrackets => key.to_string(),
            ArrayEncoding::IndexInBrackets => format!("{key}[{index}]"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolEncoding {
    /// `1` / `0`
    #[default]
    Numeric,
    /// `true` / `false`
    Literal,
}

impl BoolEncoding {
    fn encode(&self, value: bool) -> &'static str {
        match (self, value) {
            (BoolEncoding::Numeric, true) => "1",
            (BoolEncoding::Numeric, false) => "0",
            (BoolEncoding::Literal, true) => "true",
            (BoolEncoding::Literal, false) => "false",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceEncoding {
    /// `%20`
    #[default]
    PercentEscaped,
    /// `+`
    PlusReplaced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NilEncoding {
    /// The pair is omitted.
    #[default]
    DropKey,
    /// `key=`
    DropValue,
}

/// Serializer for `application/x-www-form-urlencoded` strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlEncodedFormEncoder {
    pub array_encoding: ArrayEncoding,
    pub bool_encoding: BoolEncoding,
    pub space_encoding: SpaceEncoding,
    pub nil_encoding: NilEncoding,
}

impl UrlEncodedFormEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a map or struct.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, FormEncodingError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(self.encode_object(&map)),
            other => Err(FormEncodingError::InvalidRootObject(kind(&other))),
        }
    }

    /// Encode an already-built object. Cannot fail.
    pub fn encode_object(&self, map: &Map<String, Value>) -> String {
        let mut pairs = Vec::new();
        for (key, value) in sorted(map) {
            self.flatten(key.clone(), value, &mut pairs);
        }

        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", self.escape(key), self.escape(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn flatten(&self, key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
        match value {
            Value::Null => match self.nil_encoding {
                NilEncoding::DropKey => {}
                NilEncoding::DropValue => pairs.push((key, String::new())),
            },
            Value::Bool(b) => pairs.push((key, self.bool_encoding.encode(*b).to_string())),
            Value::Number(n) => pairs.push((key, n.to_string())),
            Value::String(s) => pairs.push((key, s.clone())),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.flatten(self.array_encoding.key(&key, index), item, pairs);
                }
            }
            Value::Object(map) => {
                for (child, item) in sorted(map) {
                    self.flatten(format!("{key}[{child}]"), item, pairs);
                }
            }
        }
    }

    /// Percent-escape one key or value.
    pub fn escape(&self, raw: &str) -> String {
        let escaped = utf8_percent_encode(raw, FORM_ESCAPE).to_string();
        match self.space_encoding {
            SpaceEncoding::PercentEscaped => escaped,
            // A literal '%' is escaped to %25, so %20 only ever stands for a space.
            SpaceEncoding::PlusReplaced => escaped.replace("%20", "+"),
        }
    }
}

fn sorted(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Append an encoded query to `url`, after any query it already has.
pub(crate) fn append_query(url: &mut Url, query: &str) {
    if query.is_empty() {
        return;
    }
    let combined = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
        _ => query.to_string(),
    };
    url.set_query(Some(&combined));
}
