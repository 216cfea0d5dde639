//! Query parameter multimap and bracket-syntax reconstruction.
//!
//! Events deliver query parameters either as a single value per key or as
//! an ordered list per key. Both are stored here as one ordered list of
//! `(key, value)` pairs so no value is lost at decode time.
//!
//! [`QueryParams::structured`] produces the view a conventional
//! query-string parser would hand an application:
//!
//! ```text
//! a=foo            → "a": "foo"
//! a=foo&a=bar      → "a": "bar"                 (plain duplicates: last wins)
//! b[]=foo&b[]=bar  → "b": ["foo", "bar"]
//! c[a]=foo&c[b]=x  → "c": {"a": "foo", "b": "x"}
//! ```
//!
//! Base keys appear in first-occurrence order. When the same base key is
//! used with a different form later on (`a=1&a[]=2`), the later form
//! replaces the earlier value but keeps its position.

use indexmap::IndexMap;
use serde::Serialize;
use url::form_urlencoded;

/// Ordered query parameters, duplicates allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

/// A reconstructed query parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Scalar(String),
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

/// How a raw key participates in reconstruction.
#[derive(Debug, PartialEq, Eq)]
enum KeyForm<'a> {
    Plain(&'a str),
    List(&'a str),
    Map(&'a str, &'a str),
}

fn classify(key: &str) -> KeyForm<'_> {
    let Some(open) = key.find('[') else {
        return KeyForm::Plain(key);
    };
    if open == 0 || !key.ends_with(']') {
        return KeyForm::Plain(key);
    }
    let name = &key[..open];
    let inner = &key[open + 1..key.len() - 1];
    if inner.contains(['[', ']']) {
        return KeyForm::Plain(key);
    }
    if inner.is_empty() {
        KeyForm::List(name)
    } else {
        KeyForm::Map(name, inner)
    }
}

impl QueryParams {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Parse an `application/x-www-form-urlencoded` string.
    pub fn parse(input: &str) -> Self {
        form_urlencoded::parse(input.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value for an exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Last value for an exact key.
    pub fn last(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize back to a form-urlencoded string in declaration order.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    /// Reconstruct bracket-array and bracket-map keys into structures.
    pub fn structured(&self) -> IndexMap<String, QueryValue> {
        let mut out: IndexMap<String, QueryValue> = IndexMap::new();
        for (key, value) in &self.pairs {
            match classify(key) {
                KeyForm::Plain(name) => {
                    out.insert(name.to_string(), QueryValue::Scalar(value.clone()));
                }
                KeyForm::List(name) => match out.get_mut(name) {
                    Some(QueryValue::List(items)) => items.push(value.clone()),
                    _ => {
                        out.insert(name.to_string(), QueryValue::List(vec![value.clone()]));
                    }
                },
                KeyForm::Map(name, sub) => match out.get_mut(name) {
                    Some(QueryValue::Map(entries)) => {
                        entries.insert(sub.to_string(), value.clone());
                    }
                    _ => {
                        let mut entries = IndexMap::new();
                        entries.insert(sub.to_string(), value.clone());
                        out.insert(name.to_string(), QueryValue::Map(entries));
                    }
                },
            }
        }
        out
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
