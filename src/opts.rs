use std::fmt;

use crate::def::Value;

/// Parsed options, keyed by option identity (`long` or `short`).
///
/// An insertion-ordered map: iteration visits keys in the order they were
/// first written, which keeps help output and tests deterministic.
/// Overwriting a key keeps its original position.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: Vec<(String, Value)>,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Last-write-wins insert.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Accumulating insert used by `multiple` options.
    pub(crate) fn append(&mut self, key: &str, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, Value::List(items))) => items.push(value),
            Some(entry) => entry.1 = Value::List(vec![value]),
            None => self.entries.push((key.to_string(), Value::List(vec![value]))),
        }
    }

    /// A copy of `self` with `other`'s entries written over it. `other`
    /// wins on key collision; the collided key keeps its position in
    /// `self`.
    pub fn merge(&self, other: &Options) -> Options {
        let mut res = self.clone();
        for (key, value) in other.iter() {
            res.insert(key, value.clone());
        }
        res
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The string value under `key`, if any.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Boolean presence: true only for an explicit `Bool(true)`; absent
    /// keys read as false.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn list(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_list)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter().map(|(k, v)| (k, v))).finish()
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = (&'a str, &'a Value);
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (String, Value)>, fn(&'a (String, Value)) -> (&'a str, &'a Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Options {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Options {
        let mut res = Options::new();
        for (key, value) in iter {
            res.insert(key, value);
        }
        res
    }
}
