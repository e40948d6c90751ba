//! Extensible attribute bags.
//!
//! Most records carry an [`Attributes`] map for configuration and
//! extended values that have no dedicated field. Values are loosely typed
//! and the accessors coerce between representations the way callers
//! expect: `"true"` reads as a boolean, digit strings read as numbers or
//! epoch-millisecond dates, and a comma-separated string reads as a list.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::csv::{csv_to_list, list_to_csv};
use crate::reference::Reference;

/// A loosely typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// Text.
    String(String),
    /// Boolean.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Floating point number.
    Float(f64),
    /// Timestamp.
    Date(DateTime<Utc>),
    /// Ordered list of values.
    List(Vec<AttrValue>),
    /// Nested map.
    Map(BTreeMap<String, AttrValue>),
    /// Reference to another object.
    Reference(Reference),
}

impl AttrValue {
    /// Returns the string slice if this is a `String` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value as a boolean.
    ///
    /// Only `Bool(true)` and the string `"true"` (any case) are true.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Interprets the value as a 64-bit integer, if possible.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i64::from(*i)),
            Self::Long(l) => Some(*l),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) => Some(*f as i64),
            Self::String(s) => s.trim().parse().ok(),
            Self::Date(d) => Some(d.timestamp_millis()),
            _ => None,
        }
    }

    /// Interprets the value as a float, if possible.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(f64::from(*i)),
            #[allow(clippy::cast_precision_loss)]
            Self::Long(l) => Some(*l as f64),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interprets the value as a timestamp, if possible.
    #[must_use]
    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Long(millis) => Utc.timestamp_millis_opt(*millis).single(),
            Self::Int(millis) => Utc.timestamp_millis_opt(i64::from(*millis)).single(),
            Self::String(s) => parse_date(s),
            _ => None,
        }
    }

    /// Returns the list elements, wrapping a scalar into a one-element list.
    #[must_use]
    pub fn to_list(&self) -> Vec<Self> {
        match self {
            Self::List(items) => items.clone(),
            other => vec![other.clone()],
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Self::List(items) => {
                let strings: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&list_to_csv(&strings).unwrap_or_default())
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
            Self::Reference(r) => f.write_str(r.display_name()),
        }
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse::<i64>()
            .ok()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Reference> for AttrValue {
    fn from(value: Reference) -> Self {
        Self::Reference(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value.into_iter().map(Self::String).collect())
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(value: Vec<AttrValue>) -> Self {
        Self::List(value)
    }
}

/// An ordered string-keyed map of [`AttrValue`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    map: BTreeMap<String, AttrValue>,
}

impl Attributes {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value and returns the bag.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.put(key, value);
        self
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.map.get(key)
    }

    /// Sets a value, returning the previous one.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.map.insert(key.into(), value.into())
    }

    /// Sets a value while keeping the map free of noise: `None` and
    /// `Bool(false)` remove the key instead of storing it.
    pub fn put_clean(&mut self, key: impl Into<String>, value: Option<AttrValue>) {
        let key = key.into();
        match value {
            None | Some(AttrValue::Bool(false)) => {
                self.map.remove(&key);
            }
            Some(v) => {
                self.map.insert(key, v);
            }
        }
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.map.remove(key)
    }

    /// Returns the keys in order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.map.iter()
    }

    /// Copies every entry of `other` into this bag, replacing existing keys.
    pub fn merge(&mut self, other: &Self) {
        for (k, v) in &other.map {
            self.map.insert(k.clone(), v.clone());
        }
    }

    /// Returns the value stringified.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(ToString::to_string)
    }

    /// Returns the value as a boolean; absent keys are false.
    #[must_use]
    pub fn get_boolean(&self, key: &str) -> bool {
        self.get(key).is_some_and(AttrValue::to_bool)
    }

    /// Returns the value as a boolean, or `default` when the key is absent.
    #[must_use]
    pub fn get_boolean_or(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, AttrValue::to_bool)
    }

    /// Returns the value as an int, or 0.
    #[must_use]
    pub fn get_int(&self, key: &str) -> i32 {
        self.get_int_or(key, 0)
    }

    /// Returns the value as an int, or `default` when absent or not numeric.
    #[must_use]
    pub fn get_int_or(&self, key: &str, default: i32) -> i32 {
        self.get(key)
            .and_then(AttrValue::to_i64)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(default)
    }

    /// Returns the value as a long, if numeric.
    #[must_use]
    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttrValue::to_i64)
    }

    /// Returns the value as a float, or 0.0.
    #[must_use]
    pub fn get_float(&self, key: &str) -> f64 {
        self.get(key).and_then(AttrValue::to_f64).unwrap_or(0.0)
    }

    /// Returns the value as a timestamp.
    ///
    /// Longs and digit-only strings are epoch milliseconds; other strings
    /// are parsed as RFC 3339. Empty strings yield `None`.
    #[must_use]
    pub fn get_date(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(AttrValue::to_date)
    }

    /// Returns the value as a list; scalars are wrapped.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<Vec<AttrValue>> {
        self.get(key).map(AttrValue::to_list)
    }

    /// Returns the value as a list of strings. A string value is parsed
    /// as CSV.
    #[must_use]
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|value| match value {
            AttrValue::List(items) => items.iter().map(ToString::to_string).collect(),
            AttrValue::String(s) => csv_to_list(s),
            other => vec![other.to_string()],
        })
    }
}

impl FromIterator<(String, AttrValue)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (String, AttrValue)>>(iter: T) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_coercion() {
        let attrs = Attributes::new()
            .with("a", true)
            .with("b", "TRUE")
            .with("c", "yes")
            .with("d", 1);

        assert!(attrs.get_boolean("a"));
        assert!(attrs.get_boolean("b"));
        assert!(!attrs.get_boolean("c"));
        assert!(!attrs.get_boolean("d"));
        assert!(!attrs.get_boolean("missing"));
        assert!(attrs.get_boolean_or("missing", true));
        assert!(!attrs.get_boolean_or("c", true));
    }

    #[test]
    fn int_coercion_never_panics() {
        let attrs = Attributes::new()
            .with("n", 42)
            .with("s", " 17 ")
            .with("bad", "seventeen")
            .with("big", 10_000_000_000_i64);

        assert_eq!(attrs.get_int("n"), 42);
        assert_eq!(attrs.get_int("s"), 17);
        assert_eq!(attrs.get_int("bad"), 0);
        assert_eq!(attrs.get_int("missing"), 0);
        assert_eq!(attrs.get_int_or("missing", 7), 7);
        assert_eq!(attrs.get_int("big"), 0);
        assert_eq!(attrs.get_long("big"), Some(10_000_000_000));
    }

    #[test]
    fn date_coercion() {
        let attrs = Attributes::new()
            .with("millis", 1_700_000_000_000_i64)
            .with("digits", "1700000000000")
            .with("rfc", "2023-11-14T22:13:20Z")
            .with("empty", "  ")
            .with("junk", "next tuesday");

        let expected = Utc.timestamp_millis_opt(1_700_000_000_000).single();
        assert_eq!(attrs.get_date("millis"), expected);
        assert_eq!(attrs.get_date("digits"), expected);
        assert_eq!(attrs.get_date("rfc"), expected);
        assert_eq!(attrs.get_date("empty"), None);
        assert_eq!(attrs.get_date("junk"), None);
    }

    #[test]
    fn string_list_parses_csv() {
        let attrs = Attributes::new()
            .with("csv", "a, b ,c")
            .with("list", vec!["x".to_string(), "y".to_string()])
            .with("scalar", 3);

        assert_eq!(attrs.get_string_list("csv").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(attrs.get_string_list("list").unwrap(), vec!["x", "y"]);
        assert_eq!(attrs.get_string_list("scalar").unwrap(), vec!["3"]);
        assert!(attrs.get_string_list("missing").is_none());
    }

    #[test]
    fn get_list_wraps_scalars() {
        let attrs = Attributes::new().with("one", "solo");
        assert_eq!(
            attrs.get_list("one").unwrap(),
            vec![AttrValue::String("solo".into())]
        );
    }

    #[test]
    fn put_clean_removes_noise() {
        let mut attrs = Attributes::new().with("flag", true).with("note", "x");

        attrs.put_clean("flag", Some(AttrValue::Bool(false)));
        attrs.put_clean("note", None);
        attrs.put_clean("kept", Some(AttrValue::Bool(true)));

        assert_eq!(attrs.keys(), vec!["kept".to_string()]);
    }

    #[test]
    fn merge_overwrites() {
        let mut base = Attributes::new().with("a", 1).with("b", 2);
        base.merge(&Attributes::new().with("b", 3).with("c", 4));
        assert_eq!(base.get_int("b"), 3);
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn display_of_composites() {
        let list = AttrValue::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(list.to_string(), "a,b");

        let mut map = BTreeMap::new();
        map.insert("k".to_string(), AttrValue::Int(1));
        assert_eq!(AttrValue::Map(map).to_string(), "{k=1}");
    }
}
