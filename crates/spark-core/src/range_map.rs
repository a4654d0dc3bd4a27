// File: crates/spark-core/src/range_map.rs
// Summary: Lookup table keyed by exact values or `lo:hi` numeric intervals.

use indexmap::IndexMap;

use crate::types::{number_to_string, parse_number, Value};

/// Maps exact keys and closed numeric intervals to labels (or colours).
///
/// Exact keys always win. Otherwise intervals are scanned from the last declared
/// to the first and the first one containing the value is returned, so a later
/// interval takes a shared boundary. An empty bound is open (`":5"`, `"5:"`).
#[derive(Clone, Debug, PartialEq)]
pub struct RangeMap<T> {
    exact: IndexMap<String, T>,
    ranges: Vec<(f64, f64, T)>,
}

impl<T> Default for RangeMap<T> {
    fn default() -> Self {
        Self { exact: IndexMap::new(), ranges: Vec::new() }
    }
}

impl<T: Clone> RangeMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        if let Some((lo, hi)) = parse_interval(&key) {
            self.ranges.push((lo, hi, value.clone()));
        }
        self.exact.insert(key, value);
    }

    /// Resolve a numeric value.
    pub fn get(&self, value: f64) -> Option<&T> {
        self.exact
            .get(&number_to_string(value))
            .or_else(|| self.scan(value))
    }

    /// Resolve a raw key; numeric keys fall through to the interval scan.
    pub fn get_key(&self, key: &str) -> Option<&T> {
        self.exact
            .get(key)
            .or_else(|| parse_number(key).and_then(|n| self.scan(n)))
    }

    pub fn get_value(&self, value: &Value) -> Option<&T> {
        match value {
            Value::Number(n) => self.get(*n),
            Value::Null | Value::Undefined => self.exact.get(&value.to_key()),
            other => self.get_key(&other.to_key()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    fn scan(&self, value: f64) -> Option<&T> {
        self.ranges
            .iter()
            .rev()
            .find(|(lo, hi, _)| *lo <= value && *hi >= value)
            .map(|(_, _, v)| v)
    }
}

impl<K: Into<String>, T: Clone> FromIterator<(K, T)> for RangeMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = RangeMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

fn parse_interval(key: &str) -> Option<(f64, f64)> {
    let (lo, hi) = key.split_once(':')?;
    let hi = hi.split(':').next().unwrap_or(hi);
    let bound = |s: &str, open: f64| {
        if s.is_empty() {
            open
        } else {
            parse_number(s).unwrap_or(f64::NAN)
        }
    };
    Some((bound(lo, f64::NEG_INFINITY), bound(hi, f64::INFINITY)))
}
