//! Flat metric maps produced by collectors.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Mapping from metric name to value.
///
/// Keys are unique. Iteration is ordered by name so output is stable
/// between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricMap {
    values: BTreeMap<String, f64>,
}

impl MetricMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.values.iter()
    }

    /// Copies every entry of `other` into `self`; `other` wins on collision.
    pub fn extend_from(&mut self, other: MetricMap) {
        self.values.extend(other.values);
    }
}

impl FromIterator<(String, f64)> for MetricMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MetricMap {
    type Item = (String, f64);
    type IntoIter = btree_map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a MetricMap {
    type Item = (&'a String, &'a f64);
    type IntoIter = btree_map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Merges collector outputs into one map.
///
/// Maps are applied in order, so on a key collision the later map wins.
pub fn merge<I>(maps: I) -> MetricMap
where
    I: IntoIterator<Item = MetricMap>,
{
    let mut merged = MetricMap::new();
    for map in maps {
        merged.extend_from(map);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> MetricMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_merge_last_writer_wins() {
        let merged = merge([map(&[("a", 1.0)]), map(&[("a", 2.0), ("b", 3.0)])]);
        assert_eq!(merged, map(&[("a", 2.0), ("b", 3.0)]));
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge(Vec::new()).is_empty());
        assert_eq!(merge([MetricMap::new(), map(&[("x", 1.0)])]).len(), 1);
    }

    #[test]
    fn test_insert_returns_previous() {
        let mut m = MetricMap::new();
        assert_eq!(m.insert("arc_hits", 1.0), None);
        assert_eq!(m.insert("arc_hits", 2.0), Some(1.0));
        assert_eq!(m.get("arc_hits"), Some(2.0));
        assert!(m.contains("arc_hits"));
        assert!(!m.contains("arc_miss"));
    }

    #[test]
    fn test_iteration_is_sorted() {
        let m = map(&[("b", 2.0), ("a", 1.0), ("c", 3.0)]);
        let keys: Vec<&str> = m.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
