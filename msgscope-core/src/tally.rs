use std::collections::HashMap;
use std::hash::Hash;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Counter that remembers the order in which keys were first seen.
///
/// Ranking is a stable sort on the count, so equal counts keep first-seen
/// order. Serializes as a JSON object in stored order.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, u32)>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` with a zero count so it keeps its table position.
    pub fn seed(&mut self, key: K) {
        self.add(key, 0);
    }

    pub fn bump(&mut self, key: K) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: K, n: u32) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, n));
            }
        }
    }

    pub fn get(&self, key: &K) -> u32 {
        self.index
            .get(key)
            .map(|&i| self.entries[i].1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, v)| u64::from(*v)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u32)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    pub fn most_common(&self, n: usize) -> Vec<(K, u32)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by_key(|(_, v)| std::cmp::Reverse(*v));
        ranked.truncate(n);
        ranked
    }

    /// Highest count, first-seen on ties. `None` when nothing was counted.
    pub fn top(&self) -> Option<(K, u32)> {
        self.most_common(1).into_iter().next()
    }

    /// Copy holding the `n` most common entries in ranked order.
    pub fn ranked(&self, n: usize) -> Tally<K> {
        let mut out = Tally::new();
        for (k, v) in self.most_common(n) {
            out.add(k, v);
        }
        out
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.bump(key);
        }
        tally
    }
}

impl<K: Serialize> Serialize for Tally<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Serialize `(key, value)` pairs as a JSON object, keeping their order.
pub(crate) fn serialize_pairs<S, K, V>(pairs: &[(K, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    K: Serialize,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (k, v) in pairs {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

/// `100 * part / total`, or 0 when nothing was processed.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
