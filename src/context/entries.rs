use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    value: Value,
}

/// Insertion-ordered JSON key/value mapping.
///
/// Overwriting a key keeps its original position; removing and re-inserting
/// a key moves it to the back. Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ContextEntries {
    next_seq: u64,
    // seq -> key, oldest first
    order: BTreeMap<u64, String>,
    slots: BTreeMap<String, Slot>,
}

impl ContextEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.slots.get(key).map(|slot| &slot.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Insert or overwrite. Returns the previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(slot) = self.slots.get_mut(&key) {
            return Some(std::mem::replace(&mut slot.value, value));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.clone());
        self.slots.insert(key, Slot { seq, value });
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let slot = self.slots.remove(key)?;
        self.order.remove(&slot.seq);
        Some(slot.value)
    }

    /// Remove up to `count` entries, oldest first. Returns the evicted keys.
    pub fn evict_oldest(&mut self, count: usize) -> Vec<String> {
        let mut evicted = Vec::with_capacity(count.min(self.len()));
        while evicted.len() < count {
            let Some((_, key)) = self.order.pop_first() else {
                break;
            };
            self.slots.remove(&key);
            evicted.push(key);
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.slots.clear();
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order.values().map(move |key| {
            let slot = &self.slots[key];
            (key.as_str(), &slot.value)
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(String::as_str)
    }
}

impl PartialEq for ContextEntries {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ContextEntries {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut entries = ContextEntries::new();
        entries.extend(iter);
        entries
    }
}

impl<K: Into<String>> Extend<(K, Value)> for ContextEntries {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl From<serde_json::Map<String, Value>> for ContextEntries {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl Serialize for ContextEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct EntriesVisitor;

impl<'de> Visitor<'de> for EntriesVisitor {
    type Value = ContextEntries;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object of context entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = ContextEntries::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            entries.insert(key, value);
        }
        Ok(entries)
    }
}

// Reads keys in document order, which `serde_json::Map` would not preserve.
impl<'de> Deserialize<'de> for ContextEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overwrite_keeps_position() {
        let mut entries: ContextEntries =
            vec![("a", json!(1)), ("b", json!(2)), ("c", json!(3))].into_iter().collect();
        entries.insert("a", json!(10));

        let keys: Vec<&str> = entries.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(entries.get("a"), Some(&json!(10)));
    }

    #[test]
    fn reinsert_after_remove_moves_to_back() {
        let mut entries: ContextEntries =
            vec![("a", json!(1)), ("b", json!(2))].into_iter().collect();
        entries.remove("a");
        entries.insert("a", json!(1));

        let keys: Vec<&str> = entries.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn evict_oldest_is_bounded_by_len() {
        let mut entries: ContextEntries =
            vec![("a", json!(1)), ("b", json!(2))].into_iter().collect();
        let evicted = entries.evict_oldest(5);

        assert_eq!(evicted, vec!["a".to_string(), "b".to_string()]);
        assert!(entries.is_empty());
    }

    #[test]
    fn json_keeps_document_order() {
        let entries: ContextEntries =
            serde_json::from_str(r#"{"zeta": 1, "alpha": {"nested": [1, 2]}, "mid": "x"}"#)
                .unwrap();

        let keys: Vec<&str> = entries.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            serde_json::to_string(&entries).unwrap(),
            r#"{"zeta":1,"alpha":{"nested":[1,2]},"mid":"x"}"#
        );
    }
}
