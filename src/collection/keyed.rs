use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    collections::{BTreeMap, HashMap},
    iter::FromIterator,
};

use crate::api::{
    run::Param,
    tag::{KeyValue, RunTag, Tag},
};

/// Entries unique by key, iterated in insertion order.
///
/// Adding an entry whose key is already present replaces the stored entry
/// in place. Lookups by key go through an index of positions in `items`.
#[derive(Debug, Clone)]
pub struct KeyedCollection<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

pub type ParameterCollection = KeyedCollection<Param>;
pub type TagCollection<T = RunTag> = KeyedCollection<T>;

impl<T> Default for KeyedCollection<T> {
    fn default() -> Self {
        KeyedCollection {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: KeyValue> KeyedCollection<T> {
    pub fn new() -> Self {
        KeyedCollection::default()
    }

    pub fn add(&mut self, item: T) {
        match self.index.get(item.key()) {
            Some(&position) => self.items[position] = item,
            None => {
                self.index.insert(item.key().to_string(), self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&position| &self.items[position])
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let position = self.index.remove(key)?;
        for later in self.index.values_mut() {
            if *later > position {
                *later -= 1;
            }
        }
        Some(self.items.remove(position))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(KeyValue::key)
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.items
            .iter()
            .map(|item| (item.key().to_string(), item.value().to_string()))
            .collect()
    }
}

impl<T: KeyValue + Clone> KeyedCollection<T> {
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().filter(|item| predicate(*item)).cloned().collect()
    }

    /// Union of both collections where entries of `other` win on conflicts.
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for item in &other.items {
            merged.add(item.clone());
        }
        merged
    }
}

impl KeyedCollection<Param> {
    pub fn filter_by_key_prefix(&self, prefix: &str) -> Self {
        self.filter(|param| param.key.starts_with(prefix))
    }

    pub fn filter_by_value_pattern(&self, pattern: &Regex) -> Self {
        self.filter(|param| pattern.is_match(&param.value))
    }
}

impl<T: Tag + Clone> KeyedCollection<T> {
    pub fn filter_system_tags(&self) -> Self {
        self.filter(|tag| tag.is_system())
    }

    pub fn filter_user_tags(&self) -> Self {
        self.filter(|tag| !tag.is_system())
    }
}

/// Equal when both hold the same keys with the same values, in any order.
impl<T: KeyValue> PartialEq for KeyedCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .items
                .iter()
                .all(|item| other.get(item.key()).map_or(false, |theirs| theirs.value() == item.value()))
    }
}

impl<T: KeyValue> Eq for KeyedCollection<T> {}

impl<T: KeyValue> FromIterator<T> for KeyedCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = KeyedCollection::new();
        collection.extend(iter);
        collection
    }
}

impl<T: KeyValue> Extend<T> for KeyedCollection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T: KeyValue> From<Vec<T>> for KeyedCollection<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T> IntoIterator for KeyedCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a KeyedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for KeyedCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

impl<'de, T> Deserialize<'de> for KeyedCollection<T>
where
    T: KeyValue + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(KeyedCollection::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tag::ExperimentTag;

    fn params(pairs: &[(&str, &str)]) -> ParameterCollection {
        pairs.iter().map(|(key, value)| Param::new(*key, *value)).collect()
    }

    #[test]
    fn duplicate_key_overwrites_in_place() {
        let mut params = params(&[("lr", "0.1"), ("batch", "32")]);
        params.add(Param::new("lr", "0.01"));
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("lr").unwrap().value, "0.01");
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["lr", "batch"]);
    }

    #[test]
    fn remove_and_lookup() {
        let mut params = params(&[("lr", "0.1"), ("batch", "32")]);
        assert_eq!(params.remove("lr"), Some(Param::new("lr", "0.1")));
        assert_eq!(params.remove("lr"), None);
        assert!(!params.has("lr"));
        assert!(params.has("batch"));
        assert!(params.get("missing").is_none());
    }

    #[test]
    fn lookups_follow_removals() {
        let mut params = params(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
        params.remove("b");
        params.add(Param::new("c", "30"));
        params.add(Param::new("e", "5"));
        assert_eq!(params.get("c").unwrap().value, "30");
        assert_eq!(params.get("d").unwrap().value, "4");
        assert_eq!(params.get("e").unwrap().value, "5");
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn large_collections_stay_unique() {
        let params: ParameterCollection = (0..10_000).map(|i| Param::new(format!("p{}", i % 5_000), i.to_string())).collect();
        assert_eq!(params.len(), 5_000);
        assert_eq!(params.get("p42").unwrap().value, "5042");
    }

    #[test]
    fn merge_prefers_right_side() {
        let left = params(&[("lr", "0.1"), ("batch", "32")]);
        let right = params(&[("lr", "0.01"), ("epochs", "5")]);
        let merged = left.merge(&right);
        assert_eq!(merged.to_map().get("lr").map(String::as_str), Some("0.01"));
        assert_eq!(merged.len(), 3);
        assert_eq!(left.get("lr").unwrap().value, "0.1");
    }

    #[test]
    fn equality_ignores_order() {
        let a = params(&[("lr", "0.1"), ("batch", "32")]);
        let b = params(&[("batch", "32"), ("lr", "0.1")]);
        let c = params(&[("batch", "32"), ("lr", "0.2")]);
        let d = params(&[("batch", "32")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn prefix_and_pattern_filters() {
        let params = params(&[("optimizer.lr", "0.1"), ("optimizer.momentum", "0.9"), ("model", "resnet50")]);
        assert_eq!(params.filter_by_key_prefix("optimizer.").len(), 2);

        let numeric = Regex::new(r"^\d+(\.\d+)?$").unwrap();
        let filtered = params.filter_by_value_pattern(&numeric);
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["optimizer.lr", "optimizer.momentum"]);
    }

    #[test]
    fn system_and_user_tags() {
        let tags: TagCollection<ExperimentTag> = vec![
            ExperimentTag::new("mlflow.note.content", "hello"),
            ExperimentTag::new("team", "vision"),
            ExperimentTag::new("mlflow.user", "leo"),
        ]
        .into();
        assert_eq!(tags.filter_system_tags().len(), 2);
        assert_eq!(tags.filter_user_tags().keys().collect::<Vec<_>>(), vec!["team"]);
    }

    #[test]
    fn deserializing_deduplicates_keys() {
        let tags: TagCollection = serde_json::from_str(r#"[{"key": "a", "value": "1"}, {"key": "a", "value": "2"}]"#).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("a").unwrap().value, "2");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        proptest! {
            #[test]
            fn prop_len_equals_distinct_keys(pairs in prop::collection::vec(("[a-e]{1,2}", "[0-9]{1,3}"), 0..50)) {
                let mut params = ParameterCollection::new();
                for (key, value) in &pairs {
                    params.add(Param::new(key.as_str(), value.as_str()));
                }
                let distinct: HashSet<&String> = pairs.iter().map(|(key, _)| key).collect();
                prop_assert_eq!(params.len(), distinct.len());
            }

            #[test]
            fn prop_last_write_wins(pairs in prop::collection::vec(("[a-c]", "[0-9]{1,3}"), 1..30)) {
                let params: ParameterCollection = pairs.iter().map(|(k, v)| Param::new(k.as_str(), v.as_str())).collect();
                for (key, _) in &pairs {
                    let last = pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v);
                    prop_assert_eq!(params.get(key).map(|p| &p.value), last);
                }
            }

            #[test]
            fn prop_lookups_match_a_scan(ops in prop::collection::vec((any::<bool>(), "[a-f]", "[0-9]{1,2}"), 0..60)) {
                let mut params = ParameterCollection::new();
                for (remove, key, value) in &ops {
                    if *remove {
                        params.remove(key);
                    } else {
                        params.add(Param::new(key.as_str(), value.as_str()));
                    }
                }
                for param in params.iter() {
                    prop_assert_eq!(params.get(&param.key), Some(param));
                }
                prop_assert_eq!(params.iter().count(), params.len());
            }

            #[test]
            fn prop_filter_is_idempotent(pairs in prop::collection::vec(("[a-e]", "[0-9]{1,3}"), 0..30)) {
                let params: ParameterCollection = pairs.into_iter().map(|(k, v)| Param::new(k, v)).collect();
                let once = params.filter(|p| p.value.len() > 1);
                prop_assert_eq!(once.filter(|p| p.value.len() > 1), once);
            }
        }
    }
}
