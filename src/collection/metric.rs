use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{cmp::Ordering, collections::BTreeMap, iter::FromIterator};

use crate::api::run::Metric;

/// An ordered multiset of [`Metric`]s.
///
/// Several metrics may share a key, which is how a time series is stored.
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricCollection {
    metrics: Vec<Metric>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MetricCollection {
    pub fn new() -> Self {
        MetricCollection::default()
    }

    pub fn add(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Metric> {
        self.metrics.iter()
    }

    pub fn as_slice(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn first(&self) -> Option<&Metric> {
        self.metrics.first()
    }

    pub fn last(&self) -> Option<&Metric> {
        self.metrics.last()
    }

    /// Distinct keys in the order they first appear.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for metric in &self.metrics {
            if !keys.contains(&metric.key.as_str()) {
                keys.push(&metric.key);
            }
        }
        keys
    }

    pub fn filter<P>(&self, mut predicate: P) -> MetricCollection
    where
        P: FnMut(&Metric) -> bool,
    {
        self.metrics.iter().filter(|metric| predicate(*metric)).cloned().collect()
    }

    pub fn get_by_key(&self, key: &str) -> MetricCollection {
        self.filter(|metric| metric.key == key)
    }

    pub fn get_by_step(&self, step: i64) -> MetricCollection {
        self.filter(|metric| metric.step == step)
    }

    /// The metric with the highest timestamp for every key.
    ///
    /// On equal timestamps the one added later wins.
    pub fn get_latest_by_key(&self) -> BTreeMap<String, Metric> {
        let mut latest: BTreeMap<String, Metric> = BTreeMap::new();
        for metric in &self.metrics {
            match latest.get(&metric.key) {
                Some(current) if current.timestamp > metric.timestamp => {}
                _ => {
                    latest.insert(metric.key.clone(), metric.clone());
                }
            }
        }
        latest
    }

    /// Stable sort into a new collection.
    pub fn sort_by<F>(&self, compare: F) -> MetricCollection
    where
        F: FnMut(&Metric, &Metric) -> Ordering,
    {
        let mut metrics = self.metrics.clone();
        metrics.sort_by(compare);
        MetricCollection { metrics }
    }

    pub fn sort_by_timestamp(&self) -> MetricCollection {
        self.sort_by(|a, b| a.timestamp.cmp(&b.timestamp))
    }

    pub fn sort_by_step(&self) -> MetricCollection {
        self.sort_by(|a, b| a.step.cmp(&b.step))
    }

    pub fn group_by_key(&self) -> BTreeMap<String, MetricCollection> {
        let mut groups: BTreeMap<String, MetricCollection> = BTreeMap::new();
        for metric in &self.metrics {
            groups.entry(metric.key.clone()).or_default().add(metric.clone());
        }
        groups
    }

    pub fn group_by_step(&self) -> BTreeMap<i64, MetricCollection> {
        let mut groups: BTreeMap<i64, MetricCollection> = BTreeMap::new();
        for metric in &self.metrics {
            groups.entry(metric.step).or_default().add(metric.clone());
        }
        groups
    }

    pub fn min_max(&self, key: &str) -> Option<MinMax> {
        self.values(key).fold(None, |acc, value| match acc {
            None => Some(MinMax { min: value, max: value }),
            Some(MinMax { min, max }) => Some(MinMax {
                min: min.min(value),
                max: max.max(value),
            }),
        })
    }

    /// Arithmetic mean of all values logged under `key`.
    pub fn average(&self, key: &str) -> Option<f64> {
        let (sum, count) = self.values(key).fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.metrics
            .iter()
            .filter(move |metric| metric.key == key)
            .map(|metric| metric.value)
    }
}

impl FromIterator<Metric> for MetricCollection {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        MetricCollection {
            metrics: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Metric>> for MetricCollection {
    fn from(metrics: Vec<Metric>) -> Self {
        MetricCollection { metrics }
    }
}

impl Extend<Metric> for MetricCollection {
    fn extend<I: IntoIterator<Item = Metric>>(&mut self, iter: I) {
        self.metrics.extend(iter);
    }
}

impl IntoIterator for MetricCollection {
    type Item = Metric;
    type IntoIter = std::vec::IntoIter<Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.into_iter()
    }
}

impl<'a> IntoIterator for &'a MetricCollection {
    type Item = &'a Metric;
    type IntoIter = std::slice::Iter<'a, Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.iter()
    }
}

impl Serialize for MetricCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.metrics)
    }
}

impl<'de> Deserialize<'de> for MetricCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Metric>::deserialize(deserializer).map(MetricCollection::from)
    }
}
