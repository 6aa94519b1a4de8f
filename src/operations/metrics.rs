use crate::imports::*;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;

/*
    Types:
    * Metric - One named aggregate, e.g. "total" => sum(amount)
    * Metrics - Insertion-ordered list of metrics, serialized as a JSON object

    Chart builders rely on metric order to line up series, so this is not a HashMap.
*/

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: ColumnOrExpression,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: impl Into<ColumnOrExpression>) -> Self {
        Metric {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metrics(Vec<Metric>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a metric, replacing any existing metric with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ColumnOrExpression>) {
        let metric = Metric::new(name, value);
        match self.0.iter_mut().find(|m| m.name == metric.name) {
            Some(existing) => *existing = metric,
            None => self.0.push(metric),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ColumnOrExpression>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ColumnOrExpression> {
        self.0.iter().find(|m| m.name == name).map(|m| &m.value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|m| m.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Metric> for Metrics {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        let mut metrics = Metrics::new();
        for metric in iter {
            metrics.insert(metric.name, metric.value);
        }
        metrics
    }
}

impl Serialize for Metrics {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for metric in &self.0 {
            map.serialize_entry(&metric.name, &metric.value)?;
        }
        map.end()
    }
}

struct MetricsVisitor;

impl<'de> Visitor<'de> for MetricsVisitor {
    type Value = Metrics;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a map of metric name to column or expression")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Metrics, A::Error> {
        let mut metrics = Metrics::new();
        while let Some((name, value)) = access.next_entry::<String, ColumnOrExpression>()? {
            metrics.insert(name, value);
        }
        Ok(metrics)
    }
}

impl<'de> Deserialize<'de> for Metrics {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(MetricsVisitor)
    }
}
