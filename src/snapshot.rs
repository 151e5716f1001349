//! Typed view of a JMX `/jmx` document.
//!
//! A snapshot is the ordered list of beans returned by one fetch. Each bean is
//! kept as a [`SnapshotRecord`]: its discriminant `name` plus a map of typed
//! field values. Nothing here knows about catalogs or metric families.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ExporterError, Result};

/// One field value of a bean.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    /// Arrays and objects, kept verbatim for the few categories that need them.
    Nested(Value),
}

impl FieldValue {
    /// Numeric view of the value.
    ///
    /// Text is accepted when it is a number once all whitespace is removed;
    /// HDFS reports a few counters (`TotalSyncTimes`) as padded strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => {
                let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
                if compact.is_empty() {
                    None
                } else {
                    compact.parse::<f64>().ok()
                }
            }
            FieldValue::Nested(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(FieldValue::Number(if b { 1.0 } else { 0.0 })),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::String(s) => Some(FieldValue::Text(s)),
            nested @ (Value::Array(_) | Value::Object(_)) => Some(FieldValue::Nested(nested)),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// One bean of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    name: String,
    fields: BTreeMap<String, FieldValue>,
}

impl SnapshotRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder used by fixtures and tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_f64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    /// Value of a `tag.<name>` field.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.text(&format!("tag.{name}"))
    }

    pub fn hostname(&self) -> Option<&str> {
        self.tag("Hostname")
    }

    /// Fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up a `key=value` property of the ObjectName held in `name`,
    /// e.g. `client-id` in `kafka.producer:type=producer-metrics,client-id=hive`.
    pub fn property(&self, key: &str) -> Option<&str> {
        let props = self
            .name
            .split_once(':')
            .map(|(_, props)| props)
            .unwrap_or(&self.name);
        props.split(',').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k.trim() == key).then(|| v.trim())
        })
    }

    fn from_bean(mut bean: Map<String, Value>) -> Option<Self> {
        let name = match bean.remove("name") {
            Some(Value::String(name)) => name,
            _ => return None,
        };
        let fields = bean
            .into_iter()
            .filter_map(|(k, v)| FieldValue::from_json(v).map(|v| (k, v)))
            .collect();
        Some(Self { name, fields })
    }
}

#[derive(Debug, Deserialize)]
struct JmxDocument {
    beans: Vec<Value>,
}

/// Ordered list of beans from one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<SnapshotRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<SnapshotRecord>) -> Self {
        Self { records }
    }

    /// Decodes a `{"beans": [...]}` document.
    ///
    /// Beans without a string `name` cannot be assigned to any category and
    /// are dropped.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let doc: JmxDocument = serde_json::from_slice(bytes).map_err(|e| {
            ExporterError::Snapshot(format!("expected an object with a 'beans' array: {e}"))
        })?;
        let total = doc.beans.len();
        let records: Vec<SnapshotRecord> = doc
            .beans
            .into_iter()
            .filter_map(|bean| match bean {
                Value::Object(map) => SnapshotRecord::from_bean(map),
                _ => None,
            })
            .collect();
        if records.len() != total {
            debug!(
                "snapshot: dropped {} beans without a name",
                total - records.len()
            );
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[SnapshotRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Host reported by the first bean that carries `tag.Hostname`.
    pub fn hostname(&self) -> Option<&str> {
        self.records.iter().find_map(SnapshotRecord::hostname)
    }
}
