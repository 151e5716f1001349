//! Reads sample values out of one bean into the category's families.

use std::collections::BTreeMap;

use tracing::debug;

use crate::engine::aggregate::extract_entities;
use crate::engine::histogram::PercentileWindow;
use crate::engine::resolver::CategoryFamilies;
use crate::engine::rules::{BaseLabel, CategoryRule, MissingPolicy, Shape, StateSource, WindowPoint};
use crate::engine::state::UNKNOWN_STATE;
use crate::error::Result;
use crate::snapshot::{FieldValue, SnapshotRecord};

/// Per-pass values shared by every bean.
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    pub cluster: &'a str,
    /// Host used when a bean has no `tag.Hostname` of its own.
    pub host: &'a str,
}

/// Values of `cluster` and the category's base labels for one bean.
pub fn base_values(rule: &CategoryRule, record: &SnapshotRecord, ctx: RecordContext<'_>) -> Vec<String> {
    let mut values = Vec::with_capacity(rule.base_labels.len() + 1);
    values.push(ctx.cluster.to_string());
    for label in &rule.base_labels {
        let value = match label {
            BaseLabel::Host => record.hostname().unwrap_or(ctx.host),
            BaseLabel::Property { property, .. } => record.property(property).unwrap_or(""),
            BaseLabel::Tag { tag, .. } => record.tag(tag).unwrap_or(""),
        };
        values.push(value.to_string());
    }
    values
}

/// Emits the samples of one bean and returns how many were added.
pub fn extract(
    rule: &CategoryRule,
    metrics: &BTreeMap<String, String>,
    record: &SnapshotRecord,
    families: &mut CategoryFamilies,
    ctx: RecordContext<'_>,
) -> Result<usize> {
    let base = base_values(rule, record, ctx);
    if let Some(aggregate) = &rule.aggregate {
        return extract_entities(rule, aggregate, metrics, record, &base, families);
    }

    let mut emitted = 0;
    let mut windows: BTreeMap<String, PercentileWindow> = BTreeMap::new();
    for (key, field) in candidates(rule, metrics, record) {
        let classified = rule.classify(key);
        let Some(family) = families.get_mut(&classified.derived) else {
            continue;
        };
        let number = field.and_then(FieldValue::as_f64);

        let added = match classified.shape {
            Shape::Windowed { point, .. } => {
                let window = windows.entry(classified.derived).or_default();
                match (point, number) {
                    (WindowPoint::Ops, Some(ops)) => window.set_ops(ops),
                    (WindowPoint::Percentile(p), Some(latency)) => window.push(p, latency),
                    _ => {}
                }
                continue;
            }
            Shape::State(state) => {
                let text = match state.source {
                    StateSource::Field => field.and_then(FieldValue::as_str),
                    StateSource::Tag(tag) => record.tag(tag),
                };
                let value = match (text, rule.missing) {
                    (Some(text), _) => state.table.ordinal(text),
                    (None, MissingPolicy::Zero) => UNKNOWN_STATE,
                    (None, MissingPolicy::Omit) => continue,
                };
                family.add_gauge(base.clone(), value)
            }
            // A template key has no entity to label.
            Shape::Entity { token: None, .. } => continue,
            Shape::Entity { token: Some(token), .. } | Shape::Indexed { token, .. } => {
                let Some(value) = value_or_default(number, rule.missing) else {
                    continue;
                };
                let mut labels = base.clone();
                labels.push(token);
                family.add_gauge(labels, value)
            }
            Shape::Scalar { .. } => {
                let Some(value) = value_or_default(number, rule.missing) else {
                    continue;
                };
                family.add_gauge(base.clone(), value)
            }
        };
        if added {
            emitted += 1;
        }
    }

    for (derived, window) in windows {
        let Some(family) = families.get_mut(&derived) else {
            continue;
        };
        let (buckets, sum) = window.reconstruct();
        if family.add_histogram(base.clone(), buckets, sum) {
            emitted += 1;
        }
    }

    debug!(
        "extractor: {} samples from {} into {}",
        emitted,
        record.name(),
        rule.category
    );
    Ok(emitted)
}

/// Keys visited for a bean. Under [`MissingPolicy::Zero`] the catalog drives
/// and absent fields are `None`; under [`MissingPolicy::Omit`] the bean
/// drives, plus catalog keys whose state lives in a tag.
fn candidates<'a>(
    rule: &CategoryRule,
    metrics: &'a BTreeMap<String, String>,
    record: &'a SnapshotRecord,
) -> Vec<(&'a str, Option<&'a FieldValue>)> {
    match rule.missing {
        MissingPolicy::Zero => metrics
            .keys()
            .map(|key| (key.as_str(), record.get(key)))
            .collect(),
        MissingPolicy::Omit => {
            let mut keys: Vec<(&str, Option<&FieldValue>)> =
                record.fields().map(|(key, value)| (key, Some(value))).collect();
            keys.extend(
                metrics
                    .keys()
                    .filter(|key| record.get(key).is_none())
                    .filter(|key| {
                        matches!(
                            rule.classify(key).shape,
                            Shape::State(state) if matches!(state.source, StateSource::Tag(_))
                        )
                    })
                    .map(|key| (key.as_str(), None)),
            );
            keys
        }
    }
}

fn value_or_default(number: Option<f64>, missing: MissingPolicy) -> Option<f64> {
    match (number, missing) {
        (Some(value), _) => Some(value),
        (None, MissingPolicy::Zero) => Some(0.0),
        (None, MissingPolicy::Omit) => None,
    }
}
