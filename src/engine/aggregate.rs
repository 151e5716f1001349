//! Categories whose bean carries a list of entity descriptors in one field,
//! e.g. `LiveNodeManagers` on the ResourceManager's `RMNMInfo` bean.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::engine::resolver::CategoryFamilies;
use crate::engine::rules::{AggregateRule, CategoryRule, Shape};
use crate::error::{ExporterError, Result};
use crate::snapshot::{FieldValue, SnapshotRecord};

type Entity = Map<String, Value>;

/// Emits one sample per entity and catalog key. `base` holds the values of
/// the category's base labels.
pub fn extract_entities(
    rule: &CategoryRule,
    aggregate: &AggregateRule,
    metrics: &BTreeMap<String, String>,
    record: &SnapshotRecord,
    base: &[String],
    families: &mut CategoryFamilies,
) -> Result<usize> {
    let entities = parse_entities(record, aggregate.field)?;
    let mut emitted = 0;
    for entity in &entities {
        let mut labels = base.to_vec();
        labels.extend(
            aggregate
                .labels
                .iter()
                .map(|(_, field)| entity_label(entity, field)),
        );
        for key in metrics.keys() {
            let classified = rule.classify(key);
            let Some(family) = families.get_mut(&classified.derived) else {
                continue;
            };
            let value = match classified.shape {
                Shape::State(state) => {
                    state.table.ordinal(entity.get(key.as_str()).and_then(Value::as_str).unwrap_or(""))
                }
                _ => entity.get(key.as_str()).and_then(number).unwrap_or(0.0),
            };
            if family.add_gauge(labels.clone(), value) {
                emitted += 1;
            }
        }
    }
    Ok(emitted)
}

/// The list may arrive as a JSON-encoded string or as a nested array. An
/// absent field means no entities.
fn parse_entities(record: &SnapshotRecord, field: &str) -> Result<Vec<Entity>> {
    let malformed = |message: String| ExporterError::EmbeddedList {
        field: field.to_string(),
        message,
    };
    match record.get(field) {
        None => Ok(Vec::new()),
        Some(FieldValue::Text(raw)) => {
            serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))
        }
        Some(FieldValue::Nested(value)) => {
            serde_json::from_value(value.clone()).map_err(|e| malformed(e.to_string()))
        }
        Some(FieldValue::Number(_)) => Err(malformed("expected a list, found a number".into())),
    }
}

fn entity_label(entity: &Entity, field: &str) -> String {
    match entity.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolver::resolve;
    use crate::engine::rules::{KeyRule, StateSource};
    use crate::engine::state::StateTable;

    const NODE_LABELS: &[(&str, &str)] = &[
        ("host", "HostName"),
        ("version", "NodeManagerVersion"),
        ("rack", "Rack"),
    ];

    fn nodes_rule() -> CategoryRule {
        CategoryRule::new("RMNMInfo")
            .without_host()
            .aggregate("LiveNodeManagers", NODE_LABELS)
            .rule(KeyRule::named("NumContainers", "node_containers_total"))
            .rule(KeyRule::state("State", StateTable::NodeState, StateSource::Field))
    }

    fn catalog() -> BTreeMap<String, String> {
        [("NumContainers", "containers"), ("State", "state")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_string_encoded_list() {
        let rule = nodes_rule();
        let metrics = catalog();
        let mut families = resolve(&rule, &metrics, "hadoop_yarn_resourcemanager");
        let record = SnapshotRecord::new("Hadoop:service=ResourceManager,name=RMNMInfo").with(
            "LiveNodeManagers",
            r#"[{"HostName":"nm1","Rack":"/r1","State":"RUNNING","NumContainers":4,"NodeManagerVersion":"3.1"},
                {"HostName":"nm2","Rack":"/r2","State":"LOST"}]"#,
        );

        let emitted = extract_entities(
            &rule,
            rule.aggregate.as_ref().unwrap(),
            &metrics,
            &record,
            &["c1".to_string()],
            &mut families,
        )
        .unwrap();
        assert_eq!(emitted, 4);

        let containers = families.get("NumContainers").unwrap();
        assert_eq!(containers.samples().len(), 2);
        assert_eq!(containers.samples()[0].labels(), &["c1", "nm1", "3.1", "/r1"]);
        // nm2 reports neither a container count nor a version.
        assert_eq!(containers.samples()[1].labels(), &["c1", "nm2", "", "/r2"]);
        assert!(matches!(
            containers.samples()[1],
            crate::engine::family::Sample::Gauge { value, .. } if value == 0.0
        ));

        let state = families.get("State").unwrap();
        assert!(matches!(
            state.samples()[1],
            crate::engine::family::Sample::Gauge { value, .. } if value == 5.0
        ));
    }

    #[test]
    fn test_malformed_list_is_an_error() {
        let rule = nodes_rule();
        let metrics = catalog();
        let mut families = resolve(&rule, &metrics, "p");
        let record = SnapshotRecord::new("Hadoop:service=ResourceManager,name=RMNMInfo")
            .with("LiveNodeManagers", "[{not json");
        let err = extract_entities(
            &rule,
            rule.aggregate.as_ref().unwrap(),
            &metrics,
            &record,
            &["c1".to_string()],
            &mut families,
        )
        .unwrap_err();
        assert!(matches!(err, ExporterError::EmbeddedList { .. }));
    }
}
