//! Turns catalog entries into metric families, one per derived key.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::engine::family::MetricFamily;
use crate::engine::naming::exported_name;
use crate::engine::rules::CategoryRule;

/// The families of one category, keyed by derived key, in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFamilies {
    category: String,
    families: Vec<MetricFamily>,
    index: HashMap<String, usize>,
}

impl CategoryFamilies {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            families: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn families(&self) -> &[MetricFamily] {
        &self.families
    }

    pub fn into_families(self) -> Vec<MetricFamily> {
        self.families
    }

    pub fn contains(&self, derived: &str) -> bool {
        self.index.contains_key(derived)
    }

    pub fn get(&self, derived: &str) -> Option<&MetricFamily> {
        self.index.get(derived).map(|&i| &self.families[i])
    }

    pub fn get_mut(&mut self, derived: &str) -> Option<&mut MetricFamily> {
        let i = *self.index.get(derived)?;
        self.families.get_mut(i)
    }

    /// First family registered for a derived key wins.
    pub fn insert(&mut self, derived: impl Into<String>, family: MetricFamily) -> bool {
        let derived = derived.into();
        if self.index.contains_key(&derived) {
            return false;
        }
        self.index.insert(derived, self.families.len());
        self.families.push(family);
        true
    }

    /// Appends another category's families, keeping their order. Derived
    /// keys are namespaced by the source category.
    pub fn absorb(&mut self, other: CategoryFamilies) {
        let mut by_position: Vec<(usize, String)> =
            other.index.into_iter().map(|(k, i)| (i, k)).collect();
        by_position.sort_unstable_by_key(|(i, _)| *i);
        for ((_, derived), family) in by_position.into_iter().zip(other.families) {
            self.insert(format!("{}/{}", other.category, derived), family);
        }
    }

    /// Keeps the families for which `keep` returns true, preserving order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&MetricFamily) -> bool,
    {
        let mut order: Vec<(usize, String)> = self.index.drain().map(|(k, i)| (i, k)).collect();
        order.sort_unstable_by_key(|(i, _)| *i);
        let families = std::mem::take(&mut self.families);
        for ((_, derived), family) in order.into_iter().zip(families) {
            if keep(&family) {
                self.index.insert(derived, self.families.len());
                self.families.push(family);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// Creates the families a category can emit into, from its catalog section.
pub fn resolve(
    rule: &CategoryRule,
    metrics: &BTreeMap<String, String>,
    prefix: &str,
) -> CategoryFamilies {
    let base = rule.schema();
    let mut families = CategoryFamilies::new(rule.category);
    for (key, description) in metrics {
        let classified = rule.classify(key);
        if families.contains(&classified.derived) {
            continue;
        }
        let schema = match classified.extra_label() {
            Some(label) => base.clone().with(label),
            None => base.clone(),
        };
        let family = MetricFamily::new(
            exported_name(prefix, rule.segment, &classified.name()),
            classified.help(description),
            schema,
            classified.kind(),
        );
        families.insert(classified.derived, family);
    }
    debug!(
        "resolver: {} families for category {}",
        families.len(),
        rule.category
    );
    families
}
