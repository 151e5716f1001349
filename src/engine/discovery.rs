//! Assigns snapshot beans to categories.

use crate::catalog::Catalog;
use crate::engine::rules::CategoryRule;
use crate::snapshot::{Snapshot, SnapshotRecord};

/// A category with its catalog section and the beans assigned to it.
#[derive(Debug)]
pub struct Discovered<'r, 's> {
    pub rule: &'r CategoryRule,
    pub records: Vec<&'s SnapshotRecord>,
}

/// Each bean goes to the first declared category that accepts it. Categories
/// the catalog has no section for, and categories without beans, are dropped.
pub fn discover<'r, 's>(
    rules: &'r [CategoryRule],
    catalog: &Catalog,
    snapshot: &'s Snapshot,
) -> Vec<Discovered<'r, 's>> {
    let mut assigned: Vec<Vec<&SnapshotRecord>> = vec![Vec::new(); rules.len()];
    for record in snapshot.records() {
        if let Some(i) = rules.iter().position(|rule| rule.accepts(record)) {
            assigned[i].push(record);
        }
    }
    rules
        .iter()
        .zip(assigned)
        .filter(|(rule, records)| !records.is_empty() && catalog.category(rule.category).is_some())
        .map(|(rule, records)| Discovered { rule, records })
        .collect()
}
