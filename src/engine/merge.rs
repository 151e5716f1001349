//! Combines service and common categories into the emission order.

use std::collections::{HashMap, HashSet};

use crate::constants::COMMON_CATEGORY;
use crate::engine::resolver::CategoryFamilies;

/// Folds every common category into one reserved `common` category, then
/// returns the categories named in `order`. Names without families are
/// skipped.
pub fn merge(
    service: Vec<CategoryFamilies>,
    common: Vec<CategoryFamilies>,
    order: &[&str],
) -> Vec<CategoryFamilies> {
    let mut by_name: HashMap<String, CategoryFamilies> = service
        .into_iter()
        .map(|families| (families.category().to_string(), families))
        .collect();
    if !common.is_empty() {
        let mut folded = CategoryFamilies::new(COMMON_CATEGORY);
        for families in common {
            folded.absorb(families);
        }
        by_name.insert(COMMON_CATEGORY.to_string(), folded);
    }
    order
        .iter()
        .filter_map(|name| by_name.remove(*name))
        .collect()
}

/// Drops families whose exported name was already emitted by an earlier
/// category of the same pass. Families without samples never claim a name.
pub fn dedupe_names(categories: &mut [CategoryFamilies]) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut dropped = 0;
    for families in categories.iter_mut() {
        let before = families.len();
        families.retain(|family| {
            family.samples().is_empty() || seen.insert(family.name().to_string())
        });
        dropped += before - families.len();
    }
    dropped
}
