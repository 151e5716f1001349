//! Rule tables of the supported Hadoop services.

pub mod common;
pub mod hiveserver2;
pub mod jobhistory;
pub mod journalnode;
pub mod llapdaemon;
pub mod namenode;
pub mod nodemanager;
pub mod regionserver;
pub mod resourcemanager;

use std::collections::BTreeMap;

use crate::constants::COMMON_CATEGORY;
use crate::engine::rules::CategoryRule;
use crate::error::{ExporterError, Result};

/// The categories of one service, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceProfile {
    pub component: &'static str,
    pub service: &'static str,
    pub categories: Vec<CategoryRule>,
}

impl ServiceProfile {
    pub fn new(component: &'static str, service: &'static str, categories: Vec<CategoryRule>) -> Self {
        Self {
            component,
            service,
            categories,
        }
    }

    /// `component/service`, the same key the catalog directory uses.
    pub fn key(&self) -> String {
        format!("{}/{}", self.component, self.service)
    }

    /// `<namespace>_<component>_<service>`.
    pub fn prefix(&self, namespace: &str) -> String {
        format!("{}_{}_{}", namespace, self.component, self.service)
    }

    /// Service categories followed by the reserved common category.
    pub fn merge_list(&self) -> Vec<&'static str> {
        self.categories
            .iter()
            .map(|c| c.category)
            .chain(std::iter::once(COMMON_CATEGORY))
            .collect()
    }
}

/// Lookup of built-in profiles by `(component, service)`.
pub struct ServiceRegistry {
    profiles: BTreeMap<(&'static str, &'static str), &'static ServiceProfile>,
}

impl ServiceRegistry {
    /// Create a registry holding every built-in profile
    pub fn new() -> Self {
        let mut registry = Self {
            profiles: BTreeMap::new(),
        };
        registry.register(namenode::profile());
        registry.register(journalnode::profile());
        registry.register(regionserver::profile());
        registry.register(resourcemanager::profile());
        registry.register(nodemanager::profile());
        registry.register(hiveserver2::profile());
        registry.register(llapdaemon::profile());
        registry.register(jobhistory::profile());
        registry
    }

    pub fn register(&mut self, profile: &'static ServiceProfile) {
        self.profiles
            .insert((profile.component, profile.service), profile);
    }

    pub fn get(&self, component: &str, service: &str) -> Result<&'static ServiceProfile> {
        self.profiles
            .iter()
            .find(|((c, s), _)| *c == component && *s == service)
            .map(|(_, profile)| *profile)
            .ok_or_else(|| ExporterError::UnknownService(format!("{component}/{service}")))
    }

    /// All registered `component/service` keys, sorted.
    pub fn list_services(&self) -> Vec<String> {
        self.profiles.values().map(|p| p.key()).collect()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
