//! Bean-to-metric transformation.
//!
//! One [`Engine`] serves one service instance. For every snapshot it runs
//! discovery, family resolution and extraction for the service's categories
//! and for the shared JVM/process categories, then merges both into the
//! service's emission order. Each pass starts from empty families, so the
//! same snapshot always yields the same output.

pub mod aggregate;
pub mod discovery;
pub mod extractor;
pub mod family;
pub mod histogram;
pub mod merge;
pub mod naming;
pub mod resolver;
pub mod rules;
pub mod state;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::engine::discovery::discover;
use crate::engine::extractor::{extract, RecordContext};
use crate::engine::family::MetricFamily;
use crate::engine::resolver::{resolve, CategoryFamilies};
use crate::engine::rules::CategoryRule;
use crate::metrics::engine::EngineMetrics;
use crate::services::{self, ServiceProfile};
use crate::snapshot::Snapshot;

/// Instance-level settings fixed when the engine is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub cluster: String,
    pub namespace: String,
    /// Host used when no bean in a snapshot reports `tag.Hostname`.
    pub host: Option<String>,
}

/// A category that was dropped from a pass because one of its beans could
/// not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFailure {
    pub category: String,
    pub error: String,
}

/// Output of one pass: categories in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleResult {
    pub categories: Vec<CategoryFamilies>,
    pub failures: Vec<CategoryFailure>,
}

impl CycleResult {
    pub fn families(&self) -> impl Iterator<Item = &MetricFamily> {
        self.categories.iter().flat_map(|c| c.families().iter())
    }

    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families().find(|f| f.name() == name)
    }

    pub fn sample_count(&self) -> usize {
        self.families().map(|f| f.samples().len()).sum()
    }
}

pub struct Engine {
    profile: &'static ServiceProfile,
    common: &'static ServiceProfile,
    catalog: Arc<Catalog>,
    common_catalog: Arc<Catalog>,
    cluster: String,
    prefix: String,
    host: Option<String>,
}

impl Engine {
    pub fn new(
        profile: &'static ServiceProfile,
        catalog: Arc<Catalog>,
        common_catalog: Arc<Catalog>,
        options: EngineOptions,
    ) -> Self {
        Self {
            profile,
            common: services::common::profile(),
            catalog,
            common_catalog,
            prefix: profile.prefix(&options.namespace),
            cluster: options.cluster,
            host: options.host,
        }
    }

    pub fn profile(&self) -> &'static ServiceProfile {
        self.profile
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Host label fallback: first bean hostname, then the configured host.
    fn host<'a>(&'a self, snapshot: &'a Snapshot) -> &'a str {
        snapshot
            .hostname()
            .or(self.host.as_deref())
            .unwrap_or("")
    }

    pub fn transform(&self, snapshot: &Snapshot) -> CycleResult {
        let _timer = EngineMetrics::time_transform(self.profile.service);
        let ctx = RecordContext {
            cluster: &self.cluster,
            host: self.host(snapshot),
        };
        let mut failures = Vec::new();
        let service = self.run(&self.profile.categories, &self.catalog, snapshot, ctx, &mut failures);
        let common = self.run(&self.common.categories, &self.common_catalog, snapshot, ctx, &mut failures);
        let mut categories = merge::merge(service, common, &self.profile.merge_list());
        let shadowed = merge::dedupe_names(&mut categories);
        if shadowed > 0 {
            debug!("engine: {} families shadowed by an earlier category", shadowed);
        }

        let result = CycleResult {
            categories,
            failures,
        };
        EngineMetrics::record_pass(self.profile.service, result.sample_count(), result.failures.len());
        debug!(
            "engine: {} produced {} families, {} samples",
            self.profile.key(),
            result.families().count(),
            result.sample_count()
        );
        result
    }

    fn run(
        &self,
        rules: &[CategoryRule],
        catalog: &Catalog,
        snapshot: &Snapshot,
        ctx: RecordContext<'_>,
        failures: &mut Vec<CategoryFailure>,
    ) -> Vec<CategoryFamilies> {
        let mut out = Vec::new();
        'categories: for found in discover(rules, catalog, snapshot) {
            let Some(metrics) = catalog.category(found.rule.category) else {
                continue;
            };
            let mut families = resolve(found.rule, metrics, &self.prefix);
            for record in &found.records {
                if let Err(e) = extract(found.rule, metrics, record, &mut families, ctx) {
                    warn!(
                        "engine: dropping category {} of {}: {}",
                        found.rule.category,
                        self.profile.key(),
                        e
                    );
                    failures.push(CategoryFailure {
                        category: found.rule.category.to_string(),
                        error: e.to_string(),
                    });
                    continue 'categories;
                }
            }
            out.push(families);
        }
        out
    }
}
