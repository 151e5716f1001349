use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::app::ports::JmxSource;
use crate::catalog::Catalog;
use crate::config::{Config, TargetConfig};
use crate::engine::{CycleResult, Engine, EngineOptions};
use crate::metrics::ScrapeMetrics;
use crate::services::ServiceRegistry;

/// One configured daemon together with its engine.
pub struct ScrapeTarget {
    pub target: TargetConfig,
    engine: Engine,
}

impl ScrapeTarget {
    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

/// What one target produced this cycle.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub service: String,
    pub url: String,
    pub outcome: std::result::Result<CycleResult, String>,
}

/// Scrapes every configured target and transforms its snapshot.
pub struct Collector {
    source: Arc<dyn JmxSource>,
    targets: Vec<Arc<ScrapeTarget>>,
}

impl Collector {
    /// Builds one engine per target. Catalogs are loaded once per service and
    /// shared between targets of the same service.
    pub fn from_config(config: &Config, source: Arc<dyn JmxSource>) -> Result<Self> {
        let registry = ServiceRegistry::new();
        let catalog_dir = config.catalog_dir.as_deref();
        let common = Arc::new(
            Catalog::load_common(catalog_dir).context("Failed to load common catalog")?,
        );
        let mut catalogs: HashMap<String, Arc<Catalog>> = HashMap::new();

        let mut targets = Vec::with_capacity(config.targets.len());
        for target in &config.targets {
            let profile = registry.get(&target.component, &target.service)?;
            let catalog = match catalogs.get(&target.key()) {
                Some(catalog) => catalog.clone(),
                None => {
                    let catalog = Arc::new(
                        Catalog::load(&target.component, &target.service, catalog_dir)
                            .with_context(|| format!("Failed to load catalog for {}", target.key()))?,
                    );
                    catalogs.insert(target.key(), catalog.clone());
                    catalog
                }
            };
            let engine = Engine::new(
                profile,
                catalog,
                common.clone(),
                EngineOptions {
                    cluster: config.cluster.clone(),
                    namespace: config.namespace.clone(),
                    host: target.host.clone(),
                },
            );
            targets.push(Arc::new(ScrapeTarget {
                target: target.clone(),
                engine,
            }));
        }
        info!("collector: {} targets configured", targets.len());
        Ok(Self { source, targets })
    }

    pub fn targets(&self) -> &[Arc<ScrapeTarget>] {
        &self.targets
    }

    /// Scrapes all targets concurrently. Reports come back in configuration
    /// order.
    pub async fn collect(&self) -> Vec<TargetReport> {
        let handles: Vec<_> = self
            .targets
            .iter()
            .map(|target| {
                let source = self.source.clone();
                let target = target.clone();
                tokio::spawn(async move { scrape_target(source.as_ref(), &target).await })
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (handle, target) in handles.into_iter().zip(&self.targets) {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!("collector: scrape task for {} failed: {}", target.target.key(), e);
                    ScrapeMetrics::record_failure(&target.target.service, "task");
                    reports.push(TargetReport {
                        service: target.target.key(),
                        url: target.target.url.clone(),
                        outcome: Err(e.to_string()),
                    });
                }
            }
        }
        reports
    }
}

/// Fetch, then transform. A fetch failure skips the engine for this target.
#[instrument(skip(source, target), fields(service = %target.target.key(), url = %target.target.url))]
pub async fn scrape_target(source: &dyn JmxSource, target: &ScrapeTarget) -> TargetReport {
    let _timer = ScrapeMetrics::time_scrape(&target.target.service);
    let outcome = match source.fetch(&target.target.url).await {
        Ok(snapshot) => {
            let result = target.engine.transform(&snapshot);
            let families = result.families().count();
            ScrapeMetrics::record_success(&target.target.service, families);
            info!("scraped {} beans into {} families", snapshot.len(), families);
            Ok(result)
        }
        Err(e) => {
            warn!("failed to scrape {}: {}", target.target.url, e);
            ScrapeMetrics::record_failure(&target.target.service, e.kind());
            Err(e.to_string())
        }
    };
    TargetReport {
        service: target.target.key(),
        url: target.target.url.clone(),
        outcome,
    }
}
