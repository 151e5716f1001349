//! Self-instrumentation of the exporter
//!
//! Each stage (scraping targets, transforming snapshots) declares its own
//! metrics in a dedicated submodule. The recorder is installed without an
//! HTTP listener: `/metrics` appends [`render`] to the exported families.

pub mod engine;
pub mod registry;
pub mod scrape;
pub mod timing;

pub use engine::EngineMetrics;
pub use scrape::ScrapeMetrics;

use std::sync::{Once, OnceLock};

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Bucket bounds for every `*_duration_seconds` histogram. JMX documents of
/// busy NameNodes take a few seconds to fetch.
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Install the Prometheus recorder and describe every stage's metrics.
///
/// Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        let installed = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Suffix("duration_seconds".to_string()), DURATION_BUCKETS)
            .and_then(PrometheusBuilder::install_recorder);
        match installed {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("metrics: recorder handle already stored");
                }
                let described = registry::describe_all();
                info!("metrics: Prometheus recorder installed, {} self-metrics", described);
            }
            Err(e) => warn!("metrics: failed to install Prometheus recorder: {}", e),
        }
    });
}

/// Current self-metrics in text exposition format, empty before [`init_metrics`].
pub fn render() -> String {
    HANDLE.get().map(|handle| handle.render()).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfMetricKind {
    Counter,
    Gauge,
    Histogram,
}

/// A metric the exporter reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfMetric {
    pub name: &'static str,
    pub kind: SelfMetricKind,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

impl SelfMetric {
    /// Publishes the help text to the recorder.
    pub fn describe(&self) {
        match self.kind {
            SelfMetricKind::Counter => ::metrics::describe_counter!(self.name, self.help),
            SelfMetricKind::Gauge => ::metrics::describe_gauge!(self.name, self.help),
            SelfMetricKind::Histogram => ::metrics::describe_histogram!(self.name, self.help),
        }
    }
}

/// A stage that owns a set of self-metrics.
pub trait StageMetrics {
    /// Name infix shared by the stage's metrics.
    const STAGE: &'static str;

    fn metrics() -> &'static [SelfMetric];
}

/// Builds `hadoop_exporter_{stage}_{name}` names, with `_total` for counters.
macro_rules! stage_metric {
    (counter, $stage:literal, $name:literal) => {
        concat!("hadoop_exporter_", $stage, "_", $name, "_total")
    };
    (gauge, $stage:literal, $name:literal) => {
        concat!("hadoop_exporter_", $stage, "_", $name)
    };
    (histogram, $stage:literal, $name:literal) => {
        concat!("hadoop_exporter_", $stage, "_", $name, "_duration_seconds")
    };
}

pub(crate) use stage_metric;
