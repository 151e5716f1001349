//! Describes every stage's metrics to the recorder, with early conflict
//! detection.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::metrics::{EngineMetrics, ScrapeMetrics, StageMetrics};

/// Returns how many distinct metrics were described.
pub fn describe_all() -> usize {
    let mut seen = HashSet::new();
    describe_stage::<ScrapeMetrics>(&mut seen);
    describe_stage::<EngineMetrics>(&mut seen);
    seen.len()
}

fn describe_stage<T: StageMetrics>(seen: &mut HashSet<&'static str>) {
    for metric in T::metrics() {
        if !seen.insert(metric.name) {
            warn!(
                "Metric name conflict: '{}' is declared again by stage '{}'",
                metric.name,
                T::STAGE
            );
            continue;
        }
        debug!(
            "  - {} ({:?}) [{}]: {}",
            metric.name,
            metric.kind,
            metric.labels.join(","),
            metric.help
        );
        metric.describe();
    }
}

/// Stage of a metric name, e.g. `hadoop_exporter_scrape_failures_total` -> `scrape`.
pub fn stage_of(metric_name: &str) -> &str {
    metric_name
        .strip_prefix("hadoop_exporter_")
        .and_then(|rest| rest.split_once('_'))
        .map(|(stage, _)| stage)
        .unwrap_or("unknown")
}
