//! Scrape stage metrics: fetching snapshots from the configured targets.

use crate::metrics::timing::StageTimer;
use crate::metrics::{stage_metric, SelfMetric, SelfMetricKind, StageMetrics};

const SUCCESSES: &str = stage_metric!(counter, "scrape", "successes");
const FAILURES: &str = stage_metric!(counter, "scrape", "failures");
const FAMILIES: &str = stage_metric!(gauge, "scrape", "families");
const DURATION: &str = stage_metric!(histogram, "scrape", "target");

const METRICS: &[SelfMetric] = &[
    SelfMetric {
        name: SUCCESSES,
        kind: SelfMetricKind::Counter,
        help: "Total number of targets scraped and transformed",
        labels: &["service"],
    },
    SelfMetric {
        name: FAILURES,
        kind: SelfMetricKind::Counter,
        help: "Total number of target scrapes that produced no families",
        labels: &["service", "error_type"],
    },
    SelfMetric {
        name: FAMILIES,
        kind: SelfMetricKind::Gauge,
        help: "Metric families emitted by the last scrape of a target",
        labels: &["service"],
    },
    SelfMetric {
        name: DURATION,
        kind: SelfMetricKind::Histogram,
        help: "Duration of a target scrape in seconds, fetch and transform included",
        labels: &["service"],
    },
];

pub struct ScrapeMetrics;

impl ScrapeMetrics {
    pub fn time_scrape(service: &str) -> StageTimer {
        StageTimer::start(DURATION, service)
    }

    pub fn record_success(service: &str, families: usize) {
        ::metrics::counter!(SUCCESSES, "service" => service.to_string()).increment(1);
        ::metrics::gauge!(FAMILIES, "service" => service.to_string()).set(families as f64);
    }

    /// `error_type` is one of the short names from
    /// [`ExporterError::kind`](crate::error::ExporterError::kind), or `task`.
    pub fn record_failure(service: &str, error_type: &'static str) {
        ::metrics::counter!(
            FAILURES,
            "service" => service.to_string(),
            "error_type" => error_type
        )
        .increment(1);
    }
}

impl StageMetrics for ScrapeMetrics {
    const STAGE: &'static str = "scrape";

    fn metrics() -> &'static [SelfMetric] {
        METRICS
    }
}
