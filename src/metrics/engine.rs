//! Engine stage metrics: transformation passes over snapshots.

use crate::metrics::timing::StageTimer;
use crate::metrics::{stage_metric, SelfMetric, SelfMetricKind, StageMetrics};

const SAMPLES: &str = stage_metric!(gauge, "engine", "samples");
const CATEGORY_FAILURES: &str = stage_metric!(counter, "engine", "category_failures");
const TRANSFORM: &str = stage_metric!(histogram, "engine", "transform");

const METRICS: &[SelfMetric] = &[
    SelfMetric {
        name: SAMPLES,
        kind: SelfMetricKind::Gauge,
        help: "Samples produced by the last transformation pass",
        labels: &["service"],
    },
    SelfMetric {
        name: CATEGORY_FAILURES,
        kind: SelfMetricKind::Counter,
        help: "Total number of categories dropped from a pass because a bean could not be read",
        labels: &["service"],
    },
    SelfMetric {
        name: TRANSFORM,
        kind: SelfMetricKind::Histogram,
        help: "Duration of one transformation pass in seconds",
        labels: &["service"],
    },
];

pub struct EngineMetrics;

impl EngineMetrics {
    pub fn time_transform(service: &str) -> StageTimer {
        StageTimer::start(TRANSFORM, service)
    }

    pub fn record_pass(service: &str, samples: usize, category_failures: usize) {
        ::metrics::gauge!(SAMPLES, "service" => service.to_string()).set(samples as f64);
        if category_failures > 0 {
            ::metrics::counter!(CATEGORY_FAILURES, "service" => service.to_string())
                .increment(category_failures as u64);
        }
    }
}

impl StageMetrics for EngineMetrics {
    const STAGE: &'static str = "engine";

    fn metrics() -> &'static [SelfMetric] {
        METRICS
    }
}
