//! YARN ResourceManager.

use once_cell::sync::Lazy;

use crate::engine::rules::{CategoryRule, IndexRule, KeyRule, MissingPolicy, StateRule, StateSource};
use crate::engine::state::StateTable;
use crate::services::ServiceProfile;

const NODE_LABELS: &[(&str, &str)] = &[
    ("host", "HostName"),
    ("version", "NodeManagerVersion"),
    ("rack", "Rack"),
];

const ELAPSED_BANDS: &[(&str, &str)] = &[
    ("0", "0to60"),
    ("60", "60to300"),
    ("300", "300to1440"),
    ("1440", "1440up"),
];

/// One sample per live NodeManager, read from the `LiveNodeManagers` list.
fn node_managers() -> CategoryRule {
    CategoryRule::new("RMNMInfo")
        .without_host()
        .missing(MissingPolicy::Zero)
        .aggregate("LiveNodeManagers", NODE_LABELS)
        .rule(KeyRule::named("NumContainers", "node_containers_total"))
        .rule(KeyRule::named("UsedMemoryMB", "node_memory_used"))
        .rule(KeyRule::named("AvailableMemoryMB", "node_memory_available"))
        .rule(KeyRule::State(StateRule {
            key: "State",
            table: StateTable::NodeState,
            source: StateSource::Field,
            name: Some("node_state"),
        }))
}

/// Only the root queue is exported.
fn queues() -> CategoryRule {
    CategoryRule::new("QueueMetrics")
        .without_host()
        .missing(MissingPolicy::Zero)
        .require_tag("Queue", "root")
        .rule(KeyRule::Indexed(
            IndexRule::new(
                "",
                "elapsed_time",
                "running_app",
                "Current number of running applications in each elapsed time ( < 60min, 60min < x < 300min, 300min < x < 1440min and x > 1440min )",
            )
            .prefix("running_")
            .named("running_app_total")
            .translate(ELAPSED_BANDS),
        ))
}

fn cluster() -> CategoryRule {
    CategoryRule::new("ClusterMetrics")
        .without_host()
        .missing(MissingPolicy::Zero)
        .rule(KeyRule::Indexed(
            IndexRule::new(
                "NMs",
                "status",
                "NMs",
                "Current number of NodeManagers in each status",
            )
            .prefix("Num")
            .named("nodemanager_total"),
        ))
        .rule(KeyRule::Indexed(
            IndexRule::new(
                "DelayNumOps",
                "oper",
                "NumOps",
                "Total number of Applications Masters in each operation",
            )
            .prefix("AM")
            .named("ams_total"),
        ))
        .rule(KeyRule::Indexed(
            IndexRule::new(
                "DelayAvgTime",
                "oper",
                "AvgTime",
                "Average time in milliseconds AM spends in each operation",
            )
            .prefix("AM")
            .named("average_time_milliseconds"),
        ))
}

static PROFILE: Lazy<ServiceProfile> = Lazy::new(|| {
    ServiceProfile::new(
        "yarn",
        "resourcemanager",
        vec![node_managers(), queues(), cluster()],
    )
});

pub fn profile() -> &'static ServiceProfile {
    &PROFILE
}
