//! HDFS NameNode.
//!
//! All categories are cluster-wide, so samples carry only `cluster`, and
//! catalog keys the bean does not report are exported as zero.

use once_cell::sync::Lazy;

use crate::engine::rules::{
    CategoryRule, IndexRule, KeyRule, MissingPolicy, StateSource,
};
use crate::engine::state::StateTable;
use crate::services::ServiceProfile;

fn activity() -> CategoryRule {
    CategoryRule::new("NameNodeActivity")
        .segment("nnactivity")
        .without_host()
        .missing(MissingPolicy::Zero)
        .rule(KeyRule::Indexed(
            IndexRule::new(
                "NumOps",
                "method",
                "MethodNumOps",
                "Total number of the times the method is called.",
            )
            .named("method_ops_total"),
        ))
        .rule(KeyRule::Indexed(
            IndexRule::new(
                "AvgTime",
                "method",
                "MethodAvgTime",
                "Average turn around time of the method in milliseconds.",
            )
            .named("method_avg_time_milliseconds"),
        ))
        .rule(KeyRule::Indexed(
            IndexRule::new(
                "Ops",
                "method",
                "Operations",
                "Total number of each operation.",
            )
            .named("operations_total")
            .catch_all(),
        ))
}

fn startup() -> CategoryRule {
    let phase = |suffix, family, name, help| {
        KeyRule::Indexed(IndexRule::new(suffix, "phase", family, help).named(name))
    };
    CategoryRule::new("StartupProgress")
        .segment("startup_process")
        .without_host()
        .missing(MissingPolicy::Zero)
        .rule(KeyRule::Named {
            key: "ElapsedTime",
            name: "total_elapsed_time_milliseconds",
            help: Some("Total elapsed time in milliseconds."),
        })
        .rule(KeyRule::Named {
            key: "PercentComplete",
            name: "complete_rate",
            help: Some("Current rate completed in NameNode startup progress (The max value is not 100 but 1.0)."),
        })
        .rule(phase(
            "Count",
            "PhaseCount",
            "phase_count",
            "Total number of steps completed in the phase.",
        ))
        .rule(phase(
            "ElapsedTime",
            "PhaseElapsedTime",
            "phase_elapsed_time_milliseconds",
            "Total elapsed time in the phase in milliseconds.",
        ))
        .rule(phase(
            "Total",
            "PhaseTotal",
            "phase_total",
            "Total number of steps in the phase.",
        ))
        .rule(phase(
            "PercentComplete",
            "PhasePercentComplete",
            "phase_complete_rate",
            "Current rate completed in the phase (The max value is not 100 but 1.0).",
        ))
}

// FSNamesystemState must come first: its bean name also contains
// "FSNamesystem".
fn namesystem_state() -> CategoryRule {
    CategoryRule::new("FSNamesystemState")
        .segment("fsname_system")
        .without_host()
        .missing(MissingPolicy::Zero)
        .rule(KeyRule::state("FSState", StateTable::FsState, StateSource::Field))
        .rule(KeyRule::Indexed(
            IndexRule::new(
                "DataNodes",
                "state",
                "DataNodes",
                "Number of datanodes in each state.",
            )
            .prefix("Num")
            .named("datanodes_num"),
        ))
}

fn namesystem() -> CategoryRule {
    CategoryRule::new("FSNamesystem")
        .segment("fsname_system")
        .without_host()
        .missing(MissingPolicy::Zero)
        .rule(KeyRule::state(
            "HAState",
            StateTable::HaState,
            StateSource::Tag("HAState"),
        ))
        .rule(KeyRule::Indexed(
            IndexRule::new(
                "",
                "mode",
                "Capacity",
                "Current DataNodes capacity in each mode in bytes.",
            )
            .prefix("Capacity")
            .named("capacity_bytes"),
        ))
}

fn retry_cache() -> CategoryRule {
    CategoryRule::new("RetryCache")
        .without_host()
        .missing(MissingPolicy::Zero)
        .rule(KeyRule::Indexed(
            IndexRule::new("", "mode", "Cache", "Total number of RetryCache in each mode.")
                .prefix("Cache")
                .named("cache_total"),
        ))
}

static PROFILE: Lazy<ServiceProfile> = Lazy::new(|| {
    ServiceProfile::new(
        "hdfs",
        "namenode",
        vec![
            activity(),
            startup(),
            namesystem_state(),
            namesystem(),
            retry_cache(),
        ],
    )
});

pub fn profile() -> &'static ServiceProfile {
    &PROFILE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rules::Shape;

    #[test]
    fn test_startup_progress_keys() {
        let rule = startup();
        // The bare key is the overall figure, not a phase.
        assert_eq!(rule.classify("ElapsedTime").name(), "total_elapsed_time_milliseconds");
        let phase = rule.classify("LoadingEditsElapsedTime");
        assert_eq!(phase.name(), "phase_elapsed_time_milliseconds");
        assert!(matches!(phase.shape, Shape::Indexed { ref token, .. } if token == "LoadingEdits"));
        assert!(matches!(
            rule.classify("LoadingFsImagePercentComplete").shape,
            Shape::Indexed { ref token, .. } if token == "LoadingFsImage"
        ));
    }

    #[test]
    fn test_capacity_modes() {
        let rule = namesystem();
        let used = rule.classify("CapacityUsedNonDFS");
        assert_eq!(used.derived, "Capacity");
        assert!(matches!(used.shape, Shape::Indexed { ref token, .. } if token == "UsedNonDFS"));
        assert!(matches!(rule.classify("BlockCapacity").shape, Shape::Scalar { .. }));
        assert_eq!(rule.classify("HAState").name(), "ha_state");
    }

    #[test]
    fn test_datanode_states() {
        let rule = namesystem_state();
        let live = rule.classify("NumDecomLiveDataNodes");
        assert_eq!(live.name(), "datanodes_num");
        assert!(matches!(live.shape, Shape::Indexed { ref token, .. } if token == "DecomLive"));
        assert!(matches!(rule.classify("NumStaleDataNodes").shape, Shape::Indexed { .. }));
        assert!(matches!(rule.classify("TotalLoad").shape, Shape::Scalar { .. }));
    }
}
