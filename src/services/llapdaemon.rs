//! Hive LLAP daemon.

use once_cell::sync::Lazy;

use crate::engine::rules::{CategoryRule, KeyRule};
use crate::services::ServiceProfile;

static PROFILE: Lazy<ServiceProfile> = Lazy::new(|| {
    ServiceProfile::new(
        "hive",
        "llapdaemon",
        vec![
            // Per-thread timings arrive as ExecutorThreadCPUTime_<n>.
            CategoryRule::new("LlapDaemonExecutorMetrics")
                .segment("llapdaemonexecutormetrics")
                .rule(KeyRule::numbered("cpu", "ExecutorThread", "cpu")),
            CategoryRule::new("LlapDaemonCacheMetrics").segment("llapdaemoncachemetrics"),
            CategoryRule::new("LlapDaemonJvmMetrics").segment("llapdaemonjvmmetrics"),
        ],
    )
});

pub fn profile() -> &'static ServiceProfile {
    &PROFILE
}
