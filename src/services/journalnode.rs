//! HDFS JournalNode.

use once_cell::sync::Lazy;

use crate::engine::rules::{CategoryRule, KeyRule, Marker, WindowRule};
use crate::services::ServiceProfile;

/// `Syncs<W>sNumOps` and `Syncs<W>s<P>thPercentileLatencyMicros` become one
/// histogram per window.
pub const SYNC_WINDOWS: WindowRule = WindowRule {
    marker: "Syncs",
    ops_suffix: "NumOps",
    percentile_suffix: "thPercentileLatencyMicros",
    name_stem: "sync",
    name_suffix: "latency_microseconds",
    help: "The percentile of sync latency in microseconds in {window}s granularity",
};

static PROFILE: Lazy<ServiceProfile> = Lazy::new(|| {
    ServiceProfile::new(
        "hdfs",
        "journalnode",
        vec![CategoryRule::new("Journal")
            .marker(Marker::Contains("name=Journal-"))
            .rule(KeyRule::Windowed(SYNC_WINDOWS))],
    )
});

pub fn profile() -> &'static ServiceProfile {
    &PROFILE
}
