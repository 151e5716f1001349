//! HBase RegionServer.
//!
//! Per-region, per-table and per-user metrics are reported as one key per
//! entity; the entity name moves into a label.

use once_cell::sync::Lazy;

use crate::engine::rules::{CategoryRule, KeyRule, Marker};
use crate::services::ServiceProfile;

fn sub(category: &'static str, segment: &'static str) -> CategoryRule {
    CategoryRule::new(category)
        .marker(Marker::Property("sub", category))
        .segment(segment)
}

static PROFILE: Lazy<ServiceProfile> = Lazy::new(|| {
    ServiceProfile::new(
        "hbase",
        "regionserver",
        vec![
            sub("Server", "server"),
            sub("Regions", "regions").rule(KeyRule::entity("region", "region")),
            sub("Tables", "tables").rule(KeyRule::entity("table", "table")),
            sub("Users", "users").rule(KeyRule::entity("user", "User")),
            sub("WAL", "wal"),
            sub("IPC", "ipc"),
        ],
    )
});

pub fn profile() -> &'static ServiceProfile {
    &PROFILE
}
