//! YARN NodeManager.

use once_cell::sync::Lazy;

use crate::engine::rules::CategoryRule;
use crate::services::ServiceProfile;

static PROFILE: Lazy<ServiceProfile> = Lazy::new(|| {
    ServiceProfile::new(
        "yarn",
        "nodemanager",
        vec![
            CategoryRule::new("NodeManagerMetrics"),
            CategoryRule::new("ShuffleMetrics"),
        ],
    )
});

pub fn profile() -> &'static ServiceProfile {
    &PROFILE
}
