//! MapReduce JobHistory server. It has no beans of its own worth exporting,
//! only the shared JVM and process ones.

use once_cell::sync::Lazy;

use crate::services::ServiceProfile;

static PROFILE: Lazy<ServiceProfile> =
    Lazy::new(|| ServiceProfile::new("mapred", "jobhistory", Vec::new()));

pub fn profile() -> &'static ServiceProfile {
    &PROFILE
}
