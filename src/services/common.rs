//! JVM and process beans every Hadoop daemon exposes.

use once_cell::sync::Lazy;

use crate::engine::rules::{BaseLabel, CategoryRule, Marker};
use crate::services::ServiceProfile;

static PROFILE: Lazy<ServiceProfile> = Lazy::new(|| {
    ServiceProfile::new(
        "common",
        "common",
        vec![
            CategoryRule::new("JvmMetrics")
                .marker(Marker::Property("name", "JvmMetrics"))
                .segment("jvm"),
            CategoryRule::new("OperatingSystem")
                .marker(Marker::Contains("java.lang:type=OperatingSystem"))
                .segment("os"),
            CategoryRule::new("Runtime")
                .marker(Marker::Contains("java.lang:type=Runtime"))
                .segment("runtime"),
            CategoryRule::new("RpcActivity")
                .marker(Marker::Contains("name=RpcActivityForPort"))
                .segment("rpc")
                .label(BaseLabel::Tag {
                    label: "port",
                    tag: "port",
                }),
            CategoryRule::new("UgiMetrics")
                .marker(Marker::Property("name", "UgiMetrics"))
                .segment("ugi"),
        ],
    )
});

pub fn profile() -> &'static ServiceProfile {
    &PROFILE
}
