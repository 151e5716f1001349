//! HiveServer2, via the Kafka producer beans of its hook.

use once_cell::sync::Lazy;

use crate::engine::rules::{BaseLabel, CategoryRule, Marker};
use crate::services::ServiceProfile;

const CLIENT_ID: BaseLabel = BaseLabel::Property {
    label: "client_id",
    property: "client-id",
};

fn producer(category: &'static str) -> CategoryRule {
    CategoryRule::new(category)
        .marker(Marker::Property("type", category))
        .label(CLIENT_ID)
}

static PROFILE: Lazy<ServiceProfile> = Lazy::new(|| {
    ServiceProfile::new(
        "hive",
        "hiveserver2",
        vec![
            producer("producer-metrics"),
            producer("producer-node-metrics")
                .segment("producer_node")
                .label(BaseLabel::Property {
                    label: "node_id",
                    property: "node-id",
                }),
            producer("producer-topic-metrics")
                .segment("producer_topic")
                .label(BaseLabel::Property {
                    label: "topic",
                    property: "topic",
                }),
            producer("kafka-metrics-count"),
        ],
    )
});

pub fn profile() -> &'static ServiceProfile {
    &PROFILE
}
