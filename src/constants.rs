/// Shared names and defaults used across the exporter

/// Reserved category that collects the JVM and process beans of every service.
pub const COMMON_CATEGORY: &str = "common";

/// First segment of every exported family name unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "hadoop";

pub const DEFAULT_CLUSTER: &str = "default";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:9130";

pub const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_CONFIG_PATH: &str = "exporter.toml";

// Environment overrides, applied after the config file
pub const ENV_LISTEN: &str = "HADOOP_EXPORTER_LISTEN";
pub const ENV_CLUSTER: &str = "HADOOP_EXPORTER_CLUSTER";

/// Content type of the text exposition format
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
