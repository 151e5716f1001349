use async_trait::async_trait;

use crate::error::Result;
use crate::snapshot::Snapshot;

/// Where JMX snapshots come from.
#[async_trait]
pub trait JmxSource: Send + Sync {
    /// Fetches and decodes the `/jmx` document at `url`. A failure here means
    /// the target produces no families this cycle.
    async fn fetch(&self, url: &str) -> Result<Snapshot>;
}
