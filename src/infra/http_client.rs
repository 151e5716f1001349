use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::app::ports::JmxSource;
use crate::error::{ExporterError, Result};
use crate::snapshot::Snapshot;

/// Fetches `/jmx` documents over HTTP. No retries; a timeout is a failure.
pub struct ReqwestJmxSource {
    client: reqwest::Client,
}

impl ReqwestJmxSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hadoop_exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JmxSource for ReqwestJmxSource {
    async fn fetch(&self, url: &str) -> Result<Snapshot> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExporterError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().await?;
        debug!("fetched {} bytes from {}", bytes.len(), url);
        Snapshot::from_json_slice(&bytes)
    }
}
