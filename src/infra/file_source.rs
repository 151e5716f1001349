use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::app::ports::JmxSource;
use crate::error::Result;
use crate::snapshot::Snapshot;

/// Reads saved `/jmx` documents from disk. The target URL is a path,
/// optionally prefixed with `file://`, resolved against `root`.
pub struct FileJmxSource {
    root: PathBuf,
}

impl FileJmxSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for FileJmxSource {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl JmxSource for FileJmxSource {
    async fn fetch(&self, url: &str) -> Result<Snapshot> {
        let bytes = tokio::fs::read(self.resolve(url)).await?;
        Snapshot::from_json_slice(&bytes)
    }
}
