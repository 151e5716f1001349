use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_CLUSTER, DEFAULT_LISTEN, DEFAULT_NAMESPACE, DEFAULT_SCRAPE_TIMEOUT_SECS, ENV_CLUSTER,
    ENV_LISTEN,
};
use crate::error::{ExporterError, Result};
use crate::services::ServiceRegistry;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_cluster")]
    pub cluster: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_timeout")]
    pub scrape_timeout_secs: u64,
    /// Directory of `<component>/<service>.toml` catalogs shadowing the built-in ones.
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// One daemon to scrape.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TargetConfig {
    pub component: String,
    pub service: String,
    /// Full URL of the daemon's `/jmx` endpoint.
    pub url: String,
    /// Host label used when the daemon's beans carry no `tag.Hostname`.
    #[serde(default)]
    pub host: Option<String>,
}

impl TargetConfig {
    pub fn key(&self) -> String {
        format!("{}/{}", self.component, self.service)
    }
}

fn default_cluster() -> String {
    DEFAULT_CLUSTER.to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_SCRAPE_TIMEOUT_SECS
}

impl Config {
    /// Reads `path`, applies `.env` and environment overrides, and validates.
    pub fn load(path: &Path) -> Result<Self> {
        dotenv::dotenv().ok();

        let content = fs::read_to_string(path).map_err(|e| {
            ExporterError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(listen) = std::env::var(ENV_LISTEN) {
            self.listen = listen;
        }
        if let Ok(cluster) = std::env::var(ENV_CLUSTER) {
            self.cluster = cluster;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(ExporterError::Config("no [[targets]] configured".into()));
        }
        if self.namespace.is_empty() {
            return Err(ExporterError::Config("namespace must not be empty".into()));
        }
        if self.scrape_timeout_secs == 0 {
            return Err(ExporterError::Config(
                "scrape_timeout_secs must be greater than zero".into(),
            ));
        }
        self.listen_addr()?;

        let registry = ServiceRegistry::new();
        for target in &self.targets {
            registry
                .get(&target.component, &target.service)
                .map_err(|_| ExporterError::Config(format!("unknown service '{}'", target.key())))?;
            if target.url.is_empty() {
                return Err(ExporterError::Config(format!(
                    "target '{}' has no url",
                    target.key()
                )));
            }
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| ExporterError::Config(format!("invalid listen address '{}': {}", self.listen, e)))
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }
}
