//! Static metric catalogs: category -> metric key -> description.
//!
//! Every supported service ships a built-in catalog compiled into the binary.
//! A `catalog_dir` can shadow any of them with `<dir>/<component>/<service>.toml`
//! (or `<dir>/common.toml` for the shared beans). Catalogs are loaded once and
//! shared read-only afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{ExporterError, Result};

/// One `(category, key, description)` triple of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry<'a> {
    pub category: &'a str,
    pub key: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: BTreeMap<String, BTreeMap<String, String>>,
}

impl Catalog {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let categories: BTreeMap<String, BTreeMap<String, String>> = toml::from_str(content)?;
        Ok(Self { categories })
    }

    /// Loads the catalog for `component/service`, preferring an on-disk
    /// override under `dir` over the built-in one.
    pub fn load(component: &str, service: &str, dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = dir {
            let path = dir.join(component).join(format!("{service}.toml"));
            if path.is_file() {
                info!("catalog: loading {}/{} from {}", component, service, path.display());
                return Self::from_toml_str(&fs::read_to_string(&path)?);
            }
        }
        let builtin = builtin(component, service)
            .ok_or_else(|| ExporterError::MissingCatalog(format!("{component}/{service}")))?;
        Self::from_toml_str(builtin)
    }

    /// Loads the shared catalog of JVM and process beans.
    pub fn load_common(dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = dir {
            let path = dir.join("common.toml");
            if path.is_file() {
                info!("catalog: loading common beans from {}", path.display());
                return Self::from_toml_str(&fs::read_to_string(&path)?);
            }
        }
        Self::from_toml_str(COMMON)
    }

    pub fn category(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.categories.get(name)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = CatalogEntry<'_>> {
        self.categories.iter().flat_map(|(category, metrics)| {
            metrics.iter().map(move |(key, description)| CatalogEntry {
                category,
                key,
                description,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const COMMON: &str = include_str!("../catalogs/common.toml");

fn builtin(component: &str, service: &str) -> Option<&'static str> {
    let content = match (component, service) {
        ("hdfs", "namenode") => include_str!("../catalogs/hdfs/namenode.toml"),
        ("hdfs", "journalnode") => include_str!("../catalogs/hdfs/journalnode.toml"),
        ("hbase", "regionserver") => include_str!("../catalogs/hbase/regionserver.toml"),
        ("yarn", "resourcemanager") => include_str!("../catalogs/yarn/resourcemanager.toml"),
        ("yarn", "nodemanager") => include_str!("../catalogs/yarn/nodemanager.toml"),
        ("hive", "hiveserver2") => include_str!("../catalogs/hive/hiveserver2.toml"),
        ("hive", "llapdaemon") => include_str!("../catalogs/hive/llapdaemon.toml"),
        ("mapred", "jobhistory") => include_str!("../catalogs/mapred/jobhistory.toml"),
        _ => return None,
    };
    Some(content)
}
