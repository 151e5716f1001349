use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use hadoop_exporter::app::collector::Collector;
use hadoop_exporter::app::ports::JmxSource;
use hadoop_exporter::catalog::Catalog;
use hadoop_exporter::config::Config;
use hadoop_exporter::constants::{DEFAULT_CLUSTER, DEFAULT_CONFIG_PATH, DEFAULT_NAMESPACE};
use hadoop_exporter::engine::{Engine, EngineOptions};
use hadoop_exporter::infra::file_source::FileJmxSource;
use hadoop_exporter::infra::http_client::ReqwestJmxSource;
use hadoop_exporter::services::ServiceRegistry;
use hadoop_exporter::{exposition, logging, metrics, server};

#[derive(Parser)]
#[command(name = "hadoop_exporter")]
#[command(about = "Exports Hadoop-ecosystem JMX beans as Prometheus metrics")]
#[command(version)]
struct Cli {
    /// Path to the exporter configuration
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve /metrics and /health, scraping every target on each request
    Serve,
    /// Scrape every target once and print the exposition text
    Scrape,
    /// Transform a saved /jmx document offline
    Transform {
        /// Service as component/service, e.g. hdfs/namenode
        #[arg(long)]
        service: String,
        /// Saved /jmx JSON document
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_CLUSTER)]
        cluster: String,
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
        /// Host label when the beans carry no tag.Hostname
        #[arg(long)]
        host: Option<String>,
        /// Directory of catalog overrides
        #[arg(long)]
        catalog_dir: Option<PathBuf>,
    },
    /// Print the metric catalog of a service, or list services
    Catalog {
        /// Service as component/service; omit to list all services
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        catalog_dir: Option<PathBuf>,
    },
}

fn split_service(service: &str) -> Result<(&str, &str)> {
    service
        .split_once('/')
        .ok_or_else(|| anyhow!("expected component/service, got '{}'", service))
}

async fn scrape_once(config: &Config) -> Result<()> {
    let source = Arc::new(ReqwestJmxSource::new(config.scrape_timeout())?);
    let collector = Collector::from_config(config, source)?;
    let reports = collector.collect().await;
    for report in &reports {
        match &report.outcome {
            Ok(result) => {
                for failure in &result.failures {
                    warn!("{}: category {} dropped: {}", report.service, failure.category, failure.error);
                }
            }
            Err(e) => warn!("{} ({}): {}", report.service, report.url, e),
        }
    }
    print!(
        "{}",
        exposition::render(
            reports
                .iter()
                .filter_map(|report| report.outcome.as_ref().ok())
                .flat_map(|result| result.families()),
        )?
    );
    Ok(())
}

async fn transform_file(
    service: &str,
    input: PathBuf,
    options: EngineOptions,
    catalog_dir: Option<PathBuf>,
) -> Result<()> {
    let (component, name) = split_service(service)?;
    let profile = ServiceRegistry::new().get(component, name)?;
    let catalog = Catalog::load(component, name, catalog_dir.as_deref())?;
    let common = Catalog::load_common(catalog_dir.as_deref())?;
    let engine = Engine::new(profile, Arc::new(catalog), Arc::new(common), options);

    let snapshot = FileJmxSource::default()
        .fetch(&input.to_string_lossy())
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let result = engine.transform(&snapshot);
    for failure in &result.failures {
        warn!("category {} dropped: {}", failure.category, failure.error);
    }
    print!("{}", exposition::render(result.families())?);
    Ok(())
}

fn print_catalog(service: Option<String>, catalog_dir: Option<PathBuf>) -> Result<()> {
    let registry = ServiceRegistry::new();
    let Some(service) = service else {
        for key in registry.list_services() {
            println!("{key}");
        }
        return Ok(());
    };
    let (component, name) = split_service(&service)?;
    registry.get(component, name)?;
    let catalog = Catalog::load(component, name, catalog_dir.as_deref())?;
    for entry in catalog.entries() {
        println!("{}\t{}\t{}", entry.category, entry.key, entry.description);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = Config::load(&cli.config)?;
            metrics::init_metrics();
            let source = Arc::new(ReqwestJmxSource::new(config.scrape_timeout())?);
            let collector = Arc::new(Collector::from_config(&config, source)?);
            info!(
                "serving {} targets for cluster {}",
                collector.targets().len(),
                config.cluster
            );
            server::start_server(collector, config.listen_addr()?).await?;
        }
        Commands::Scrape => {
            let config = Config::load(&cli.config)?;
            scrape_once(&config).await?;
        }
        Commands::Transform {
            service,
            input,
            cluster,
            namespace,
            host,
            catalog_dir,
        } => {
            let options = EngineOptions {
                cluster,
                namespace,
                host,
            };
            transform_file(&service, input, options, catalog_dir).await?;
        }
        Commands::Catalog {
            service,
            catalog_dir,
        } => print_catalog(service, catalog_dir)?,
    }

    Ok(())
}
