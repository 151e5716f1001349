use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use hadoop_exporter::app::ports::JmxSource;
use hadoop_exporter::catalog::Catalog;
use hadoop_exporter::engine::family::{MetricFamily, Sample};
use hadoop_exporter::engine::{CycleResult, Engine, EngineOptions};
use hadoop_exporter::exposition;
use hadoop_exporter::infra::file_source::FileJmxSource;
use hadoop_exporter::services::ServiceRegistry;

fn resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources")
}

fn engine(component: &str, service: &str, cluster: &str) -> Result<Engine> {
    let profile = ServiceRegistry::new().get(component, service)?;
    Ok(Engine::new(
        profile,
        Arc::new(Catalog::load(component, service, None)?),
        Arc::new(Catalog::load_common(None)?),
        EngineOptions {
            cluster: cluster.to_string(),
            namespace: "hadoop".to_string(),
            host: None,
        },
    ))
}

async fn transform(component: &str, service: &str, fixture: &str) -> Result<CycleResult> {
    let snapshot = FileJmxSource::new(resources()).fetch(fixture).await?;
    Ok(engine(component, service, "prod")?.transform(&snapshot))
}

fn family<'a>(result: &'a CycleResult, name: &str) -> &'a MetricFamily {
    result
        .family(name)
        .unwrap_or_else(|| panic!("family {name} missing"))
}

/// Value of the gauge sample whose labels end with `tail`.
fn gauge(family: &MetricFamily, tail: &[&str]) -> f64 {
    family
        .samples()
        .iter()
        .find_map(|sample| match sample {
            Sample::Gauge { labels, value } if labels.ends_with(&to_strings(tail)) => Some(*value),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no sample {:?} in {}", tail, family.name()))
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn assert_label_counts(result: &CycleResult) {
    for family in result.families() {
        for sample in family.samples() {
            assert_eq!(
                sample.labels().len(),
                family.schema().len(),
                "label count mismatch in {}",
                family.name()
            );
        }
    }
}

fn category_names(result: &CycleResult) -> Vec<&str> {
    result.categories.iter().map(|c| c.category()).collect()
}

#[tokio::test]
async fn test_namenode_snapshot() -> Result<()> {
    let result = transform("hdfs", "namenode", "namenode.json").await?;
    assert!(result.failures.is_empty());
    assert_label_counts(&result);
    assert_eq!(
        category_names(&result),
        vec![
            "NameNodeActivity",
            "StartupProgress",
            "FSNamesystemState",
            "FSNamesystem",
            "RetryCache",
            "common"
        ]
    );

    let ha = family(&result, "hadoop_hdfs_namenode_fsname_system_ha_state");
    assert_eq!(ha.schema().names(), &["cluster"]);
    assert_eq!(gauge(ha, &["prod"]), 1.0);
    assert_eq!(gauge(family(&result, "hadoop_hdfs_namenode_fsname_system_fs_state"), &["prod"]), 1.0);

    // Padded numeric strings are still numbers.
    assert_eq!(
        gauge(family(&result, "hadoop_hdfs_namenode_fsname_system_total_sync_times"), &["prod"]),
        35.0
    );

    let capacity = family(&result, "hadoop_hdfs_namenode_fsname_system_capacity_bytes");
    assert_eq!(capacity.schema().names(), &["cluster", "mode"]);
    assert_eq!(gauge(capacity, &["Total"]), 1_000_000.0);
    // Not reported by the bean, exported as zero.
    assert_eq!(gauge(capacity, &["UsedNonDFS"]), 0.0);

    let datanodes = family(&result, "hadoop_hdfs_namenode_fsname_system_datanodes_num");
    assert_eq!(gauge(datanodes, &["Live"]), 12.0);
    assert_eq!(gauge(datanodes, &["Dead"]), 1.0);
    assert_eq!(gauge(datanodes, &["Stale"]), 0.0);

    let ops = family(&result, "hadoop_hdfs_namenode_nnactivity_method_ops_total");
    assert_eq!(gauge(ops, &["Transactions"]), 1200.0);
    let avg = family(&result, "hadoop_hdfs_namenode_nnactivity_method_avg_time_milliseconds");
    assert_eq!(gauge(avg, &["Syncs"]), 1.5);
    let operations = family(&result, "hadoop_hdfs_namenode_nnactivity_operations_total");
    assert_eq!(gauge(operations, &["CreateFile"]), 17.0);

    assert_eq!(
        gauge(
            family(&result, "hadoop_hdfs_namenode_startup_process_total_elapsed_time_milliseconds"),
            &["prod"]
        ),
        5321.0
    );
    let phases = family(&result, "hadoop_hdfs_namenode_startup_process_phase_elapsed_time_milliseconds");
    assert_eq!(gauge(phases, &["LoadingFsImage"]), 1200.0);
    assert_eq!(gauge(phases, &["SafeMode"]), 0.0);

    assert_eq!(gauge(family(&result, "hadoop_hdfs_namenode_cache_total"), &["Hit"]), 5.0);
    Ok(())
}

#[tokio::test]
async fn test_namenode_shared_keys_are_exported_once() -> Result<()> {
    let result = transform("hdfs", "namenode", "namenode.json").await?;
    let blocks: Vec<&MetricFamily> = result
        .families()
        .filter(|f| f.name() == "hadoop_hdfs_namenode_fsname_system_blocks_total")
        .collect();
    assert_eq!(blocks.len(), 1);
    assert_eq!(gauge(blocks[0], &["prod"]), 9000.0);
    Ok(())
}

#[tokio::test]
async fn test_common_beans_use_snapshot_host() -> Result<()> {
    let result = transform("hdfs", "namenode", "namenode.json").await?;

    let heap = family(&result, "hadoop_hdfs_namenode_jvm_mem_heap_used_m");
    assert_eq!(heap.schema().names(), &["cluster", "host"]);
    assert_eq!(gauge(heap, &["prod", "nn1.example.com"]), 512.5);

    // The Runtime bean carries no hostname of its own.
    let uptime = family(&result, "hadoop_hdfs_namenode_runtime_uptime");
    assert_eq!(gauge(uptime, &["prod", "nn1.example.com"]), 86_400_000.0);

    let connections = family(&result, "hadoop_hdfs_namenode_rpc_num_open_connections");
    assert_eq!(connections.schema().names(), &["cluster", "host", "port"]);
    assert_eq!(gauge(connections, &["nn1.example.com", "8020"]), 7.0);
    Ok(())
}

#[tokio::test]
async fn test_regionserver_entities_collapse() -> Result<()> {
    let snapshot = FileJmxSource::new(resources())
        .fetch("regionserver.json")
        .await?;
    let result = engine("hbase", "regionserver", "c1")?.transform(&snapshot);
    assert_label_counts(&result);
    assert_eq!(
        category_names(&result),
        vec!["Server", "Regions", "Tables", "Users", "WAL", "common"]
    );

    let reads = family(&result, "hadoop_hbase_regionserver_regions_region_metric_read_request_count");
    assert_eq!(reads.schema().names(), &["cluster", "host", "region"]);
    assert_eq!(reads.samples().len(), 2);
    assert_eq!(gauge(reads, &["c1", "rs1.example.com", "A"]), 10.0);
    assert_eq!(gauge(reads, &["c1", "rs1.example.com", "B"]), 20.0);

    let stores = family(&result, "hadoop_hbase_regionserver_regions_region_metric_store_count");
    assert_eq!(gauge(stores, &["B"]), 3.0);
    assert_eq!(
        gauge(family(&result, "hadoop_hbase_regionserver_regions_num_regions"), &["rs1.example.com"]),
        2.0
    );

    let tables = family(&result, "hadoop_hbase_regionserver_tables_table_metric_read_request_count");
    assert_eq!(tables.samples().len(), 2);
    assert_eq!(gauge(tables, &["users"]), 30.0);
    assert_eq!(gauge(tables, &["rs1.example.com", "user_table_v2"]), 12.0);

    let users = family(&result, "hadoop_hbase_regionserver_users_user_metric_get_count");
    assert_eq!(users.schema().names(), &["cluster", "host", "user"]);
    assert_eq!(gauge(users, &["alice"]), 4.0);
    assert_eq!(gauge(users, &["bob"]), 6.0);

    // Keys the beans did not report are left out.
    let stale = family(&result, "hadoop_hbase_regionserver_regions_region_metric_mem_store_size");
    assert!(stale.samples().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_resourcemanager_nodes_and_root_queue() -> Result<()> {
    let snapshot = FileJmxSource::new(resources())
        .fetch("resourcemanager.json")
        .await?;
    let result = engine("yarn", "resourcemanager", "c1")?.transform(&snapshot);
    assert!(result.failures.is_empty());
    assert_label_counts(&result);

    let containers = family(&result, "hadoop_yarn_resourcemanager_node_containers_total");
    assert_eq!(containers.schema().names(), &["cluster", "host", "version", "rack"]);
    assert_eq!(
        gauge(containers, &["c1", "nm1.example.com", "3.3.6", "/default-rack"]),
        3.0
    );
    assert_eq!(gauge(containers, &["nm2.example.com", "3.3.6", "/default-rack"]), 0.0);

    let state = family(&result, "hadoop_yarn_resourcemanager_node_state");
    assert_eq!(gauge(state, &["nm1.example.com", "3.3.6", "/default-rack"]), 2.0);
    assert_eq!(gauge(state, &["nm2.example.com", "3.3.6", "/default-rack"]), 3.0);

    let running = family(&result, "hadoop_yarn_resourcemanager_running_app_total");
    assert_eq!(running.schema().names(), &["cluster", "elapsed_time"]);
    assert_eq!(running.samples().len(), 4);
    assert_eq!(gauge(running, &["0to60"]), 2.0);
    assert_eq!(gauge(running, &["1440up"]), 0.0);

    // Child queues are not exported.
    let submitted = family(&result, "hadoop_yarn_resourcemanager_apps_submitted");
    assert_eq!(submitted.samples().len(), 1);

    let nms = family(&result, "hadoop_yarn_resourcemanager_nodemanager_total");
    assert_eq!(gauge(nms, &["Active"]), 1.0);
    assert_eq!(gauge(nms, &["Unhealthy"]), 1.0);
    assert_eq!(gauge(family(&result, "hadoop_yarn_resourcemanager_ams_total"), &["Launch"]), 15.0);
    assert_eq!(
        gauge(
            family(&result, "hadoop_yarn_resourcemanager_average_time_milliseconds"),
            &["Launch"]
        ),
        12.5
    );
    Ok(())
}

#[tokio::test]
async fn test_malformed_node_list_only_drops_its_category() -> Result<()> {
    let snapshot = FileJmxSource::new(resources())
        .fetch("resourcemanager_malformed.json")
        .await?;
    let result = engine("yarn", "resourcemanager", "c1")?.transform(&snapshot);

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].category, "RMNMInfo");
    assert_eq!(category_names(&result), vec!["ClusterMetrics"]);
    assert!(result
        .family("hadoop_yarn_resourcemanager_node_containers_total")
        .is_none());
    let nms = family(&result, "hadoop_yarn_resourcemanager_nodemanager_total");
    assert_eq!(gauge(nms, &["Active"]), 3.0);
    Ok(())
}

#[tokio::test]
async fn test_journalnode_histograms() -> Result<()> {
    let snapshot = FileJmxSource::new(resources())
        .fetch("journalnode.json")
        .await?;
    let result = engine("hdfs", "journalnode", "c1")?.transform(&snapshot);
    assert_label_counts(&result);

    let sync60 = family(&result, "hadoop_hdfs_journalnode_sync60s_latency_microseconds");
    match &sync60.samples()[..] {
        [Sample::Histogram {
            labels,
            buckets,
            sum,
        }] => {
            assert_eq!(labels, &to_strings(&["c1", "jn1.example.com"]));
            let bounds: Vec<f64> = buckets.iter().map(|b| b.upper_bound).collect();
            assert_eq!(bounds, vec![0.5, 0.75, 0.95, 0.99, f64::INFINITY]);
            assert!(buckets.iter().all(|b| b.count == 1000.0));
            assert_eq!(*sum, 1740.0);
        }
        other => panic!("unexpected samples {other:?}"),
    }

    let text = exposition::render(result.families())?;
    assert!(text.contains("# TYPE hadoop_hdfs_journalnode_sync60s_latency_microseconds histogram\n"));
    assert!(text.contains(
        "hadoop_hdfs_journalnode_sync300s_latency_microseconds_bucket{cluster=\"c1\",host=\"jn1.example.com\",le=\"+Inf\"} 4000\n"
    ));
    assert!(text.contains(
        "hadoop_hdfs_journalnode_sync300s_latency_microseconds_sum{cluster=\"c1\",host=\"jn1.example.com\"} 100\n"
    ));
    // No 3600s fields in the bean, so no samples and no block.
    assert!(!text.contains("sync3600s"));
    assert!(text.contains("hadoop_hdfs_journalnode_batches_written{cluster=\"c1\",host=\"jn1.example.com\"} 812\n"));
    assert!(text.contains(
        "hadoop_hdfs_journalnode_os_open_file_descriptor_count{cluster=\"c1\",host=\"jn1.example.com\"} 321\n"
    ));
    Ok(())
}

#[tokio::test]
async fn test_repeated_transform_is_identical() -> Result<()> {
    let snapshot = FileJmxSource::new(resources())
        .fetch("regionserver.json")
        .await?;
    let engine = engine("hbase", "regionserver", "c1")?;
    let first = exposition::render(engine.transform(&snapshot).families())?;
    let second = exposition::render(engine.transform(&snapshot).families())?;
    assert_eq!(first, second);
    assert!(!first.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unrelated_snapshot_yields_nothing() -> Result<()> {
    let snapshot = FileJmxSource::new(resources())
        .fetch("journalnode.json")
        .await?;
    let result = engine("yarn", "resourcemanager", "c1")?.transform(&snapshot);
    // Only the shared OperatingSystem bean matches.
    assert_eq!(category_names(&result), vec!["common"]);
    Ok(())
}

#[tokio::test]
async fn test_hiveserver2_producer_labels() -> Result<()> {
    let result = transform("hive", "hiveserver2", "hiveserver2.json").await?;
    assert!(result.failures.is_empty());
    assert_label_counts(&result);

    let sends = family(&result, "hadoop_hive_hiveserver2_record_send_rate");
    assert_eq!(sends.schema().names(), &["cluster", "host", "client_id"]);
    assert_eq!(gauge(sends, &["prod", "hs2.example.com", "hive_hook-1"]), 42.5);

    // The client id carries the text of another category's marker.
    let requests = family(&result, "hadoop_hive_hiveserver2_producer_node_request_rate");
    assert_eq!(requests.schema().names(), &["cluster", "host", "client_id", "node_id"]);
    assert_eq!(requests.samples().len(), 2);
    assert_eq!(gauge(requests, &["hive_hook-1", "node-1"]), 7.0);
    assert_eq!(gauge(requests, &["producer-metrics_audit", "node-2"]), 3.0);

    let bytes = family(&result, "hadoop_hive_hiveserver2_producer_topic_byte_rate");
    assert_eq!(bytes.schema().names(), &["cluster", "host", "client_id", "topic"]);
    assert_eq!(gauge(bytes, &["hive_hook-1", "hive_table_events"]), 2048.0);
    let topic_sends = family(&result, "hadoop_hive_hiveserver2_producer_topic_record_send_rate");
    assert_eq!(gauge(topic_sends, &["hive_table_events"]), 40.0);
    assert_eq!(sends.samples().len(), 1);

    assert_eq!(gauge(family(&result, "hadoop_hive_hiveserver2_count"), &["hive_hook-1"]), 61.0);

    let text = exposition::render(result.families())?;
    assert!(text.contains(
        "hadoop_hive_hiveserver2_producer_node_request_rate{cluster=\"prod\",host=\"hs2.example.com\",client_id=\"producer-metrics_audit\",node_id=\"node-2\"} 3\n"
    ));
    Ok(())
}

#[tokio::test]
async fn test_llapdaemon_executor_threads() -> Result<()> {
    let result = transform("hive", "llapdaemon", "llapdaemon.json").await?;
    assert!(result.failures.is_empty());
    assert_label_counts(&result);

    let cpu = family(
        &result,
        "hadoop_hive_llapdaemon_llapdaemonexecutormetrics_executor_thread_cpu_time",
    );
    assert_eq!(cpu.schema().names(), &["cluster", "host", "cpu"]);
    assert_eq!(cpu.samples().len(), 3);
    assert_eq!(gauge(cpu, &["prod", "llap1.example.com", "cpu0"]), 1500.0);
    assert_eq!(gauge(cpu, &["cpu1"]), 2500.0);
    assert_eq!(gauge(cpu, &["cpu12"]), 900.0);

    let user = family(
        &result,
        "hadoop_hive_llapdaemon_llapdaemonexecutormetrics_executor_thread_user_time",
    );
    assert_eq!(gauge(user, &["cpu0"]), 1200.0);

    let handled = family(
        &result,
        "hadoop_hive_llapdaemon_llapdaemonexecutormetrics_executor_total_requests_handled",
    );
    assert_eq!(handled.schema().names(), &["cluster", "host"]);
    assert_eq!(gauge(handled, &["llap1.example.com"]), 88.0);

    assert_eq!(
        gauge(
            family(&result, "hadoop_hive_llapdaemon_llapdaemoncachemetrics_cache_hit_ratio"),
            &["llap1.example.com"]
        ),
        0.75
    );
    assert_eq!(
        gauge(
            family(&result, "hadoop_hive_llapdaemon_llapdaemonjvmmetrics_llap_daemon_direct_buffer_count"),
            &["llap1.example.com"]
        ),
        16.0
    );
    Ok(())
}
