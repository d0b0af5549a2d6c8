//! Integration tests for the `collect` command.
//!
//! These drive the public `run` entry point against a captured `status json` document, so
//! they need neither a cluster nor `fdbcli`.

use fdb_exporter::Host;

const FIXTURE: &str = "tests/fixtures/status.json";

/// Test host that captures output to in-memory buffers.
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
}

impl TestHost {
    const fn new() -> Self {
        Self {
            output_buf: Vec::new(),
            error_buf: Vec::new(),
        }
    }

    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl std::io::Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl std::io::Write {
        &mut self.error_buf
    }
}

async fn collect(args: &[&str]) -> String {
    let mut host = TestHost::new();
    let mut argv = vec!["fdb-exporter", "collect"];
    argv.extend_from_slice(args);

    let result = fdb_exporter::run(&mut host, argv).await;
    assert!(result.is_ok(), "collect should succeed: {result:?}, stderr: {}", host.error_str());

    host.output_str()
}

fn assert_line(output: &str, line: &str) {
    assert!(output.lines().any(|l| l == line), "missing line '{line}' in output:\n{output}");
}

#[tokio::test]
async fn test_collect_cluster_wide_metrics() {
    let output = collect(&["--status-file", FIXTURE]).await;

    assert_line(&output, "# HELP fdb_generation Cluster generation");
    assert_line(&output, "# TYPE fdb_generation gauge");
    assert_line(&output, "fdb_generation 2");
    assert_line(&output, "fdb_database_available 1");
    assert_line(&output, "fdb_client_quorum_reachable 1");
    assert_line(&output, "fdb_incompatible_connection_count 0");
    assert_line(&output, "fdb_page_cache_storage_hit_rate 0.98");
    assert_line(&output, "# TYPE fdb_workload_bytes_read_total counter");
    assert_line(&output, "fdb_workload_bytes_read_total 5000");
    assert_line(&output, "fdb_workload_op_count_total{op=\"reads\"} 50");
    assert_line(&output, "fdb_workload_transaction_count_total{state=\"conflicted\"} 2");
}

#[tokio::test]
async fn test_collect_per_process_and_machine_metrics() {
    let output = collect(&["--status-file", FIXTURE]).await;

    assert_line(&output, "fdb_memory_used_bytes{id=\"p1\",address=\"10.0.0.1:4500\",class_type=\"storage\"} 50");
    assert_line(&output, "fdb_memory_used_bytes{id=\"p2\",address=\"10.0.0.2:4500\",class_type=\"transaction\"} 70");
    assert_line(&output, "fdb_disk_read_count_total{id=\"p1\",address=\"10.0.0.1:4500\",class_type=\"storage\"} 10");
    assert_line(&output, "fdb_machine_cpu_utilization{id=\"m1\",address=\"10.0.0.1\"} 0.125");

    // p2 reports no disk section at all
    assert!(!output.contains("fdb_disk_busy{id=\"p2\""), "{output}");
}

#[tokio::test]
async fn test_collect_role_presence() {
    let output = collect(&["--status-file", FIXTURE]).await;

    assert_line(&output, "fdb_is_storage{id=\"p1\",address=\"10.0.0.1:4500\",class_type=\"storage\"} 1");
    assert_line(&output, "fdb_is_storage{id=\"p2\",address=\"10.0.0.2:4500\",class_type=\"transaction\"} 0");
    assert_line(&output, "fdb_is_coordinator{id=\"p1\",address=\"10.0.0.1:4500\",class_type=\"storage\"} 1");
    assert_line(&output, "fdb_is_commit_proxy{id=\"p2\",address=\"10.0.0.2:4500\",class_type=\"transaction\"} 1");
    assert_line(&output, "fdb_is_ratekeeper{id=\"p1\",address=\"10.0.0.1:4500\",class_type=\"storage\"} 0");
}

#[tokio::test]
async fn test_collect_by_role_metrics() {
    let output = collect(&["--status-file", FIXTURE]).await;

    assert_line(&output, "fdb_storage_data_version{process=\"p1\",id=\"s1\"} 1000000");
    assert_line(&output, "fdb_storage_queried_bytes_total{process=\"p1\",id=\"s1\"} 1000");
    assert_line(&output, "fdb_log_queue_disk_used_bytes{process=\"p2\",id=\"l1\"} 8");

    assert_line(&output, "# TYPE fdb_storage_read_latency summary");
    assert_line(&output, "fdb_storage_read_latency_count{process=\"p1\",id=\"s1\"} 4");
    assert_line(&output, "fdb_storage_read_latency{process=\"p1\",id=\"s1\",quantile=\"0.99\"} 0.2");
    assert_line(&output, "fdb_storage_read_latency{process=\"p1\",id=\"s1\",quantile=\"1\"} 0.3");
    assert_line(&output, "fdb_commit_proxy_commit_latency_count{process=\"p2\",id=\"c1\"} 10");

    // no process runs the legacy proxy role
    assert!(!output.contains("fdb_proxy_commit_latency"), "{output}");
}

#[tokio::test]
async fn test_collect_info_metrics() {
    let output = collect(&["--status-file", FIXTURE]).await;

    assert_line(&output, "# TYPE fdb_recovery_state_info gauge");
    assert_line(
        &output,
        "fdb_recovery_state_info{active_generations=\"1\",description=\"Recovery complete.\",name=\"fully_recovered\"} 1",
    );
}

#[tokio::test]
async fn test_collect_backup_layer() {
    let output = collect(&["--status-file", FIXTURE]).await;

    assert_line(&output, "fdb_backup_state{tag=\"default\"} 5");
    assert_line(&output, "fdb_backup_running{tag=\"default\"} 1");
    assert_line(&output, "fdb_backup_restorable_lag{tag=\"default\"} 12.5");
    assert_line(&output, "fdb_backup_instance_bytes_sent_total{id=\"agent1\"} 4096");
}

#[tokio::test]
async fn test_collect_is_repeatable() {
    let first = collect(&["--status-file", FIXTURE]).await;
    let second = collect(&["--status-file", FIXTURE]).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_collect_with_custom_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("exporter.toml");
    std::fs::write(&config, "namespace = \"foundation\"\n").unwrap();

    let output = collect(&["--status-file", FIXTURE, "--config", config.to_str().unwrap()]).await;
    assert_line(&output, "foundation_generation 2");
    assert!(!output.contains("fdb_generation"), "{output}");
}

#[tokio::test]
async fn test_collect_unavailable_database() {
    let mut status: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(FIXTURE).unwrap()).unwrap();
    status["client"]["database_status"]["available"] = serde_json::json!(false);
    status["client"]["messages"] = serde_json::json!([{ "name": "unreachable_master", "description": "Unable to locate the master" }]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    std::fs::write(&path, status.to_string()).unwrap();

    let output = collect(&["--status-file", path.to_str().unwrap()]).await;
    assert_line(&output, "fdb_database_available 0");
    assert_line(&output, "fdb_generation 2");
}

#[tokio::test]
async fn test_collect_invalid_document_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    std::fs::write(&path, "{ truncated").unwrap();

    let mut host = TestHost::new();
    let result = fdb_exporter::run(&mut host, ["fdb-exporter", "collect", "--status-file", path.to_str().unwrap()]).await;

    assert!(result.is_err(), "an unparseable document should fail the pass");
    assert!(host.output_buf.is_empty(), "no partial metrics should be written");
    assert!(host.error_str().contains("Could not collect metrics"), "{}", host.error_str());
}
