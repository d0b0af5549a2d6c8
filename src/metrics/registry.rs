use super::descriptor::{ArrayLabeled, Descriptor, MetricDef, ObjectLabeled, Scalar, Summary};
use super::family::MetricKind;
use super::grouping::{Layer, Role};
use super::transform::{ElementFilter, Transform};
use crate::Result;
use crate::status::Path;
use compact_str::{CompactString, format_compact};
use ohno::bail;
use std::collections::HashSet;
use strum::IntoEnumIterator;

const PROCESS_LABELS: &[&str] = &["id", "address", "class_type"];
const MACHINE_LABELS: &[&str] = &["id", "address"];
const ROLE_RECORD_LABELS: &[&str] = &["process", "id"];

/// The fixed, ordered set of descriptors evaluated by every collection pass.
///
/// Global descriptors see the whole document, by-role descriptors see one role's
/// record sequence, and by-layer descriptors see one layer's section.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub global: Vec<Descriptor>,
    pub by_role: Vec<(Role, Vec<Descriptor>)>,
    pub by_layer: Vec<(Layer, Vec<Descriptor>)>,
}

impl Registry {
    /// The exporter's metric set, with every name prefixed by `<namespace>_`.
    #[must_use]
    pub fn standard(namespace: &str) -> Self {
        let b = Builder { namespace };

        let mut global = vec![
            b.scalar("client_quorum_reachable", "Was the exporter able to connect to the coordinators?", ["client", "coordinators", "quorum_reachable"]),
            b.scalar("client_count", "Number of connected clients", ["cluster", "clients", "count"]),
            b.scalar("cluster_controller_timestamp", "Timestamp as reported by the cluster controller", ["cluster", "cluster_controller_timestamp"]),
            b.scalar("average_partition_size_bytes", "Average partition size", ["cluster", "data", "average_partition_size_bytes"]),
            b.scalar("moving_data_highest_priority", "Moving data: highest priority", ["cluster", "data", "moving_data", "highest_priority"]),
            b.scalar("moving_data_in_flight_bytes", "Moving data: bytes in flight", ["cluster", "data", "moving_data", "in_flight_bytes"]),
            b.scalar("moving_data_in_queue_bytes", "Moving data: bytes in queue", ["cluster", "data", "moving_data", "in_queue_bytes"]),
            b.scalar("moving_data_total_written_bytes", "Moving data: total bytes written", ["cluster", "data", "moving_data", "total_written_bytes"]),
            b.scalar("partition_count", "Partition count", ["cluster", "data", "partitions_count"]),
            b.scalar("total_kv_size_bytes", "Total key-value size", ["cluster", "data", "total_kv_size_bytes"]),
            b.scalar("total_disk_used_bytes", "Total disk usage", ["cluster", "data", "total_disk_used_bytes"]),
            b.scalar(
                "least_operating_space_bytes_log_server",
                "Minimum operating space among all log server processes",
                ["cluster", "data", "least_operating_space_bytes_log_server"],
            ),
            b.scalar(
                "least_operating_space_bytes_storage_server",
                "Minimum operating space among all storage server processes",
                ["cluster", "data", "least_operating_space_bytes_storage_server"],
            ),
            b.scalar("database_available", "Is the database available?", ["client", "database_status", "available"]),
            b.scalar("degraded_process_count", "Number of degraded processes", ["cluster", "degraded_processes"]),
            b.scalar("full_replication", "Is the data fully replicated?", ["cluster", "full_replication"]),
            b.scalar("generation", "Cluster generation", ["cluster", "generation"]),
            b.scalar("incompatible_connection_count", "Number of incompatible connections", ["cluster", "incompatible_connections"])
                .with_transform(Transform::Length),
            b.per_machine("machine_cpu_utilization", "CPU utilization by machine", ["cpu", "logical_core_utilization"]),
            b.per_machine("machine_memory_committed_bytes", "Amount of committed (in use) memory by machine", ["memory", "committed_bytes"]),
            b.per_machine("machine_memory_free_bytes", "Amount of free memory by machine", ["memory", "free_bytes"]),
            b.scalar("page_cache_log_hit_rate", "Log page cache hit rate", ["cluster", "page_cache", "log_hit_rate"]),
            b.scalar("page_cache_storage_hit_rate", "Storage page cache hit rate", ["cluster", "page_cache", "storage_hit_rate"]),
            b.per_process("process_cpu_utilization", "CPU utilization", ["cpu", "usage_cores"]),
            b.per_process("disk_free_bytes", "Amount of free disk space", ["disk", "free_bytes"]),
            b.per_process("disk_total_bytes", "Amount of total disk space", ["disk", "total_bytes"]),
            b.per_process("disk_busy", "Disk busyness", ["disk", "busy"]),
            b.per_process("disk_read_count", "Number of disk reads", ["disk", "reads", "counter"]).counter(),
            b.per_process("disk_write_count", "Number of disk writes", ["disk", "writes", "counter"]).counter(),
            b.per_process("memory_available_bytes", "Available memory", ["memory", "available_bytes"]),
            b.per_process("memory_limit_bytes", "Memory limit", ["memory", "limit_bytes"]),
            b.per_process("unused_allocated_memory_bytes", "Unused allocated memory", ["memory", "unused_allocated_memory"]),
            b.per_process("memory_used_bytes", "Used memory", ["memory", "used_bytes"]),
            b.per_process("run_loop_busy", "Run loop busyness", ["run_loop_busy"]),
            b.scalar(
                "batch_performance_limited_by",
                "Reason limiting performance for batch transactions",
                ["cluster", "qos", "batch_performance_limited_by"],
            )
            .info(),
            b.scalar(
                "performance_limited_by",
                "Reason limiting performance for default transactions",
                ["cluster", "qos", "performance_limited_by"],
            )
            .info(),
            b.scalar("recovery_state", "Recovery state", ["cluster", "recovery_state"]).info(),
            b.scalar("workload_bytes_read", "Bytes read", ["cluster", "workload", "bytes", "read", "counter"]).counter(),
            b.scalar("workload_bytes_written", "Bytes written", ["cluster", "workload", "bytes", "written", "counter"]).counter(),
            b.per_key("workload_op_count", "Operation count", &["op"], ["cluster", "workload", "operations"], ["counter"]).counter(),
            b.per_key(
                "workload_transaction_count",
                "Transaction count",
                &["state"],
                ["cluster", "workload", "transactions"],
                ["counter"],
            )
            .counter(),
        ];

        global.extend(Role::iter().map(|role| b.role_presence(role)));

        let by_role = vec![
            (
                Role::Proxy,
                vec![
                    b.role_summary("proxy_commit_latency", "Commit latency statistics", ["commit_latency_statistics"]),
                    b.role_summary("proxy_grv_latency", "GetReadVersion latency statistics", ["grv_latency_statistics", "default"]),
                ],
            ),
            (
                Role::CommitProxy,
                vec![b.role_summary("commit_proxy_commit_latency", "Commit latency statistics", ["commit_latency_statistics"])],
            ),
            (
                Role::GrvProxy,
                vec![b.role_summary(
                    "grv_proxy_grv_latency",
                    "GetReadVersion latency statistics",
                    ["grv_latency_statistics", "default"],
                )],
            ),
            (
                Role::Log,
                vec![
                    b.per_role_record("log_data_version", "Data version", ["data_version"]),
                    b.per_role_record("log_durable_bytes", "Amount of data stored to durable storage", ["durable_bytes", "counter"])
                        .counter(),
                    b.per_role_record("log_input_bytes", "Amount of data received", ["input_bytes", "counter"]).counter(),
                    b.per_role_record("log_kvstore_available_bytes", "Amount of available kvstore bytes", ["kvstore_available_bytes"]),
                    b.per_role_record("log_kvstore_free_bytes", "Amount of free kvstore bytes", ["kvstore_free_bytes"]),
                    b.per_role_record("log_kvstore_total_bytes", "Amount of total kvstore bytes", ["kvstore_total_bytes"]),
                    b.per_role_record("log_kvstore_used_bytes", "Amount of used kvstore bytes", ["kvstore_used_bytes"]),
                    b.per_role_record(
                        "log_queue_disk_available_bytes",
                        "Amount of available disk bytes for the queue",
                        ["queue_disk_available_bytes"],
                    ),
                    b.per_role_record("log_queue_disk_free_bytes", "Amount of free disk bytes for the queue", ["queue_disk_free_bytes"]),
                    b.per_role_record("log_queue_disk_total_bytes", "Amount of total disk bytes for the queue", ["queue_disk_total_bytes"]),
                    b.per_role_record("log_queue_disk_used_bytes", "Amount of used disk bytes for the queue", ["queue_disk_used_bytes"]),
                ],
            ),
            (
                Role::Storage,
                vec![
                    b.per_role_record("storage_queried_bytes", "Amount of bytes queried", ["bytes_queried", "counter"]).counter(),
                    b.per_role_record("storage_data_lag_seconds", "Data lag (seconds)", ["data_lag", "seconds"]),
                    b.per_role_record("storage_data_lag_versions", "Data lag (versions)", ["data_lag", "versions"]),
                    b.per_role_record("storage_data_version", "Highest version", ["data_version"]),
                    b.per_role_record("storage_durability_lag_seconds", "Durability lag (seconds)", ["durability_lag", "seconds"]),
                    b.per_role_record("storage_durability_lag_versions", "Durability lag (versions)", ["durability_lag", "versions"]),
                    b.per_role_record("storage_finished_queries", "Number of finished queries", ["finished_queries", "counter"]).counter(),
                    b.per_role_record("storage_input_bytes", "Amount of input bytes", ["input_bytes", "counter"]).counter(),
                    b.per_role_record("storage_durable_bytes", "Amount of durable bytes", ["durable_bytes", "counter"]).counter(),
                    b.per_role_record("storage_keys_queried", "Number of keys queried", ["keys_queried", "counter"]).counter(),
                    b.per_role_record("storage_kvstore_available_bytes", "Amount of available kvstore bytes", ["kvstore_available_bytes"]),
                    b.per_role_record("storage_kvstore_free_bytes", "Amount of free kvstore bytes", ["kvstore_free_bytes"]),
                    b.per_role_record("storage_kvstore_total_bytes", "Amount of total kvstore bytes", ["kvstore_total_bytes"]),
                    b.per_role_record("storage_kvstore_used_bytes", "Amount of used kvstore bytes", ["kvstore_used_bytes"]),
                    b.per_role_record("storage_local_rate", "Local rate", ["local_rate"]),
                    b.per_role_record(
                        "storage_low_priority_queries",
                        "Number of low priority queries",
                        ["low_priority_queries", "counter"],
                    )
                    .counter(),
                    b.per_role_record("storage_total_queries", "Number of queries", ["total_queries", "counter"]).counter(),
                    b.per_role_record("storage_mutation_bytes", "Amount of bytes mutated", ["mutation_bytes", "counter"]).counter(),
                    b.per_role_record("storage_mutations", "Number of mutations", ["mutations", "counter"]).counter(),
                    b.per_role_record("storage_query_queue_max", "Number of queries in queue (max)", ["query_queue_max"]),
                    b.role_summary("storage_read_latency", "Read latency statistics", ["read_latency_statistics"]),
                    b.per_role_record("storage_log_fetch_count", "Storage log fetches", ["fetches_from_logs", "counter"]).counter(),
                ],
            ),
        ];

        let by_layer = vec![(
            Layer::Backup,
            vec![
                b.per_key(
                    "backup_instance_bytes_sent",
                    "Bytes sent by backup agent instance",
                    &["id"],
                    ["instances"],
                    ["blob_stats", "total", "bytes_sent"],
                )
                .counter(),
                b.per_key(
                    "backup_instance_requests_failed",
                    "Requests failed by backup agent instance",
                    &["id"],
                    ["instances"],
                    ["blob_stats", "total", "requests_failed"],
                )
                .counter(),
                b.per_key(
                    "backup_instance_requests_successful",
                    "Requests successful by backup agent instance",
                    &["id"],
                    ["instances"],
                    ["blob_stats", "total", "requests_successful"],
                )
                .counter(),
                b.per_key(
                    "backup_instance_memory_usage_bytes",
                    "Memory usage by backup agent instance",
                    &["id"],
                    ["instances"],
                    ["memory_usage"],
                ),
                b.per_key("backup_state", "Backup state", &["tag"], ["tags"], ["current_status"])
                    .with_transform(Transform::BackupState),
                b.per_key("backup_running", "Is the backup running?", &["tag"], ["tags"], ["running_backup"]),
                b.per_key("backup_restorable", "Is the backup restorable?", &["tag"], ["tags"], ["running_backup_is_restorable"]),
                b.per_key(
                    "backup_restorable_lag",
                    "Lag from last restorable timestamp",
                    &["tag"],
                    ["tags"],
                    ["last_restorable_seconds_behind"],
                ),
            ],
        )];

        Self { global, by_role, by_layer }
    }

    /// Every descriptor in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.global
            .iter()
            .chain(self.by_role.iter().flat_map(|(_, descriptors)| descriptors))
            .chain(self.by_layer.iter().flat_map(|(_, descriptors)| descriptors))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Check that no two families expose a sample under the same name.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<CompactString> = HashSet::new();

        for descriptor in self.iter() {
            for name in descriptor.describe().exposed_names() {
                if !seen.insert(name.clone()) {
                    bail!("metric '{}' exposes '{name}', which is already exposed by another metric", descriptor.name());
                }
            }
        }

        Ok(())
    }
}

/// Constructs descriptors for the standard registry under one namespace.
struct Builder<'a> {
    namespace: &'a str,
}

impl Builder<'_> {
    fn def(&self, name: &str, documentation: &'static str, kind: MetricKind, label_names: &'static [&'static str]) -> MetricDef {
        MetricDef {
            name: format_compact!("{}_{name}", self.namespace),
            documentation,
            kind,
            label_names,
        }
    }

    fn scalar<const N: usize>(&self, name: &str, documentation: &'static str, value_path: [&str; N]) -> Descriptor {
        Descriptor::Scalar(Scalar {
            def: self.def(name, documentation, MetricKind::Gauge, &[]),
            value_path: Path::from(value_path),
            transform: Transform::Number,
        })
    }

    /// One sample per entry of `cluster.machines`, keyed by machine id.
    fn per_machine<const N: usize>(&self, name: &str, documentation: &'static str, value_path: [&str; N]) -> Descriptor {
        Descriptor::ObjectLabeled(ObjectLabeled {
            def: self.def(name, documentation, MetricKind::Gauge, MACHINE_LABELS),
            root_path: Path::from(["cluster", "machines"]),
            value_path: Path::from(value_path),
            label_paths: vec![Path::from(["address"])],
            key_as_first_label: true,
            transform: Transform::Number,
            filter: ElementFilter::All,
        })
    }

    /// One sample per entry of `cluster.processes`, keyed by process id.
    fn per_process<const N: usize>(&self, name: &str, documentation: &'static str, value_path: [&str; N]) -> Descriptor {
        Descriptor::ObjectLabeled(ObjectLabeled {
            def: self.def(name, documentation, MetricKind::Gauge, PROCESS_LABELS),
            root_path: Path::from(["cluster", "processes"]),
            value_path: Path::from(value_path),
            label_paths: vec![Path::from(["address"]), Path::from(["class_type"])],
            key_as_first_label: true,
            transform: Transform::Number,
            filter: ElementFilter::All,
        })
    }

    /// One sample per entry of a mapping, labeled only by its key.
    fn per_key<const R: usize, const V: usize>(
        &self,
        name: &str,
        documentation: &'static str,
        key_label: &'static [&'static str; 1],
        root_path: [&str; R],
        value_path: [&str; V],
    ) -> Descriptor {
        Descriptor::ObjectLabeled(ObjectLabeled {
            def: self.def(name, documentation, MetricKind::Gauge, key_label),
            root_path: Path::from(root_path),
            value_path: Path::from(value_path),
            label_paths: Vec::new(),
            key_as_first_label: true,
            transform: Transform::Number,
            filter: ElementFilter::All,
        })
    }

    /// One sample per role record in a by-role bucket.
    fn per_role_record<const N: usize>(&self, name: &str, documentation: &'static str, value_path: [&str; N]) -> Descriptor {
        Descriptor::ArrayLabeled(ArrayLabeled {
            def: self.def(name, documentation, MetricKind::Gauge, ROLE_RECORD_LABELS),
            root_path: Path::root(),
            value_path: Path::from(value_path),
            label_paths: vec![Path::from(["process"]), Path::from(["id"])],
            transform: Transform::Number,
            filter: ElementFilter::All,
        })
    }

    /// One summary per role record in a by-role bucket.
    fn role_summary<const N: usize>(&self, name: &str, documentation: &'static str, value_path: [&str; N]) -> Descriptor {
        Descriptor::Summary(Summary {
            def: self.def(name, documentation, MetricKind::Summary, ROLE_RECORD_LABELS),
            root_path: Some(Path::root()),
            value_path: Path::from(value_path),
            label_paths: vec![Path::from(["process"]), Path::from(["id"])],
        })
    }

    /// `is_<role>`: 1 for every process holding `role`, 0 for every other process.
    fn role_presence(&self, role: Role) -> Descriptor {
        self.per_process(&format_compact!("is_{role}"), presence_help(role), ["roles"])
            .with_transform(Transform::HasRole(role))
    }
}

const fn presence_help(role: Role) -> &'static str {
    match role {
        Role::Coordinator => "Is this process a coordinator?",
        Role::Proxy => "Is this process a proxy?",
        Role::CommitProxy => "Is this process a commit proxy?",
        Role::GrvProxy => "Is this process a GetReadVersion proxy?",
        Role::Log => "Is this process a log server?",
        Role::Storage => "Is this process a storage server?",
        Role::ClusterController => "Is this process the cluster controller?",
        Role::Ratekeeper => "Is this process the ratekeeper?",
        Role::DataDistributor => "Is this process the data distributor?",
        Role::Resolver => "Is this process a resolver?",
        Role::Master => "Is this process the master?",
    }
}
