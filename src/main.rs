//! Export FoundationDB cluster status as Prometheus metrics.
//!
//! # Overview
//!
//! `fdb-exporter` reads the JSON document FoundationDB produces for `status json` and
//! translates it into Prometheus metric families: cluster-wide gauges and counters,
//! per-process and per-machine resource usage, per-role statistics (including latency
//! summaries for proxies and storage servers), and backup layer state.
//!
//! # Quick Start
//!
//! Serve metrics for the cluster named by `FDB_CLUSTER_FILE` on port 9161:
//!
//! ```bash
//! fdb-exporter serve --cluster-file /etc/foundationdb/fdb.cluster
//! ```
//!
//! Every scrape of `/metrics` runs `fdbcli --exec "status json"` and performs one fresh
//! collection pass. Nothing is cached between scrapes.
//!
//! # Basic Usage
//!
//! **Collect once from a captured status document:**
//! ```bash
//! fdb-exporter collect --status-file status.json
//! ```
//!
//! **List every metric the exporter can produce:**
//! ```bash
//! fdb-exporter describe
//! ```
//!
//! **Generate a configuration file:**
//! ```bash
//! fdb-exporter init
//! ```
//!
//! # Configuration
//!
//! Settings are read from `exporter.toml` in the working directory, or from the file passed
//! with `--config`:
//!
//! ```toml
//! namespace = "fdb"
//! fetch_timeout = "10s"
//! fdbcli_path = "fdbcli"
//! ```
//!
//! # Failure Behavior
//!
//! A status document that cannot be fetched or parsed fails the scrape with
//! `503 Service Unavailable`. Anything short of that still produces a `200` response:
//! fields missing from the document simply yield no samples, and a metric whose section
//! has an unexpected shape is logged and left out while every other metric is reported.

use fdb_exporter::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Host that writes to the real standard streams.
#[derive(Debug, Clone, Default)]
struct RealHost;

impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }
}

#[tokio::main]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
