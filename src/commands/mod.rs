//! Command-line interface and orchestration for fdb-exporter
//!
//! This module implements the CLI commands and wires the status sources, the metric
//! registry, and the exposition layer together.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **serve**: Serve `/metrics` over HTTP; every scrape fetches a fresh status document
//!   and runs one collection pass over it
//! - **collect**: Run a single pass and print the exposition text
//! - **describe**: List every metric family the registry declares
//! - **init**: Generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes to the
//! appropriate command handler. The `common` module performs the shared setup: it
//! initializes logging, loads the TOML configuration, builds and validates the registry,
//! and decides whether documents come from a status file or from `fdbcli`.

mod collect;
mod common;
mod config;
mod describe;
mod host;
mod init;
mod run;
mod serve;

pub use collect::{CollectArgs, collect_once};
pub use common::{CommonArgs, LogLevel};
pub use config::Config;
pub use describe::{DescribeArgs, describe_metrics};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use serve::{ServeArgs, serve_metrics};
