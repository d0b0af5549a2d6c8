//! Setup shared by every command: logging, configuration, registry, and status source.

use super::config::Config;
use crate::Result;
use crate::metrics::{Collector, Registry};
use crate::status::{ClusterFile, StatusSource, copy_cluster_file};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use ohno::bail;

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by every command
#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// Path to configuration file (default is `exporter.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output [default: info for serve, none otherwise]
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Read the status document from this file instead of querying a cluster
    #[arg(long, value_name = "PATH", help_heading = "Status Source")]
    pub status_file: Option<Utf8PathBuf>,

    /// FoundationDB cluster file used to reach the cluster
    #[arg(long, value_name = "PATH", env = "FDB_CLUSTER_FILE", help_heading = "Status Source")]
    pub cluster_file: Option<Utf8PathBuf>,

    /// Copy the cluster file to a temporary location before use
    #[arg(long, help_heading = "Status Source")]
    pub copy_cluster_file: bool,
}

#[derive(Debug)]
pub struct Common {
    pub config: Config,
    pub collector: Collector,
}

impl Common {
    /// Initialize logging, load the configuration, and build the metric registry
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the registry is inconsistent
    pub fn new(args: &CommonArgs, default_log_level: LogLevel) -> Result<Self> {
        Self::init_logging(args.log_level.unwrap_or(default_log_level));

        let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;

        let registry = Registry::standard(&config.namespace);
        registry.validate()?;

        Ok(Self {
            config,
            collector: Collector::new(registry),
        })
    }

    /// Decide where status documents come from
    ///
    /// A status file takes precedence over a cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster file must be copied and cannot be
    pub fn source(&self, args: &CommonArgs) -> Result<StatusSource> {
        if let Some(status_file) = &args.status_file {
            return Ok(StatusSource::File(status_file.clone()));
        }

        let cluster_file = match (&args.cluster_file, args.copy_cluster_file) {
            (Some(cluster_file), true) => Some(copy_cluster_file(cluster_file)?),
            (Some(cluster_file), false) => Some(ClusterFile::new(cluster_file.clone())),
            (None, true) => bail!("--copy-cluster-file requires a cluster file (--cluster-file or FDB_CLUSTER_FILE)"),
            (None, false) => None,
        };

        Ok(StatusSource::Cli {
            fdbcli: self.config.fdbcli_path.clone(),
            cluster_file,
        })
    }

    fn init_logging(log_level: LogLevel) {
        let level = match log_level {
            LogLevel::None => return,
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };

        let env = env_logger::Env::default().filter_or("RUST_LOG", level);

        // a second command in the same process keeps the first logger
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
            .try_init();
    }
}
