use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::fmt;
use core::time::Duration;
use ohno::{IntoAppError, app_err, bail};
use std::fs;
use std::io::Write;
use std::process::Stdio;
use std::sync::Arc;
use tempfile::TempPath;
use tokio::process::Command;

const LOG_TARGET: &str = "    source";

/// Where status documents come from.
///
/// The engine only ever sees the returned bytes; both sources produce the same JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSource {
    /// A previously captured `status json` document on disk.
    File(Utf8PathBuf),

    /// A live cluster, queried through `fdbcli --exec "status json"`.
    Cli {
        fdbcli: Utf8PathBuf,
        cluster_file: Option<ClusterFile>,
    },
}

/// The cluster file handed to `fdbcli`.
///
/// A private copy made by [`copy_cluster_file`] is removed once the last clone is dropped.
#[derive(Debug, Clone)]
pub struct ClusterFile {
    path: Utf8PathBuf,
    copy: Option<Arc<TempPath>>,
}

impl ClusterFile {
    #[must_use]
    pub const fn new(path: Utf8PathBuf) -> Self {
        Self { path, copy: None }
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    #[must_use]
    pub const fn is_copy(&self) -> bool {
        self.copy.is_some()
    }
}

impl PartialEq for ClusterFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ClusterFile {}

impl fmt::Display for ClusterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

impl StatusSource {
    /// Fetch one status document, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document could not be read, the CLI failed, or the timeout elapsed.
    pub async fn fetch(&self, timeout: Duration) -> Result<Vec<u8>> {
        let start_time = std::time::Instant::now();

        let bytes = match tokio::time::timeout(timeout, self.fetch_core()).await {
            Ok(result) => result?,
            Err(_) => bail!("fetching status from {self} timed out after {:.1}s", timeout.as_secs_f64()),
        };

        log::debug!(target: LOG_TARGET, "Fetched {} bytes of status from {self} in {:.3}s", bytes.len(), start_time.elapsed().as_secs_f64());
        Ok(bytes)
    }

    async fn fetch_core(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => tokio::fs::read(path)
                .await
                .into_app_err_with(|| format!("reading status file '{path}'")),
            Self::Cli { fdbcli, cluster_file } => run_fdbcli(fdbcli, cluster_file.as_ref().map(ClusterFile::path)).await,
        }
    }
}

impl fmt::Display for StatusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file '{path}'"),
            Self::Cli {
                cluster_file: Some(cluster_file),
                ..
            } => write!(f, "cluster '{cluster_file}'"),
            Self::Cli { cluster_file: None, .. } => f.write_str("default cluster"),
        }
    }
}

async fn run_fdbcli(fdbcli: &Utf8Path, cluster_file: Option<&Utf8Path>) -> Result<Vec<u8>> {
    let mut command = Command::new(fdbcli);
    if let Some(cluster_file) = cluster_file {
        let _ = command.arg("-C").arg(cluster_file);
    }

    let child = command
        .args(["--exec", "status json"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .into_app_err_with(|| format!("could not spawn '{fdbcli}'"))?;

    let output = child
        .wait_with_output()
        .await
        .into_app_err_with(|| format!("'{fdbcli}' failed to run"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("'{fdbcli} --exec \"status json\"' exited with {}: {}", output.status, stderr.trim());
    }

    Ok(output.stdout)
}

/// Copy the cluster file into a fresh temporary file so the client can rewrite its copy freely.
///
/// The copy is created exclusively under a random name and lives as long as the returned
/// [`ClusterFile`] and its clones.
///
/// # Errors
///
/// Returns an error if the cluster file cannot be read or the copy cannot be written.
pub fn copy_cluster_file(cluster_file: &Utf8Path) -> Result<ClusterFile> {
    let contents = fs::read(cluster_file).into_app_err_with(|| format!("reading cluster file '{cluster_file}'"))?;

    let mut temp = tempfile::Builder::new()
        .prefix("fdb_cluster")
        .tempfile()
        .into_app_err("creating temporary cluster file")?;
    temp.write_all(&contents)
        .into_app_err_with(|| format!("copying cluster file '{cluster_file}'"))?;

    let temp_path = temp.into_temp_path();
    let path = Utf8PathBuf::from_path_buf(temp_path.to_path_buf())
        .map_err(|path| app_err!("temporary cluster file '{}' is not valid UTF-8", path.display()))?;

    log::info!(target: LOG_TARGET, "Using copy of cluster file at '{path}'");
    Ok(ClusterFile {
        path,
        copy: Some(Arc::new(temp_path)),
    })
}
