use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::sync::LazyLock;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "exporter.toml";

static METRIC_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*$").expect("metric name pattern is valid"));

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Prefix applied to every exported metric name
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Upper bound on a single status fetch
    #[serde(default = "default_fetch_timeout", with = "humantime_serde")]
    pub fetch_timeout: Duration,

    /// The `fdbcli` binary used to query a live cluster
    #[serde(default = "default_fdbcli_path")]
    pub fdbcli_path: Utf8PathBuf,
}

fn default_namespace() -> String {
    "fdb".to_string()
}

const fn default_fetch_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_fdbcli_path() -> Utf8PathBuf {
    Utf8PathBuf::from("fdbcli")
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `exporter.toml` in `base_dir` is used if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds invalid values
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is not a valid metric name prefix or the timeout is zero
    pub fn validate(&self) -> Result<()> {
        if !is_metric_name(&self.namespace) {
            return Err(app_err!(
                "namespace must start with a letter or underscore and contain only letters, digits and underscores, got '{}'",
                self.namespace
            ));
        }

        if self.fetch_timeout.is_zero() {
            return Err(app_err!("fetch_timeout must be greater than zero"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

fn is_metric_name(name: &str) -> bool {
    METRIC_NAME.is_match(name)
}
