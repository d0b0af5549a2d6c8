//! Command dispatch logic for fdb-exporter

use super::{CollectArgs, DescribeArgs, InitArgs, ServeArgs, collect_once, describe_metrics, init_config, serve_metrics};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "fdb-exporter", author, version, long_about = None, display_name = "fdb-exporter")]
#[command(about = "Export FoundationDB cluster status as Prometheus metrics")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: ExporterSubcommand,
}

#[derive(Subcommand, Debug)]
enum ExporterSubcommand {
    /// Serve metrics over HTTP, fetching a fresh status document on every scrape
    Serve(Box<ServeArgs>),
    /// Run one collection pass and print the metrics
    Collect(Box<CollectArgs>),
    /// List every metric the exporter can produce
    Describe(DescribeArgs),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        ExporterSubcommand::Serve(serve_args) => serve_metrics(host, serve_args).await,
        ExporterSubcommand::Collect(collect_args) => collect_once(host, collect_args).await,
        ExporterSubcommand::Describe(describe_args) => describe_metrics(host, describe_args),
        ExporterSubcommand::Init(init_args) => init_config(host, init_args),
    }
}
