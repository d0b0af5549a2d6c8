use super::Host;
use super::common::{Common, CommonArgs, LogLevel};
use crate::Result;
use crate::exposition::{ScrapeState, serve};
use clap::Parser;
use core::net::SocketAddr;
use std::io::Write;

/// Conventional port for FoundationDB exporters
const DEFAULT_LISTEN: &str = "0.0.0.0:9161";

#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Address to serve `/metrics` and `/health` on
    #[arg(long, value_name = "ADDR", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,
}

/// Serve scrapes until interrupted; every scrape fetches a fresh document
pub async fn serve_metrics<H: Host>(host: &mut H, args: &ServeArgs) -> Result<()> {
    let common = Common::new(&args.common, LogLevel::Info)?;
    let source = common.source(&args.common)?;

    let _ = writeln!(host.output(), "Serving {} metric families from {source} on http://{}/metrics", common.collector.registry().len(), args.listen);

    let state = ScrapeState::new(common.collector, source, common.config.fetch_timeout);
    serve(args.listen, state).await
}
