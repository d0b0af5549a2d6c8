use super::Host;
use super::common::{Common, CommonArgs, LogLevel};
use crate::Result;
use crate::exposition::ScrapeState;
use clap::Parser;
use ohno::IntoAppError;
use std::io::Write;

#[derive(Parser, Debug, Default)]
pub struct CollectArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run a single collection pass and write the exposition text to the host's output
pub async fn collect_once<H: Host>(host: &mut H, args: &CollectArgs) -> Result<()> {
    let common = Common::new(&args.common, LogLevel::None)?;
    let source = common.source(&args.common)?;
    let fetch_timeout = common.config.fetch_timeout;

    match ScrapeState::new(common.collector, source, fetch_timeout).scrape().await {
        Ok(text) => {
            host.output().write_all(text.as_bytes()).into_app_err("writing metrics")?;
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "Could not collect metrics: {e}");
            Err(e)
        }
    }
}
