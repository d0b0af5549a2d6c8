use super::Host;
use super::common::{Common, CommonArgs, LogLevel};
use crate::Result;
use crate::metrics::MetricFamily;
use clap::Parser;
use ohno::IntoAppError;
use std::io::Write;

#[derive(Parser, Debug, Default)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// List every registered metric family: name, kind, labels, and help text
pub fn describe_metrics<H: Host>(host: &mut H, args: &DescribeArgs) -> Result<()> {
    let common = Common::new(&args.common, LogLevel::None)?;

    let mut output = host.output();
    for family in common.collector.describe() {
        writeln!(output, "{}", describe_line(&family)).into_app_err("writing metric descriptions")?;
    }

    Ok(())
}

fn describe_line(family: &MetricFamily) -> String {
    format!(
        "{} {} [{}] {}",
        family.name,
        family.kind,
        family.label_names.join(","),
        family.documentation
    )
}
