//! Prometheus text exposition format renderer.

use crate::metrics::{MetricFamily, MetricKind, Sample, SampleValue};
use core::fmt::Write;

/// Content type of the rendered text.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render families in the text exposition format, one HELP and TYPE header per family.
///
/// Families without samples still emit their headers.
#[must_use]
pub fn render(families: &[MetricFamily]) -> String {
    let mut output = String::new();

    for family in families {
        let name = format!("{}{}", family.name, family.kind.name_suffix());
        let _ = writeln!(output, "# HELP {name} {}", escape_help(family.documentation));
        let _ = writeln!(output, "# TYPE {name} {}", family.kind.exposition_type());

        for sample in &family.samples {
            render_sample(&mut output, &name, family.kind, sample);
        }
    }

    output
}

fn render_sample(output: &mut String, name: &str, kind: MetricKind, sample: &Sample) {
    let mut labels: Vec<(&str, &str)> = sample.labels.iter().map(|(key, value)| (*key, value.as_str())).collect();

    let value = match &sample.value {
        SampleValue::Number(n) => *n,
        SampleValue::Info(fields) => {
            debug_assert_eq!(kind, MetricKind::Info, "info values belong to info families");
            labels.extend(fields.iter().map(|(key, value)| (key.as_str(), value.as_str())));
            1.0
        }
    };

    if let Some(quantile) = sample.quantile {
        labels.push(("quantile", quantile));
    }

    let _ = write!(output, "{name}{}", sample.suffix);
    if !labels.is_empty() {
        let rendered: Vec<String> = labels
            .iter()
            .map(|(key, value)| format!("{key}=\"{}\"", escape_label_value(value)))
            .collect();
        let _ = write!(output, "{{{}}}", rendered.join(","));
    }
    let _ = writeln!(output, " {}", format_value(value));
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v.is_sign_positive() { "+Inf" } else { "-Inf" }.to_string()
    } else if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}
