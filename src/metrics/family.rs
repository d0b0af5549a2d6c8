use compact_str::CompactString;
use strum::{Display, EnumIter, IntoStaticStr};

/// The exposition type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MetricKind {
    Gauge,
    Counter,
    Info,
    Summary,
}

impl MetricKind {
    /// Suffix appended to the family name for its exposed samples and headers.
    #[must_use]
    pub const fn name_suffix(self) -> &'static str {
        match self {
            Self::Counter => "_total",
            Self::Info => "_info",
            Self::Gauge | Self::Summary => "",
        }
    }

    /// The type keyword used in the text exposition format.
    #[must_use]
    pub const fn exposition_type(self) -> &'static str {
        match self {
            Self::Gauge | Self::Info => "gauge",
            Self::Counter => "counter",
            Self::Summary => "summary",
        }
    }
}

/// The value carried by a single sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Number(f64),

    /// String-valued fields of an info metric; exposed as extra labels with value 1.
    Info(Vec<(CompactString, CompactString)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Extra name suffix, used by summaries for `_count` and `_sum`.
    pub suffix: &'static str,

    /// Label values paired with the family's label names, in declaration order.
    pub labels: Vec<(&'static str, CompactString)>,

    /// The `quantile` label of a summary's percentile samples.
    pub quantile: Option<&'static str>,

    pub value: SampleValue,
}

impl Sample {
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub const fn number(&self) -> Option<f64> {
        match self.value {
            SampleValue::Number(n) => Some(n),
            SampleValue::Info(_) => None,
        }
    }
}

/// A named group of samples sharing one kind and label schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: CompactString,
    pub documentation: &'static str,
    pub kind: MetricKind,
    pub label_names: &'static [&'static str],
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// Create a family with no samples.
    #[must_use]
    pub const fn new(
        name: CompactString,
        documentation: &'static str,
        kind: MetricKind,
        label_names: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            documentation,
            kind,
            label_names,
            samples: Vec::new(),
        }
    }

    /// Add a sample whose label values line up with [`Self::label_names`].
    pub fn add(&mut self, label_values: Vec<CompactString>, value: SampleValue) {
        self.add_part("", label_values, None, value);
    }

    /// Add one part of a summary: a `_count`/`_sum` sample or a quantile sample.
    pub fn add_part(&mut self, suffix: &'static str, label_values: Vec<CompactString>, quantile: Option<&'static str>, value: SampleValue) {
        debug_assert_eq!(
            label_values.len(),
            self.label_names.len(),
            "label values for '{}' must match its label names",
            self.name
        );

        self.samples.push(Sample {
            suffix,
            labels: self.label_names.iter().copied().zip(label_values).collect(),
            quantile,
            value,
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Names under which this family's samples are exposed.
    #[must_use]
    pub fn exposed_names(&self) -> Vec<CompactString> {
        let base = compact_str::format_compact!("{}{}", self.name, self.kind.name_suffix());
        match self.kind {
            MetricKind::Summary => vec![
                compact_str::format_compact!("{base}_count"),
                compact_str::format_compact!("{base}_sum"),
                base,
            ],
            MetricKind::Gauge | MetricKind::Counter | MetricKind::Info => vec![base],
        }
    }
}
