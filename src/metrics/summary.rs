//! Summary reconstruction from pre-aggregated latency statistics.
//!
//! FoundationDB never exposes raw observations, only objects such as
//!
//! ```json
//! "commit_latency_statistics": {
//!     "count": 4, "mean": 0.00307, "min": 0.00277, "max": 0.00335,
//!     "p25": 0.00277, "median": 0.00305, "p90": 0.00312,
//!     "p95": 0.00312, "p99": 0.00312, "p99.9": 0.00312
//! }
//! ```
//!
//! From these we rebuild a summary's `_count`, `_sum` and quantile samples. The sum is
//! `mean * count`: the document carries no exact sum, so this is an approximation of it.

use super::family::{MetricFamily, SampleValue};
use crate::Result;
use crate::status::{Path, PathMiss, resolve_at};
use compact_str::CompactString;
use ohno::bail;
use serde_json::Value;

/// Percentile fields of a statistics object and the quantile label each one becomes.
pub const QUANTILES: &[(&str, &str)] = &[
    ("p25", "0.25"),
    ("median", "0.5"),
    ("p90", "0.9"),
    ("p95", "0.95"),
    ("p99", "0.99"),
    ("p99.9", "0.999"),
    ("max", "1"),
];

/// A fully resolved summary, ready to be added to a family.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryParts {
    pub count: f64,

    /// `mean * count`, an approximation of the true sum.
    pub sum: f64,

    /// Quantile label and value, in [`QUANTILES`] order.
    pub quantiles: Vec<(&'static str, f64)>,
}

impl SummaryParts {
    /// Rebuild a summary from the statistics object `stats`, which lives at `at` in the document.
    ///
    /// Returns `Ok(Err(miss))` when `count`, `mean` or any percentile is absent: a summary missing
    /// some of its quantiles would be misleading, so none of it is emitted.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is present but not a number.
    pub fn reconstruct(stats: &Value, at: &Path) -> Result<Result<Self, PathMiss>> {
        let count = match number(stats, at, "count")? {
            Ok(count) => count,
            Err(miss) => return Ok(Err(miss)),
        };

        let mean = match number(stats, at, "mean")? {
            Ok(mean) => mean,
            Err(miss) => return Ok(Err(miss)),
        };

        let mut quantiles = Vec::with_capacity(QUANTILES.len());
        for (field, quantile) in QUANTILES {
            match number(stats, at, field)? {
                Ok(value) => quantiles.push((*quantile, value)),
                Err(miss) => return Ok(Err(miss)),
            }
        }

        Ok(Ok(Self {
            count,
            sum: mean * count,
            quantiles,
        }))
    }

    /// Append `_count`, `_sum` and one sample per quantile, all sharing `label_values`.
    pub fn add_to(self, family: &mut MetricFamily, label_values: &[CompactString]) {
        family.add_part("_count", label_values.to_vec(), None, SampleValue::Number(self.count));
        family.add_part("_sum", label_values.to_vec(), None, SampleValue::Number(self.sum));

        for (quantile, value) in self.quantiles {
            family.add_part("", label_values.to_vec(), Some(quantile), SampleValue::Number(value));
        }
    }
}

fn number(stats: &Value, at: &Path, field: &str) -> Result<Result<f64, PathMiss>> {
    let value = match resolve_at(stats, at, &Path::from([field])) {
        Ok(value) => value,
        Err(miss) => return Ok(Err(miss)),
    };

    match value.as_f64() {
        Some(n) => Ok(Ok(n)),
        None => bail!("{at}.{field}: expected a number, found {value}"),
    }
}
