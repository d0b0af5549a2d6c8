//! Translation of status documents into metric families
//!
//! This module turns one parsed status document into a complete set of Prometheus metric
//! families. It is pure computation over an in-memory tree: no I/O, no shared state between
//! passes, and no suspension points.
//!
//! # Implementation Model
//!
//! Each metric is described by a [`Descriptor`], a closed set of variants:
//! - **Scalar**: one value at a fixed path, no labels
//! - **`ArrayLabeled`**: one sample per element of a sequence
//! - **`ObjectLabeled`**: one sample per entry of a mapping, optionally labeled by its key
//! - **Summary**: `_count`, `_sum` and quantile samples rebuilt from a statistics object
//!
//! Descriptors carry their value [`Transform`] and [`ElementFilter`] as plain data. The
//! [`Registry`] holds them in a fixed order, grouped by the scope they evaluate against:
//! the whole document, one role's records ([`RoleIndex`]), or one layer's section
//! ([`LayerIndex`]).
//!
//! The [`Collector`] runs a pass. Every descriptor is evaluated in isolation: a field that is
//! missing simply yields no sample, and a descriptor that fails outright is logged and
//! skipped without affecting the others.

mod collector;
mod descriptor;
mod family;
mod grouping;
mod registry;
mod summary;
mod transform;

pub use collector::Collector;
pub use descriptor::{ArrayLabeled, Descriptor, MetricDef, ObjectLabeled, Scalar, Summary};
pub use family::{MetricFamily, MetricKind, Sample, SampleValue};
pub use grouping::{Layer, LayerIndex, Role, RoleIndex};
pub use registry::Registry;
pub use summary::{QUANTILES, SummaryParts};
pub use transform::{BACKUP_STATES, ElementFilter, Transform, label_text};
