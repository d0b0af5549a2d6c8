use super::family::{MetricFamily, MetricKind, SampleValue};
use super::summary::SummaryParts;
use super::transform::{ElementFilter, Transform, label_text};
use crate::Result;
use crate::status::{Path, PathMiss, resolve, resolve_at};
use compact_str::CompactString;
use ohno::bail;
use serde_json::Value;

const LOG_TARGET: &str = "descriptor";

/// Identity of a metric family: what [`Descriptor::describe`] declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDef {
    pub name: CompactString,
    pub documentation: &'static str,
    pub kind: MetricKind,
    pub label_names: &'static [&'static str],
}

impl MetricDef {
    #[must_use]
    pub fn family(&self) -> MetricFamily {
        MetricFamily::new(self.name.clone(), self.documentation, self.kind, self.label_names)
    }
}

/// A single value with no labels.
#[derive(Debug, Clone)]
pub struct Scalar {
    pub def: MetricDef,
    pub value_path: Path,
    pub transform: Transform,
}

/// One sample per element of the sequence at `root_path`.
#[derive(Debug, Clone)]
pub struct ArrayLabeled {
    pub def: MetricDef,
    pub root_path: Path,
    pub value_path: Path,
    pub label_paths: Vec<Path>,
    pub transform: Transform,
    pub filter: ElementFilter,
}

/// One sample per entry of the mapping at `root_path`, in document order.
#[derive(Debug, Clone)]
pub struct ObjectLabeled {
    pub def: MetricDef,
    pub root_path: Path,
    pub value_path: Path,
    pub label_paths: Vec<Path>,

    /// Use the entry's key as the first label value; `label_names[0]` names it.
    pub key_as_first_label: bool,
    pub transform: Transform,
    pub filter: ElementFilter,
}

/// A summary rebuilt from a statistics object.
#[derive(Debug, Clone)]
pub struct Summary {
    pub def: MetricDef,

    /// `None` for a single summary at `value_path`; otherwise one summary per element of
    /// the sequence at this path (the root path addresses the scope itself).
    pub root_path: Option<Path>,
    pub value_path: Path,
    pub label_paths: Vec<Path>,
}

/// A rule turning part of a scope into one metric family.
#[derive(Debug, Clone)]
pub enum Descriptor {
    Scalar(Scalar),
    ArrayLabeled(ArrayLabeled),
    ObjectLabeled(ObjectLabeled),
    Summary(Summary),
}

impl Descriptor {
    #[must_use]
    pub const fn def(&self) -> &MetricDef {
        match self {
            Self::Scalar(d) => &d.def,
            Self::ArrayLabeled(d) => &d.def,
            Self::ObjectLabeled(d) => &d.def,
            Self::Summary(d) => &d.def,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.def().name
    }

    /// Declare the family without looking at any data.
    #[must_use]
    pub fn describe(&self) -> MetricFamily {
        self.def().family()
    }

    /// Evaluate against `scope`: the document root, a role's record sequence, or a layer section.
    ///
    /// Fields that do not resolve produce no sample; they are not errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the scope has an unexpected shape, such as a non-numeric value
    /// where a number is required.
    pub fn collect(&self, scope: &Value) -> Result<MetricFamily> {
        match self {
            Self::Scalar(d) => d.collect(scope),
            Self::ArrayLabeled(d) => d.collect(scope),
            Self::ObjectLabeled(d) => d.collect(scope),
            Self::Summary(d) => d.collect(scope),
        }
    }

    /// Switch the family to a counter.
    #[must_use]
    pub fn counter(mut self) -> Self {
        self.def_mut().kind = MetricKind::Counter;
        self
    }

    /// Switch the family to an info metric whose fields come from the resolved mapping.
    #[must_use]
    pub fn info(self) -> Self {
        let mut descriptor = self.with_transform(Transform::InfoFields);
        descriptor.def_mut().kind = MetricKind::Info;
        descriptor
    }

    /// Replace the value transform. Summaries have no transform and are returned unchanged.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        match &mut self {
            Self::Scalar(d) => d.transform = transform,
            Self::ArrayLabeled(d) => d.transform = transform,
            Self::ObjectLabeled(d) => d.transform = transform,
            Self::Summary(_) => {}
        }
        self
    }

    /// Only sample elements matching `filter`. Scalars and summaries are returned unchanged.
    #[must_use]
    pub fn with_filter(mut self, filter: ElementFilter) -> Self {
        match &mut self {
            Self::ArrayLabeled(d) => d.filter = filter,
            Self::ObjectLabeled(d) => d.filter = filter,
            Self::Scalar(_) | Self::Summary(_) => {}
        }
        self
    }

    const fn def_mut(&mut self) -> &mut MetricDef {
        match self {
            Self::Scalar(d) => &mut d.def,
            Self::ArrayLabeled(d) => &mut d.def,
            Self::ObjectLabeled(d) => &mut d.def,
            Self::Summary(d) => &mut d.def,
        }
    }
}

impl Scalar {
    fn collect(&self, scope: &Value) -> Result<MetricFamily> {
        let mut family = self.def.family();

        match resolve(scope, &self.value_path) {
            Ok(value) => family.add(Vec::new(), self.transform.apply(value, &self.value_path)?),
            Err(miss) => {
                if let Some(value) = self.transform.on_missing() {
                    family.add(Vec::new(), value);
                }
                log_miss(&self.def, &miss);
            }
        }

        Ok(family)
    }
}

impl ArrayLabeled {
    fn collect(&self, scope: &Value) -> Result<MetricFamily> {
        let mut family = self.def.family();

        let Some(items) = sequence_at(&self.def, scope, &self.root_path)? else {
            return Ok(family);
        };

        for (index, item) in items.iter().enumerate() {
            if !self.filter.matches(item) {
                continue;
            }

            let base = self.root_path.child(index);
            let Some(value) = sample_value(&self.def, item, &base, &self.value_path, self.transform)? else {
                continue;
            };

            family.add(label_values(&self.def, item, &base, &self.label_paths), value);
        }

        Ok(family)
    }
}

impl ObjectLabeled {
    fn collect(&self, scope: &Value) -> Result<MetricFamily> {
        let mut family = self.def.family();

        let entries = match resolve(scope, &self.root_path) {
            Ok(Value::Object(entries)) => entries,
            Ok(other) => bail!("{}: {} is not a mapping: {}", self.def.name, self.root_path, abbreviate(other)),
            Err(miss) => {
                log_miss(&self.def, &miss);
                return Ok(family);
            }
        };

        for (key, entry) in entries {
            if !self.filter.matches(entry) {
                continue;
            }

            let base = self.root_path.child(key.as_str());
            let Some(value) = sample_value(&self.def, entry, &base, &self.value_path, self.transform)? else {
                continue;
            };

            let mut labels = Vec::with_capacity(self.def.label_names.len());
            if self.key_as_first_label {
                labels.push(CompactString::from(key.as_str()));
            }
            labels.extend(label_values(&self.def, entry, &base, &self.label_paths));

            family.add(labels, value);
        }

        Ok(family)
    }
}

impl Summary {
    fn collect(&self, scope: &Value) -> Result<MetricFamily> {
        let mut family = self.def.family();

        let Some(root_path) = &self.root_path else {
            if let Some(parts) = self.reconstruct(scope, &Path::root())? {
                parts.add_to(&mut family, &[]);
            }
            return Ok(family);
        };

        let Some(items) = sequence_at(&self.def, scope, root_path)? else {
            return Ok(family);
        };

        for (index, item) in items.iter().enumerate() {
            let base = root_path.child(index);
            if let Some(parts) = self.reconstruct(item, &base)? {
                parts.add_to(&mut family, &label_values(&self.def, item, &base, &self.label_paths));
            }
        }

        Ok(family)
    }

    fn reconstruct(&self, element: &Value, base: &Path) -> Result<Option<SummaryParts>> {
        let stats = match resolve_at(element, base, &self.value_path) {
            Ok(stats) => stats,
            Err(miss) => {
                log_miss(&self.def, &miss);
                return Ok(None);
            }
        };

        match SummaryParts::reconstruct(stats, &base.join(&self.value_path))? {
            Ok(parts) => Ok(Some(parts)),
            Err(miss) => {
                log_miss(&self.def, &miss);
                Ok(None)
            }
        }
    }
}

/// Resolve `root_path` to a sequence. A miss yields `None`; any other shape is an error.
fn sequence_at<'a>(def: &MetricDef, scope: &'a Value, root_path: &Path) -> Result<Option<&'a [Value]>> {
    match resolve(scope, root_path) {
        Ok(Value::Array(items)) => Ok(Some(items)),
        Ok(other) => bail!("{}: {} is not a sequence: {}", def.name, root_path, abbreviate(other)),
        Err(miss) => {
            log_miss(def, &miss);
            Ok(None)
        }
    }
}

fn sample_value(
    def: &MetricDef,
    element: &Value,
    base: &Path,
    value_path: &Path,
    transform: Transform,
) -> Result<Option<SampleValue>> {
    match resolve_at(element, base, value_path) {
        Ok(value) => transform.apply(value, &base.join(value_path)).map(Some),
        Err(miss) => {
            log_miss(def, &miss);
            Ok(transform.on_missing())
        }
    }
}

/// One value per label path; labels that do not resolve become empty strings.
fn label_values(def: &MetricDef, element: &Value, base: &Path, label_paths: &[Path]) -> Vec<CompactString> {
    label_paths
        .iter()
        .map(|label_path| match resolve_at(element, base, label_path) {
            Ok(value) => label_text(value),
            Err(miss) => {
                log_miss(def, &miss);
                CompactString::default()
            }
        })
        .collect()
}

fn log_miss(def: &MetricDef, miss: &PathMiss) {
    log::debug!(target: LOG_TARGET, "{}: {miss}", def.name);
}

fn abbreviate(value: &Value) -> CompactString {
    const MAX_LEN: usize = 64;

    let text = value.to_string();
    match text.char_indices().nth(MAX_LEN) {
        Some((cut, _)) => compact_str::format_compact!("{}...", text.get(..cut).unwrap_or_default()),
        None => text.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::grouping::Role;
    use serde_json::json;

    fn def(name: &str, kind: MetricKind, label_names: &'static [&'static str]) -> MetricDef {
        MetricDef {
            name: name.into(),
            documentation: "Test metric",
            kind,
            label_names,
        }
    }

    fn numbers(family: &MetricFamily) -> Vec<f64> {
        family.samples.iter().filter_map(crate::metrics::family::Sample::number).collect()
    }

    fn processes() -> Value {
        json!({
            "cluster": {
                "processes": {
                    "p1": {
                        "address": "10.0.0.1:4500",
                        "class_type": "storage",
                        "memory": { "used_bytes": 100 },
                        "roles": [{ "role": "storage" }]
                    },
                    "p2": {
                        "address": "10.0.0.2:4500",
                        "memory": { "used_bytes": 200 },
                        "roles": [{ "role": "log" }, { "role": "coordinator" }]
                    },
                    "p3": {
                        "address": "10.0.0.3:4500",
                        "class_type": "log",
                        "memory": {},
                        "roles": []
                    },
                }
            }
        })
    }

    fn per_process(name: &str, value_path: Path) -> Descriptor {
        Descriptor::ObjectLabeled(ObjectLabeled {
            def: def(name, MetricKind::Gauge, &["id", "address", "class_type"]),
            root_path: Path::from(["cluster", "processes"]),
            value_path,
            label_paths: vec![Path::from(["address"]), Path::from(["class_type"])],
            key_as_first_label: true,
            transform: Transform::Number,
            filter: ElementFilter::All,
        })
    }

    #[test]
    fn test_scalar_emits_one_unlabeled_sample() {
        let descriptor = Descriptor::Scalar(Scalar {
            def: def("fdb_generation", MetricKind::Gauge, &[]),
            value_path: Path::from(["cluster", "generation"]),
            transform: Transform::Number,
        });

        let family = descriptor.collect(&json!({ "cluster": { "generation": 7 } })).unwrap();
        assert_eq!(family.len(), 1);
        assert!(family.samples[0].labels.is_empty());
        assert_eq!(numbers(&family), vec![7.0]);
    }

    #[test]
    fn test_scalar_missing_value_is_empty_family() {
        let descriptor = Descriptor::Scalar(Scalar {
            def: def("fdb_generation", MetricKind::Gauge, &[]),
            value_path: Path::from(["cluster", "generation"]),
            transform: Transform::Number,
        });

        let family = descriptor.collect(&json!({ "cluster": {} })).unwrap();
        assert!(family.is_empty());
        assert_eq!(family.name, "fdb_generation");
    }

    #[test]
    fn test_scalar_wrong_type_is_an_error() {
        let descriptor = Descriptor::Scalar(Scalar {
            def: def("fdb_generation", MetricKind::Gauge, &[]),
            value_path: Path::from(["cluster", "generation"]),
            transform: Transform::Number,
        });

        assert!(descriptor.collect(&json!({ "cluster": { "generation": "seven" } })).is_err());
    }

    #[test]
    fn test_array_skips_failing_element_and_keeps_order() {
        let descriptor = Descriptor::ArrayLabeled(ArrayLabeled {
            def: def("fdb_log_data_version", MetricKind::Gauge, &["process", "id"]),
            root_path: Path::root(),
            value_path: Path::from(["data_version"]),
            label_paths: vec![Path::from(["process"]), Path::from(["id"])],
            transform: Transform::Number,
            filter: ElementFilter::All,
        });

        let records = json!([
            { "process": "p1", "id": "a", "data_version": 1 },
            { "process": "p2", "id": "b" },
            { "process": "p3", "id": "c", "data_version": 3 },
            { "process": "p4", "id": "d", "data_version": 4 },
        ]);

        let family = descriptor.collect(&records).unwrap();
        assert_eq!(family.len(), 3);
        assert_eq!(numbers(&family), vec![1.0, 3.0, 4.0]);
        let ids: Vec<_> = family.samples.iter().filter_map(|s| s.label("id")).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_array_missing_label_becomes_empty_string() {
        let descriptor = Descriptor::ArrayLabeled(ArrayLabeled {
            def: def("fdb_log_data_version", MetricKind::Gauge, &["process", "id"]),
            root_path: Path::root(),
            value_path: Path::from(["data_version"]),
            label_paths: vec![Path::from(["process"]), Path::from(["id"])],
            transform: Transform::Number,
            filter: ElementFilter::All,
        });

        let family = descriptor.collect(&json!([{ "process": "p1", "data_version": 1 }])).unwrap();
        let sample = &family.samples[0];
        assert_eq!(sample.labels.len(), 2);
        assert_eq!(sample.label("process"), Some("p1"));
        assert_eq!(sample.label("id"), Some(""));
    }

    #[test]
    fn test_array_missing_root_is_empty_family() {
        let descriptor = Descriptor::ArrayLabeled(ArrayLabeled {
            def: def("fdb_message", MetricKind::Gauge, &["name"]),
            root_path: Path::from(["cluster", "messages"]),
            value_path: Path::from(["severity"]),
            label_paths: vec![Path::from(["name"])],
            transform: Transform::Number,
            filter: ElementFilter::All,
        });

        assert!(descriptor.collect(&json!({ "cluster": {} })).unwrap().is_empty());
        assert!(descriptor.collect(&json!({ "cluster": { "messages": {} } })).is_err());
    }

    #[test]
    fn test_array_filter() {
        let descriptor = Descriptor::ArrayLabeled(ArrayLabeled {
            def: def("fdb_worker_busy", MetricKind::Gauge, &["name"]),
            root_path: Path::root(),
            value_path: Path::from(["busy"]),
            label_paths: vec![Path::from(["name"])],
            transform: Transform::Number,
            filter: ElementFilter::All,
        })
        .with_filter(ElementFilter::Equals(Path::from(["kind"]), "storage".into()));

        let family = descriptor
            .collect(&json!([
                { "name": "a", "kind": "storage", "busy": 0.5 },
                { "name": "b", "kind": "log", "busy": 0.7 },
            ]))
            .unwrap();

        assert_eq!(family.len(), 1);
        assert_eq!(family.samples[0].label("name"), Some("a"));
    }

    #[test]
    fn test_object_uses_key_as_first_label() {
        let family = per_process("fdb_memory_used_bytes", Path::from(["memory", "used_bytes"]))
            .collect(&processes())
            .unwrap();

        assert_eq!(family.len(), 2);
        for sample in &family.samples {
            assert_eq!(sample.labels[0].0, "id");
        }
        assert_eq!(family.samples[0].label("id"), Some("p1"));
        assert_eq!(family.samples[0].label("class_type"), Some("storage"));
        assert_eq!(family.samples[1].label("id"), Some("p2"));
        assert_eq!(family.samples[1].label("class_type"), Some(""));
        assert_eq!(numbers(&family), vec![100.0, 200.0]);
    }

    #[test]
    fn test_object_without_key_label() {
        let descriptor = Descriptor::ObjectLabeled(ObjectLabeled {
            def: def("fdb_workload_op_count", MetricKind::Counter, &["op"]),
            root_path: Path::from(["operations"]),
            value_path: Path::from(["counter"]),
            label_paths: vec![Path::from(["name"])],
            key_as_first_label: false,
            transform: Transform::Number,
            filter: ElementFilter::All,
        });

        let family = descriptor
            .collect(&json!({ "operations": { "reads": { "name": "r", "counter": 5 } } }))
            .unwrap();
        assert_eq!(family.samples[0].label("op"), Some("r"));
    }

    #[test]
    fn test_role_presence_samples_every_process() {
        let is_storage = per_process("fdb_is_storage", Path::from(["roles"])).with_transform(Transform::HasRole(Role::Storage));
        let is_log = per_process("fdb_is_log", Path::from(["roles"])).with_transform(Transform::HasRole(Role::Log));

        let storage = is_storage.collect(&processes()).unwrap();
        let log = is_log.collect(&processes()).unwrap();

        assert_eq!(numbers(&storage), vec![1.0, 0.0, 0.0]);
        assert_eq!(numbers(&log), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_role_presence_without_role_list() {
        let is_log = per_process("fdb_is_log", Path::from(["roles"])).with_transform(Transform::HasRole(Role::Log));
        let family = is_log
            .collect(&json!({ "cluster": { "processes": { "p9": { "address": "x" } } } }))
            .unwrap();

        assert_eq!(numbers(&family), vec![0.0]);
    }

    #[test]
    fn test_info_scalar() {
        let descriptor = Descriptor::Scalar(Scalar {
            def: def("fdb_recovery_state", MetricKind::Gauge, &[]),
            value_path: Path::from(["recovery_state"]),
            transform: Transform::Number,
        })
        .info();

        assert_eq!(descriptor.def().kind, MetricKind::Info);
        let family = descriptor
            .collect(&json!({ "recovery_state": { "name": "fully_recovered", "active_generations": 1 } }))
            .unwrap();

        let SampleValue::Info(fields) = &family.samples[0].value else {
            panic!("expected info sample");
        };
        assert_eq!(fields[0], ("name".into(), "fully_recovered".into()));
        assert_eq!(fields[1], ("active_generations".into(), "1".into()));
    }

    #[test]
    fn test_summary_per_element() {
        let descriptor = Descriptor::Summary(Summary {
            def: def("fdb_storage_read_latency", MetricKind::Summary, &["process", "id"]),
            root_path: Some(Path::root()),
            value_path: Path::from(["read_latency_statistics"]),
            label_paths: vec![Path::from(["process"]), Path::from(["id"])],
        });

        let stats = json!({
            "count": 4, "mean": 0.1, "p25": 0.02, "median": 0.05, "p90": 0.15,
            "p95": 0.18, "p99": 0.2, "p99.9": 0.25, "max": 0.3
        });
        let records = json!([
            { "process": "p1", "id": "a", "read_latency_statistics": stats },
            { "process": "p2", "id": "b", "read_latency_statistics": { "count": 0 } },
        ]);

        let family = descriptor.collect(&records).unwrap();
        assert_eq!(family.len(), 9);
        assert!(family.samples.iter().all(|s| s.label("process") == Some("p1")));

        let sum = family.samples.iter().find(|s| s.suffix == "_sum").unwrap();
        assert!((sum.number().unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_summary_at_fixed_path() {
        let descriptor = Descriptor::Summary(Summary {
            def: def("fdb_latency", MetricKind::Summary, &[]),
            root_path: None,
            value_path: Path::from(["latency"]),
            label_paths: Vec::new(),
        });

        assert!(descriptor.collect(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_describe_is_empty() {
        let descriptor = per_process("fdb_disk_busy", Path::from(["disk", "busy"])).counter();
        let family = descriptor.describe();
        assert!(family.is_empty());
        assert_eq!(family.kind, MetricKind::Counter);
        assert_eq!(family.label_names, &["id", "address", "class_type"]);
        assert_eq!(descriptor.name(), "fdb_disk_busy");
    }

    #[test]
    fn test_abbreviate_long_values() {
        let long = json!("x".repeat(200));
        let text = abbreviate(&long);
        assert!(text.ends_with("..."));
        assert!(text.len() < 80);
    }
}
