//! Pass-scoped secondary views of a status document.
//!
//! The by-role index buckets every process's role records under the role name, and the
//! by-layer index looks up the optional subsystem sections under `cluster.layers`.
//! Both are built once per collection pass and dropped with it.

use crate::status::{Path, StatusDocument, resolve};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

const LOG_TARGET: &str = "  grouping";

/// A role a process can run. A process may hold several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Coordinator,
    Proxy,
    CommitProxy,
    GrvProxy,
    Log,
    Storage,
    ClusterController,
    Ratekeeper,
    DataDistributor,
    Resolver,
    Master,
}

/// An optional subsystem section of the status document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Layer {
    Backup,
}

/// Role records bucketed by role, each record enriched with its owning process id.
#[derive(Debug, Clone, Default)]
pub struct RoleIndex {
    buckets: BTreeMap<Role, Value>,
}

impl RoleIndex {
    /// Scan `cluster.processes` and bucket each tracked role record.
    ///
    /// A process holding several roles contributes one record to each of their buckets.
    #[must_use]
    pub fn build(document: &StatusDocument) -> Self {
        let mut buckets: BTreeMap<Role, Vec<Value>> = BTreeMap::new();

        let processes = match resolve(document.root(), &Path::from(["cluster", "processes"])) {
            Ok(Value::Object(processes)) => processes,
            Ok(_) => {
                log::debug!(target: LOG_TARGET, "cluster.processes is not a mapping, no role groupings built");
                return Self::default();
            }
            Err(miss) => {
                log::debug!(target: LOG_TARGET, "{miss}, no role groupings built");
                return Self::default();
            }
        };

        for (process_id, process) in processes {
            let Some(roles) = process.get("roles").and_then(Value::as_array) else {
                log::debug!(target: LOG_TARGET, "Process '{process_id}' has no role list");
                continue;
            };

            for record in roles {
                let Some(role) = record.get("role").and_then(Value::as_str).and_then(|name| Role::from_str(name).ok()) else {
                    continue;
                };

                let Value::Object(fields) = record else {
                    continue;
                };

                let mut enriched = fields.clone();
                let _ = enriched.insert("process".to_string(), Value::String(process_id.clone()));
                buckets.entry(role).or_default().push(Value::Object(enriched));
            }
        }

        Self {
            buckets: buckets.into_iter().map(|(role, records)| (role, Value::Array(records))).collect(),
        }
    }

    /// The records for `role`, or an empty slice when no process runs it.
    #[must_use]
    pub fn records(&self, role: Role) -> &[Value] {
        self.buckets
            .get(&role)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The bucket for `role` as a sequence value, or `None` when it is empty.
    #[must_use]
    pub fn view(&self, role: Role) -> Option<&Value> {
        if self.records(role).is_empty() {
            return None;
        }

        self.buckets.get(&role)
    }
}

/// Sub-documents of the layers present under `cluster.layers`.
#[derive(Debug, Clone, Default)]
pub struct LayerIndex<'a> {
    layers: BTreeMap<Layer, &'a Value>,
}

impl<'a> LayerIndex<'a> {
    #[must_use]
    pub fn build(document: &'a StatusDocument) -> Self {
        let layers = Layer::iter()
            .filter_map(|layer| {
                resolve(document.root(), &Path::from(["cluster", "layers", layer.as_ref()]))
                    .inspect_err(|miss| log::debug!(target: LOG_TARGET, "Layer '{layer}' not present: {miss}"))
                    .ok()
                    .map(|section| (layer, section))
            })
            .collect();

        Self { layers }
    }

    #[must_use]
    pub fn get(&self, layer: Layer) -> Option<&'a Value> {
        self.layers.get(&layer).copied()
    }
}
