use super::descriptor::Descriptor;
use super::family::MetricFamily;
use super::grouping::{LayerIndex, RoleIndex};
use super::registry::Registry;
use crate::Result;
use crate::status::StatusDocument;
use serde_json::Value;

const LOG_TARGET: &str = " collector";

/// Runs collection passes over status documents using a fixed registry
#[derive(Debug, Clone)]
pub struct Collector {
    registry: Registry,
}

impl Collector {
    #[must_use]
    pub const fn new(registry: Registry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Declare every registered family, without samples, in evaluation order.
    #[must_use]
    pub fn describe(&self) -> Vec<MetricFamily> {
        self.registry.iter().map(Descriptor::describe).collect()
    }

    /// Parse `bytes` as a status document and run one pass over it.
    ///
    /// An unparseable document fails the whole pass; nothing is collected from it.
    pub fn collect_bytes(&self, bytes: &[u8]) -> Result<Vec<MetricFamily>> {
        let document = StatusDocument::parse(bytes)?;
        Ok(self.collect(&document))
    }

    /// Run one pass over `document`.
    ///
    /// Global descriptors run first, then by-role descriptors once for each role with at least
    /// one record, then by-layer descriptors for each layer present in the document. A failing
    /// descriptor is logged and contributes no family; the rest of the pass is unaffected.
    #[must_use]
    pub fn collect(&self, document: &StatusDocument) -> Vec<MetricFamily> {
        if document.database_available() == Some(false) {
            log::error!(
                target: LOG_TARGET,
                "Database not available when retrieving status: {}",
                document.client_messages().join("; ")
            );
        }

        let roles = RoleIndex::build(document);
        let layers = LayerIndex::build(document);

        let mut families = Vec::with_capacity(self.registry.len());

        for descriptor in &self.registry.global {
            evaluate(descriptor, document.root(), &mut families);
        }

        for (role, descriptors) in &self.registry.by_role {
            let Some(records) = roles.view(*role) else {
                log::debug!(target: LOG_TARGET, "No process holds role '{role}', skipping its metrics");
                continue;
            };

            for descriptor in descriptors {
                evaluate(descriptor, records, &mut families);
            }
        }

        for (layer, descriptors) in &self.registry.by_layer {
            let Some(section) = layers.get(*layer) else {
                continue;
            };

            for descriptor in descriptors {
                evaluate(descriptor, section, &mut families);
            }
        }

        log::debug!(target: LOG_TARGET, "Collected {} metric families", families.len());
        families
    }
}

fn evaluate(descriptor: &Descriptor, scope: &Value, families: &mut Vec<MetricFamily>) {
    match descriptor.collect(scope) {
        Ok(family) => families.push(family),
        Err(e) => log::warn!(target: LOG_TARGET, "Could not collect metric '{}': {e:#}", descriptor.name()),
    }
}
