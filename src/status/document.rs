use super::path::{Path, resolve};
use crate::Result;
use ohno::{IntoAppError, bail};
use serde_json::Value;

/// One parsed snapshot of the cluster's `status json` output.
///
/// The document is read-only for the duration of a collection pass and is dropped with it.
#[derive(Debug, Clone)]
pub struct StatusDocument {
    root: Value,
}

impl StatusDocument {
    /// Parse a status document from raw UTF-8 JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not JSON or the top level is not a mapping.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root: Value = serde_json::from_slice(bytes).into_app_err("parsing status document")?;
        Self::from_value(root)
    }

    /// Wrap an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the top level is not a mapping.
    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() {
            bail!("status document must be a JSON object at the top level");
        }

        Ok(Self { root })
    }

    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    /// The client's view of database availability, if reported.
    #[must_use]
    pub fn database_available(&self) -> Option<bool> {
        resolve(&self.root, &Path::from(["client", "database_status", "available"]))
            .ok()
            .and_then(Value::as_bool)
    }

    /// Descriptions of the messages the client attached to the status.
    #[must_use]
    pub fn client_messages(&self) -> Vec<&str> {
        resolve(&self.root, &Path::from(["client", "messages"]))
            .ok()
            .and_then(Value::as_array)
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|message| message.get("description").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_document() {
        let doc = StatusDocument::parse(br#"{"client": {"database_status": {"available": true}}}"#).unwrap();
        assert_eq!(doc.database_available(), Some(true));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = StatusDocument::parse(b"{not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let result = StatusDocument::parse(b"[1, 2, 3]");
        assert!(result.is_err());
    }

    #[test]
    fn test_availability_missing() {
        let doc = StatusDocument::from_value(json!({ "cluster": {} })).unwrap();
        assert_eq!(doc.database_available(), None);
    }

    #[test]
    fn test_client_messages() {
        let doc = StatusDocument::from_value(json!({
            "client": {
                "messages": [
                    { "name": "unreachable", "description": "Unable to reach a quorum" },
                    { "name": "no_description" },
                    { "name": "status_incomplete", "description": "Status is incomplete" },
                ]
            }
        }))
        .unwrap();

        assert_eq!(doc.client_messages(), vec!["Unable to reach a quorum", "Status is incomplete"]);
    }

    #[test]
    fn test_client_messages_absent() {
        let doc = StatusDocument::from_value(json!({})).unwrap();
        assert!(doc.client_messages().is_empty());
    }
}
