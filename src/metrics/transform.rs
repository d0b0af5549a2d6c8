use super::family::SampleValue;
use super::grouping::Role;
use crate::Result;
use crate::status::{Path, resolve};
use compact_str::{CompactString, ToCompactString};
use ohno::bail;
use serde_json::Value;

/// Backup state strings reported under `layers.backup.tags.*.current_status`, with their codes.
pub const BACKUP_STATES: &[(&str, f64)] = &[
    ("<undefined>", 0.0),
    ("has errored", 1.0),
    ("has never been started", 2.0),
    ("has been submitted", 3.0),
    ("has been started", 4.0),
    ("is differential", 5.0),
    ("has been completed", 6.0),
    ("has been aborted", 7.0),
    ("has been partially aborted", 8.0),
];

/// How a resolved raw value becomes a sample value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Numbers as-is, booleans as 0 or 1.
    Number,

    /// The number of entries in a sequence or mapping.
    Length,

    /// A mapping's fields as string-valued info labels.
    InfoFields,

    /// A backup state string mapped through [`BACKUP_STATES`]; unknown states map to 0.
    BackupState,

    /// 1 if the role list holds the role, else 0.
    HasRole(Role),
}

impl Transform {
    /// Convert the value found at `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has a JSON type this transform cannot convert.
    #[expect(clippy::cast_precision_loss, reason = "entry counts are far below 2^52")]
    pub fn apply(self, value: &Value, at: &Path) -> Result<SampleValue> {
        let converted = match (self, value) {
            (Self::Number, Value::Bool(b)) => SampleValue::Number(f64::from(u8::from(*b))),
            (Self::Number, Value::Number(n)) => match n.as_f64() {
                Some(n) => SampleValue::Number(n),
                None => bail!("{at}: number {n} is not representable as f64"),
            },
            (Self::Length, Value::Array(items)) => SampleValue::Number(items.len() as f64),
            (Self::Length, Value::Object(fields)) => SampleValue::Number(fields.len() as f64),
            (Self::InfoFields, Value::Object(fields)) => SampleValue::Info(
                fields
                    .iter()
                    .map(|(key, field)| (CompactString::from(key.as_str()), label_text(field)))
                    .collect(),
            ),
            (Self::BackupState, Value::String(state)) => SampleValue::Number(
                BACKUP_STATES
                    .iter()
                    .find(|(name, _)| *name == state.as_str())
                    .map_or(0.0, |(_, code)| *code),
            ),
            (Self::HasRole(role), Value::Array(records)) => {
                let held = records
                    .iter()
                    .any(|record| record.get("role").and_then(Value::as_str) == Some(role.as_ref()));
                SampleValue::Number(if held { 1.0 } else { 0.0 })
            }
            (transform, other) => bail!("{at}: cannot apply {transform:?} to {}", json_type(other)),
        };

        Ok(converted)
    }

    /// The value to emit when the value path does not resolve, if the absence itself is meaningful.
    #[must_use]
    pub const fn on_missing(self) -> Option<SampleValue> {
        match self {
            Self::HasRole(_) => Some(SampleValue::Number(0.0)),
            Self::Number | Self::Length | Self::InfoFields | Self::BackupState => None,
        }
    }
}

/// Which elements of a sequence or mapping a descriptor samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ElementFilter {
    #[default]
    All,

    /// Elements where the path resolves to this string.
    Equals(Path, CompactString),
}

impl ElementFilter {
    #[must_use]
    pub fn matches(&self, element: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Equals(path, expected) => resolve(element, path).ok().and_then(Value::as_str) == Some(expected.as_str()),
        }
    }
}

/// Render a value as a label value: strings verbatim, everything else as compact JSON.
#[must_use]
pub fn label_text(value: &Value) -> CompactString {
    match value {
        Value::String(s) => s.as_str().into(),
        other => other.to_compact_string(),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
