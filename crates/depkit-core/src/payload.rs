//! Request and result payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::IoType;
use crate::error::RequestError;

/// A request or result payload: a field mapping or one opaque string.
///
/// Serializes untagged, so a JSON object maps to [`Payload::Structured`] and
/// a JSON string to [`Payload::Plain`]. Any other JSON value is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Structured(Map<String, Value>),
    Plain(String),
}

impl Payload {
    /// Parse a JSON-serialized payload as delivered by a host.
    pub fn from_json(raw: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build a structured payload from `(field, value)` pairs.
    pub fn structured<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Payload::Structured(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Shape of this payload.
    pub fn io_type(&self) -> IoType {
        match self {
            Payload::Structured(_) => IoType::Structured,
            Payload::Plain(_) => IoType::Plain,
        }
    }

    /// The field mapping, if structured.
    pub fn as_structured(&self) -> Option<&Map<String, Value>> {
        match self {
            Payload::Structured(map) => Some(map),
            Payload::Plain(_) => None,
        }
    }

    /// The opaque string, if plain.
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Payload::Plain(text) => Some(text),
            Payload::Structured(_) => None,
        }
    }

    /// Look up a field of a structured payload. Null counts as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_structured()
            .and_then(|map| map.get(name))
            .filter(|v| !v.is_null())
    }

    /// Fetch a required string field.
    pub fn require_str(&self, name: &str) -> Result<&str, RequestError> {
        match self.field(name) {
            None => Err(RequestError::MissingField {
                field: name.to_string(),
            }),
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(RequestError::InvalidField {
                field: name.to_string(),
                reason: format!("expected a string, got {}", json_kind(other)),
            }),
        }
    }

    /// Fetch an optional string field; absent or null gives `None`.
    pub fn optional_str(&self, name: &str) -> Result<Option<&str>, RequestError> {
        match self.field(name) {
            None => Ok(None),
            Some(_) => self.require_str(name).map(Some),
        }
    }

    /// Serialize to the JSON form a host hands back to its caller.
    pub fn to_json(&self) -> Result<String, RequestError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Plain(text)
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Payload::Structured(map)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
