//! # Payload Decoding
//!
//! Request bodies arrive as arbitrary JSON. They are classified once into
//! [`PayloadKind`] and fields are read through explicit lookups, so a payload
//! of the wrong shape is an error value instead of a panic.

use super::errors::RegistryError;
use serde_json::{Map, Value};
use shared_types::{AccessPolicy, ProviderId, DEFAULT_NODE_TYPE};
use std::collections::BTreeSet;

/// A JSON object body.
pub type JsonObject = Map<String, Value>;

/// Shape of a decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadKind {
    Object(JsonObject),
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl PayloadKind {
    /// Decode raw body bytes. Malformed JSON is an [`RegistryError::InvalidPayload`].
    pub fn parse(body: &[u8]) -> Result<Self, RegistryError> {
        serde_json::from_slice::<Value>(body)
            .map(Self::from)
            .map_err(|_| RegistryError::InvalidPayload)
    }

    /// The object, or [`RegistryError::InvalidPayload`] for any other shape.
    pub fn into_object(self) -> Result<JsonObject, RegistryError> {
        match self {
            PayloadKind::Object(object) => Ok(object),
            _ => Err(RegistryError::InvalidPayload),
        }
    }
}

impl From<Value> for PayloadKind {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(object) => PayloadKind::Object(object),
            Value::Array(_) => PayloadKind::Array,
            Value::String(_) => PayloadKind::String,
            Value::Number(_) => PayloadKind::Number,
            Value::Bool(_) => PayloadKind::Bool,
            Value::Null => PayloadKind::Null,
        }
    }
}

/// Decode a body that must be a JSON object.
pub fn parse_object(body: &[u8]) -> Result<JsonObject, RegistryError> {
    PayloadKind::parse(body)?.into_object()
}

/// Result of looking up a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringField<'a> {
    /// Absent, `null` or the empty string.
    Missing,
    Text(&'a str),
    /// Present but not a string.
    Invalid,
}

impl<'a> StringField<'a> {
    pub fn read(object: &'a JsonObject, name: &str) -> Self {
        match object.get(name) {
            None | Some(Value::Null) => StringField::Missing,
            Some(Value::String(s)) if s.is_empty() => StringField::Missing,
            Some(Value::String(s)) => StringField::Text(s),
            Some(_) => StringField::Invalid,
        }
    }

    /// The text, treating `Invalid` as absent.
    pub fn text(self) -> Option<&'a str> {
        match self {
            StringField::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Resolve `service_definition.location.node_type`, falling back to the
/// default label when any step is absent or not of the expected shape.
pub fn resolve_node_type(proposal: &JsonObject) -> String {
    proposal
        .get("service_definition")
        .and_then(Value::as_object)
        .and_then(|definition| definition.get("location"))
        .and_then(Value::as_object)
        .and_then(|location| location.get("node_type"))
        .and_then(Value::as_str)
        .filter(|node_type| !node_type.is_empty())
        .unwrap_or(DEFAULT_NODE_TYPE)
        .to_string()
}

/// Read the `access_policies` list. Entries without a string `id` and
/// `source` are skipped; duplicates collapse.
pub fn parse_access_policies(proposal: &JsonObject, provider: &ProviderId) -> BTreeSet<AccessPolicy> {
    let Some(entries) = proposal.get("access_policies").and_then(Value::as_array) else {
        return BTreeSet::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let id = StringField::read(entry, "id").text()?;
            let source = StringField::read(entry, "source").text()?;
            Some(AccessPolicy::new(provider.clone(), id, source))
        })
        .collect()
}
