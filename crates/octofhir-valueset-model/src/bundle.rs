//! Transaction bundles
//!
//! Bundle entries hold arbitrary FHIR resources as JSON, so anything read
//! from disk can be packaged, not just generated value sets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ResourceType;

/// HTTP verb of a bundle entry request. Only PUT is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    #[default]
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    #[default]
    Transaction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleRequest {
    pub method: HttpVerb,
    pub url: String,
}

/// One resource change inside a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub resource: Value,
    pub request: BundleRequest,
}

impl BundleEntry {
    /// PUT entry targeting `url`
    pub fn put(resource: Value, url: impl Into<String>) -> Self {
        Self {
            resource,
            request: BundleRequest {
                method: HttpVerb::Put,
                url: url.into(),
            },
        }
    }
}

/// A transaction bundle: an id plus ordered entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBundle {
    #[serde(rename = "resourceType")]
    pub resource_type: ResourceType,
    pub id: String,
    #[serde(rename = "type")]
    pub bundle_type: BundleType,
    #[serde(rename = "entry", default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<BundleEntry>,
}

impl TransactionBundle {
    pub fn new(id: impl Into<String>, entries: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: ResourceType::Bundle,
            id: id.into(),
            bundle_type: BundleType::Transaction,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `resourceType` of a JSON resource
pub fn resource_type(resource: &Value) -> Option<&str> {
    resource.get("resourceType").and_then(Value::as_str)
}

/// Logical id of a JSON resource; an empty string counts as absent
pub fn resource_id(resource: &Value) -> Option<&str> {
    resource
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Set the logical id of a JSON resource object.
///
/// Returns `false` when `resource` is not a JSON object.
pub fn set_resource_id(resource: &mut Value, id: impl Into<String>) -> bool {
    match resource.as_object_mut() {
        Some(obj) => {
            obj.insert("id".to_string(), Value::String(id.into()));
            true
        }
        None => false,
    }
}

/// Self reference of a resource (`Type/id`).
///
/// An id that is already qualified (contains `/`) is returned unchanged, as
/// is a bare id when the resource carries no `resourceType`.
pub fn self_reference(resource: &Value) -> Option<String> {
    let id = resource_id(resource)?;
    if id.contains('/') {
        return Some(id.to_string());
    }
    Some(match resource_type(resource) {
        Some(rt) => format!("{rt}/{id}"),
        None => id.to_string(),
    })
}
