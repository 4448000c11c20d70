//! FHIR STU3
//!
//! STU3 predates the CPG implementation guide: no knowledge tagging, and
//! `ValueSet.expansion.identifier` is mandatory.

use octofhir_valueset_diagnostics::Result;
use serde_json::Value;

use super::{FhirVersion, VersionModel, put_entry};
use crate::{BundleEntry, ResourceDocument, TransactionBundle};

#[derive(Debug, Default, Clone, Copy)]
pub struct Stu3Model;

impl Stu3Model {
    fn expansion_identifier(document: &ResourceDocument) -> String {
        match (&document.url, &document.id) {
            (Some(url), _) => url.clone(),
            (None, Some(id)) => format!("urn:valueset:{id}"),
            (None, None) => "urn:valueset:anonymous".to_string(),
        }
    }
}

impl VersionModel for Stu3Model {
    fn version(&self) -> FhirVersion {
        FhirVersion::Stu3
    }

    fn supports_knowledge_tagging(&self) -> bool {
        false
    }

    fn represent(&self, document: &ResourceDocument) -> Result<Value> {
        let mut document = document.clone();
        let identifier = Self::expansion_identifier(&document);
        if let Some(expansion) = document.expansion.as_mut() {
            expansion.identifier.get_or_insert(identifier);
        }
        Ok(serde_json::to_value(&document)?)
    }

    fn entry(&self, resource: Value) -> Result<BundleEntry> {
        put_entry(resource)
    }

    fn build(&self, id: &str, entries: Vec<BundleEntry>) -> TransactionBundle {
        TransactionBundle::new(id, entries)
    }
}
