//! FHIR R4
//!
//! R4 is the release the CPG implementation guide targets, so documents
//! represented here keep their knowledge-capability profiles and extensions.

use octofhir_valueset_diagnostics::Result;
use serde_json::Value;

use super::{FhirVersion, VersionModel, put_entry};
use crate::{BundleEntry, ResourceDocument, TransactionBundle};

#[derive(Debug, Default, Clone, Copy)]
pub struct R4Model;

impl VersionModel for R4Model {
    fn version(&self) -> FhirVersion {
        FhirVersion::R4
    }

    fn supports_knowledge_tagging(&self) -> bool {
        true
    }

    fn represent(&self, document: &ResourceDocument) -> Result<Value> {
        Ok(serde_json::to_value(document)?)
    }

    fn entry(&self, resource: Value) -> Result<BundleEntry> {
        put_entry(resource)
    }

    fn build(&self, id: &str, entries: Vec<BundleEntry>) -> TransactionBundle {
        TransactionBundle::new(id, entries)
    }
}
