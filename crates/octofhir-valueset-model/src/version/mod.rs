//! FHIR version support
//!
//! Each supported FHIR release implements [`VersionModel`]; the pipeline picks
//! one implementation with [`model_for`] at start-up and uses it for every
//! document and bundle in the run.

pub mod r4;
pub mod stu3;

use std::fmt;
use std::str::FromStr;

use octofhir_valueset_diagnostics::{Result, ValueSetError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BundleEntry, ResourceDocument, TransactionBundle, self_reference};

pub use r4::R4Model;
pub use stu3::Stu3Model;

/// Target FHIR release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FhirVersion {
    Stu3,
    #[default]
    R4,
}

impl FhirVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            FhirVersion::Stu3 => "stu3",
            FhirVersion::R4 => "r4",
        }
    }
}

impl FromStr for FhirVersion {
    type Err = ValueSetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stu3" | "dstu3" => Ok(FhirVersion::Stu3),
            "r4" => Ok(FhirVersion::R4),
            _ => Err(ValueSetError::unsupported_version(s)),
        }
    }
}

impl fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version-specific resource and bundle handling
pub trait VersionModel: Send + Sync {
    /// The release this model implements
    fn version(&self) -> FhirVersion;

    /// Whether documents receive CPG knowledge-capability profiles and extensions
    fn supports_knowledge_tagging(&self) -> bool;

    /// Render a document as this release's JSON resource
    fn represent(&self, document: &ResourceDocument) -> Result<Value>;

    /// Wrap a resource (which must carry an id) in a PUT entry
    fn entry(&self, resource: Value) -> Result<BundleEntry>;

    /// Assemble a transaction bundle
    fn build(&self, id: &str, entries: Vec<BundleEntry>) -> TransactionBundle;
}

static STU3: Stu3Model = Stu3Model;
static R4: R4Model = R4Model;

/// Select the model for a release
pub fn model_for(version: FhirVersion) -> &'static dyn VersionModel {
    match version {
        FhirVersion::Stu3 => &STU3,
        FhirVersion::R4 => &R4,
    }
}

/// PUT entry whose URL is the resource's self reference
fn put_entry(resource: Value) -> Result<BundleEntry> {
    let url = self_reference(&resource).ok_or_else(|| {
        ValueSetError::invalid_resource("bundle entry resource has no id")
    })?;
    Ok(BundleEntry::put(resource, url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("r4", FhirVersion::R4)]
    #[case("R4", FhirVersion::R4)]
    #[case("stu3", FhirVersion::Stu3)]
    #[case("STU3", FhirVersion::Stu3)]
    #[case("dstu3", FhirVersion::Stu3)]
    fn test_parse_version(#[case] input: &str, #[case] expected: FhirVersion) {
        assert_eq!(input.parse::<FhirVersion>().unwrap(), expected);
    }

    #[test]
    fn test_unsupported_version() {
        let err = "r5".parse::<FhirVersion>().unwrap_err();
        assert!(matches!(err, ValueSetError::UnsupportedVersion { ref version } if version == "r5"));
    }

    #[test]
    fn test_model_for() {
        assert_eq!(model_for(FhirVersion::R4).version(), FhirVersion::R4);
        assert!(model_for(FhirVersion::R4).supports_knowledge_tagging());
        assert!(!model_for(FhirVersion::Stu3).supports_knowledge_tagging());
    }
}
