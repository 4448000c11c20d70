//! Transaction bundle assembly

use octofhir_valueset_diagnostics::Result;
use octofhir_valueset_model::{
    FhirVersion, TransactionBundle, VersionModel, model_for, resource_id, set_resource_id,
};
use serde_json::Value;
use uuid::Uuid;

/// Conventional suffix of bundle ids, stripped when deriving resource ids
pub const BUNDLE_SUFFIX: &str = "-bundle";

/// Packages resources into a PUT transaction for one target release
#[derive(Clone, Copy)]
pub struct BundleAssembler {
    model: &'static dyn VersionModel,
}

impl std::fmt::Debug for BundleAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleAssembler")
            .field("version", &self.model.version())
            .finish()
    }
}

impl BundleAssembler {
    pub fn new(version: FhirVersion) -> Self {
        Self {
            model: model_for(version),
        }
    }

    /// Select the release by name (`r4`, `stu3`)
    pub fn for_version(version: &str) -> Result<Self> {
        Ok(Self::new(version.parse()?))
    }

    pub fn version(&self) -> FhirVersion {
        self.model.version()
    }

    /// Wrap `resources` in a transaction bundle with id `id`.
    ///
    /// Resources without an id get `<id without -bundle>-<uuid>`. Entry
    /// order follows `resources`.
    pub fn bundle(&self, id: &str, resources: Vec<Value>) -> Result<TransactionBundle> {
        let mut entries = Vec::with_capacity(resources.len());
        for mut resource in resources {
            if resource_id(&resource).is_none() {
                let generated = generate_identity(id);
                tracing::debug!(id = %generated, "assigned identity to bundle resource");
                set_resource_id(&mut resource, generated);
            }
            entries.push(self.model.entry(resource)?);
        }

        tracing::info!(bundle = id, entries = entries.len(), version = %self.version(), "assembled transaction bundle");
        Ok(self.model.build(id, entries))
    }
}

/// Fresh resource id derived from a bundle id
pub fn generate_identity(bundle_id: &str) -> String {
    let stem = bundle_id.strip_suffix(BUNDLE_SUFFIX).unwrap_or(bundle_id);
    format!("{}-{}", stem, Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_valueset_diagnostics::ValueSetError;
    use octofhir_valueset_model::HttpVerb;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_generate_identity_strips_suffix() {
        let id = generate_identity("opioid-cds-bundle");
        let token = id.strip_prefix("opioid-cds-").unwrap();
        assert!(Uuid::parse_str(token).is_ok());

        let id = generate_identity("plain");
        assert!(id.starts_with("plain-"));
        assert_ne!(generate_identity("plain"), generate_identity("plain"));
    }

    #[test]
    fn test_bundle_entries_follow_input_order() {
        let resources = vec![
            json!({"resourceType": "ValueSet", "id": "b"}),
            json!({"resourceType": "Library", "id": "a"}),
        ];
        let bundle = BundleAssembler::new(FhirVersion::R4)
            .bundle("cds-bundle", resources)
            .unwrap();

        assert_eq!(bundle.id, "cds-bundle");
        let urls: Vec<&str> = bundle.entries.iter().map(|e| e.request.url.as_str()).collect();
        assert_eq!(urls, vec!["ValueSet/b", "Library/a"]);
        assert!(bundle.entries.iter().all(|e| e.request.method == HttpVerb::Put));
    }

    #[test]
    fn test_bundle_assigns_missing_identity() {
        let resources = vec![json!({"resourceType": "ValueSet", "id": ""})];
        let bundle = BundleAssembler::new(FhirVersion::Stu3)
            .bundle("cds-bundle", resources)
            .unwrap();

        let entry = &bundle.entries[0];
        let id = resource_id(&entry.resource).unwrap();
        assert!(id.starts_with("cds-"));
        assert_eq!(entry.request.url, format!("ValueSet/{id}"));
    }

    #[test]
    fn test_bundle_rejects_non_object_resource() {
        let err = BundleAssembler::new(FhirVersion::R4)
            .bundle("b", vec![json!("scalar")])
            .unwrap_err();
        assert!(matches!(err, ValueSetError::InvalidResource { .. }));
    }

    #[test]
    fn test_unsupported_version() {
        let err = BundleAssembler::for_version("r5").unwrap_err();
        assert!(matches!(err, ValueSetError::UnsupportedVersion { ref version } if version == "r5"));
        assert_eq!(
            BundleAssembler::for_version("dstu3").unwrap().version(),
            FhirVersion::Stu3
        );
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = BundleAssembler::new(FhirVersion::R4)
            .bundle("empty-bundle", Vec::new())
            .unwrap();
        assert!(bundle.is_empty());
    }
}
