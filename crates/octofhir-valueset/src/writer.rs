//! Writing generated resources to disk

use std::fs;
use std::path::{Path, PathBuf};

use octofhir_valueset_diagnostics::{Result, ValueSetError};
use octofhir_valueset_engine::{output_name, translate_name};
use octofhir_valueset_model::{
    Encoding, FhirVersion, ResourceDocument, TransactionBundle, VersionModel, model_for,
};
use serde_json::Value;

/// A value set written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocument {
    pub id: String,
    pub path: PathBuf,
    pub codes: usize,
}

/// A value set that could not be written
#[derive(Debug, Clone)]
pub struct OutputFailure {
    pub id: String,
    pub error: ValueSetError,
}

#[derive(Debug, Clone, Default)]
pub struct OutputReport {
    pub written: Vec<WrittenDocument>,
    pub failures: Vec<OutputFailure>,
}

/// Writes value sets as `<dir>/<prefix><name>.<ext>`
pub struct DocumentWriter {
    model: &'static dyn VersionModel,
    encoding: Encoding,
    output_dir: PathBuf,
    prefix: String,
}

impl DocumentWriter {
    pub fn new(
        version: FhirVersion,
        encoding: Encoding,
        output_dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            model: model_for(version),
            encoding,
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Write every document; a failed write does not stop the others
    pub fn write_all(&self, documents: Vec<ResourceDocument>) -> OutputReport {
        let mut report = OutputReport::default();
        for document in documents {
            let id = document.id.clone().unwrap_or_default();
            match self.write(document) {
                Ok(written) => report.written.push(written),
                Err(error) => {
                    tracing::error!(%id, %error, "failed to write value set");
                    report.failures.push(OutputFailure { id, error });
                }
            }
        }
        report
    }

    /// Write one document.
    ///
    /// The file is named after the document's name as generated; the name
    /// inside the written resource has `-` replaced by `_`.
    pub fn write(&self, mut document: ResourceDocument) -> Result<WrittenDocument> {
        let file_name = output_name(&self.prefix, &document, self.encoding.extension());
        let path = self.output_dir.join(file_name);
        translate_name(&mut document);

        let resource = self.model.represent(&document)?;
        write_resource(&resource, self.encoding, &path)?;
        tracing::info!(path = %path.display(), "wrote value set");

        Ok(WrittenDocument {
            id: document.id.clone().unwrap_or_default(),
            path,
            codes: document.expansion.as_ref().map_or(0, |e| e.contains.len()),
        })
    }
}

/// Serialize a resource to `path`, creating parent directories
pub fn write_resource(resource: &Value, encoding: Encoding, path: &Path) -> Result<()> {
    let text = encoding.serializer().serialize(resource)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ValueSetError::io(parent.display().to_string(), e.to_string()))?;
    }
    fs::write(path, text).map_err(|e| ValueSetError::io(path.display().to_string(), e.to_string()))
}

/// Serialize a transaction bundle to `path`
pub fn write_bundle(bundle: &TransactionBundle, encoding: Encoding, path: &Path) -> Result<()> {
    let resource = serde_json::to_value(bundle)?;
    write_resource(&resource, encoding, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use octofhir_valueset_model::{Expansion, ExpansionContains};
    use pretty_assertions::assert_eq;

    fn document(id: &str) -> ResourceDocument {
        let mut doc = ResourceDocument::new(id);
        doc.name = Some(id.to_string());
        let mut expansion = Expansion::new(Utc::now());
        expansion.contains.push(ExpansionContains {
            system: "http://loinc.org".into(),
            code: "1234-5".into(),
            ..Default::default()
        });
        doc.expansion = Some(expansion);
        doc
    }

    #[test]
    fn test_write_translates_name_inside_resource_only() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocumentWriter::new(FhirVersion::R4, Encoding::Json, dir.path(), "valueset-");

        let written = writer.write(document("opioid-analgesics")).unwrap();
        assert_eq!(
            written.path,
            dir.path().join("valueset-opioid-analgesics.json")
        );
        assert_eq!(written.codes, 1);

        let text = fs::read_to_string(&written.path).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "opioid_analgesics");
        assert_eq!(value["id"], "opioid-analgesics");
    }

    #[test]
    fn test_write_xml() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocumentWriter::new(FhirVersion::Stu3, Encoding::Xml, dir.path(), "vs-");

        let written = writer.write(document("benzo")).unwrap();
        let text = fs::read_to_string(&written.path).unwrap();
        assert!(written.path.ends_with("vs-benzo.xml"));
        assert!(text.contains("<ValueSet xmlns=\"http://hl7.org/fhir\">"));
        // STU3 requires an expansion identifier
        assert!(text.contains("<identifier value=\"urn:valueset:benzo\"/>"));
    }

    #[test]
    fn test_write_all_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "not a directory").unwrap();

        // The first document targets a path under a regular file and fails
        let failing = DocumentWriter::new(FhirVersion::R4, Encoding::Json, &blocker, "");
        let report = failing.write_all(vec![document("a"), document("b")]);
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(report.failures[0].error, ValueSetError::Io { .. }));

        let ok = DocumentWriter::new(FhirVersion::R4, Encoding::Json, dir.path(), "");
        let report = ok.write_all(vec![document("a"), document("b")]);
        assert_eq!(report.written.len(), 2);
        assert!(report.failures.is_empty());
    }
}
