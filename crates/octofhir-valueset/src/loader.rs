//! Loading FHIR resources from a directory for bundling

use std::fs;
use std::path::{Path, PathBuf};

use octofhir_valueset_diagnostics::{Result, ValueSetError};
use octofhir_valueset_model::resource_type;
use serde_json::Value;

const BUNDLE_TYPE: &str = "Bundle";

/// Read every `*.json` FHIR resource directly inside `dir`.
///
/// Files are visited in sorted path order. Files that are not JSON objects
/// with a `resourceType` are skipped with a warning. Bundles are skipped too,
/// so a bundle previously written into `dir` is never nested in the next one.
pub fn load_resources(dir: &Path) -> Result<Vec<Value>> {
    let entries =
        fs::read_dir(dir).map_err(|e| ValueSetError::io(dir.display().to_string(), e.to_string()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut resources = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path)
            .map_err(|e| ValueSetError::io(path.display().to_string(), e.to_string()))?;
        match serde_json::from_str::<Value>(&text) {
            Ok(resource) => match resource_type(&resource).map(|t| t == BUNDLE_TYPE) {
                Some(true) => tracing::debug!(path = %path.display(), "skipping bundle file"),
                Some(false) => resources.push(resource),
                None => tracing::warn!(path = %path.display(), "skipping file without resourceType"),
            },
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unparseable file"),
        }
    }

    tracing::debug!(dir = %dir.display(), count = resources.len(), "loaded resources");
    Ok(resources)
}
