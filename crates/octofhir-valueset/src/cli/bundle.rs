//! Bundle command implementation

use super::output;
use super::transport::FhirClient;
use anyhow::{Context, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::loader::load_resources;
use crate::writer::write_bundle;
use crate::{BundleAssembler, Encoding, FhirVersion, split};

/// Configuration for bundle command
#[derive(Debug, Clone)]
pub struct BundleConfig {
    pub input: PathBuf,
    pub id: String,
    pub version: FhirVersion,
    pub encoding: Encoding,
    pub output: Option<PathBuf>,
    pub max_entries: NonZeroUsize,
    pub post: Option<String>,
}

impl BundleConfig {
    /// Where the full bundle is written
    pub fn output_file(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            self.input
                .join(format!("{}.{}", self.id, self.encoding.extension()))
        })
    }
}

/// Bundle every resource in a directory, then optionally split and post
pub async fn bundle(config: BundleConfig) -> Result<()> {
    let resources = load_resources(&config.input)
        .with_context(|| format!("Failed to load resources from {}", config.input.display()))?;

    let bundle = BundleAssembler::new(config.version)
        .bundle(&config.id, resources)
        .context("Failed to assemble bundle")?;

    let path = config.output_file();
    write_bundle(&bundle, config.encoding, &path)
        .with_context(|| format!("Failed to write bundle: {}", path.display()))?;
    eprintln!(
        "{}",
        output::format_success(&format!(
            "Bundle {} with {} entries written to {}",
            bundle.id,
            bundle.len(),
            path.display()
        ))
    );

    let Some(endpoint) = config.post.as_deref() else {
        return Ok(());
    };

    let chunks = split(&bundle, config.max_entries);
    let client = FhirClient::new(endpoint, config.encoding);
    match client.post_all(&chunks).await {
        Ok(posted) => {
            eprintln!(
                "{}",
                output::format_success(&format!(
                    "Posted {} bundle(s) to {}",
                    posted,
                    client.endpoint()
                ))
            );
            Ok(())
        }
        Err(error) => {
            eprintln!("{}", output::format_diagnostic(&error));
            anyhow::bail!("Bundle not posted to {}", client.endpoint())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JsonSerializer;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn config(input: PathBuf) -> BundleConfig {
        BundleConfig {
            input,
            id: "cds-bundle".to_string(),
            version: FhirVersion::R4,
            encoding: Encoding::Json,
            output: None,
            max_entries: NonZeroUsize::new(50).unwrap(),
            post: None,
        }
    }

    #[tokio::test]
    async fn test_bundle_directory_without_posting() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("valueset-a.json"),
            r#"{"resourceType":"ValueSet","id":"a"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("library.json"), r#"{"resourceType":"Library"}"#).unwrap();

        let config = config(dir.path().to_path_buf());
        bundle(config.clone()).await.unwrap();

        let text = fs::read_to_string(config.output_file()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "transaction");
        let entries = value["entry"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        // Sorted order: library.json before valueset-a.json
        let url = entries[0]["request"]["url"].as_str().unwrap();
        assert!(url.starts_with("Library/cds-"));
        assert_eq!(entries[1]["request"]["url"], "ValueSet/a");
    }

    #[tokio::test]
    async fn test_rerun_does_not_nest_previous_bundle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("valueset-a.json"),
            r#"{"resourceType":"ValueSet","id":"a"}"#,
        )
        .unwrap();

        let config = config(dir.path().to_path_buf());
        bundle(config.clone()).await.unwrap();
        bundle(config.clone()).await.unwrap();

        let text = fs::read_to_string(config.output_file()).unwrap();
        let written = JsonSerializer::new().deserialize_bundle(&text).unwrap();
        let urls: Vec<&str> = written.entries.iter().map(|e| e.request.url.as_str()).collect();
        assert_eq!(urls, vec!["ValueSet/a"]);
    }

    #[test]
    fn test_default_output_file() {
        let config = config(PathBuf::from("bundles"));
        assert_eq!(config.output_file(), PathBuf::from("bundles/cds-bundle.json"));
    }
}
