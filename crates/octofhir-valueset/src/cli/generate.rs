//! Generate command implementation

use super::output;
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::table::reader;
use crate::writer::DocumentWriter;
use crate::{Encoding, FhirVersion, Generator};

/// Configuration for generate command
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub spreadsheet: PathBuf,
    pub output_path: PathBuf,
    pub output_prefix: String,
    pub version: FhirVersion,
    pub encoding: Encoding,
}

/// Outcome counts of a generate run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Convert a workbook into value set files
pub async fn generate(config: GenerateConfig) -> Result<GenerateSummary> {
    let workbook = reader::open(&config.spreadsheet)
        .with_context(|| format!("Failed to load workbook: {}", config.spreadsheet.display()))?;

    let report = Generator::new(config.version)
        .generate(&workbook)
        .with_context(|| format!("Failed to read metadata from {}", config.spreadsheet.display()))?;

    for failure in &report.failures {
        eprintln!("{}", output::format_failure(&failure.error));
    }

    let writer = DocumentWriter::new(
        config.version,
        config.encoding,
        &config.output_path,
        &config.output_prefix,
    );
    let written = writer.write_all(report.documents);
    for failure in &written.failures {
        eprintln!("{}", output::format_failure(&failure.error));
    }

    println!(
        "{}",
        output::generation_summary(
            &written.written,
            &report.skipped,
            &report.failures,
            &written.failures
        )
    );

    let summary = GenerateSummary {
        written: written.written.len(),
        skipped: report.skipped.len(),
        failed: report.failures.len() + written.failures.len(),
    };
    if summary.failed == 0 {
        eprintln!(
            "{}",
            output::format_success(&format!(
                "{} value set(s) written to {}",
                summary.written,
                config.output_path.display()
            ))
        );
    } else {
        eprintln!(
            "{}",
            output::format_warning(&format!(
                "{} value set(s) written, {} unit(s) failed",
                summary.written, summary.failed
            ))
        );
    }
    Ok(summary)
}
