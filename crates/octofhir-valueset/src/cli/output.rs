//! Output formatting utilities

use std::io::IsTerminal;

use colored::Colorize;
use octofhir_valueset_diagnostics::ValueSetError;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::engine::UnitFailure;
use crate::writer::{OutputFailure, WrittenDocument};

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Render a library error with its code and workbook location
pub fn format_diagnostic(error: &ValueSetError) -> String {
    error.to_diagnostic().render_colored()
}

/// Render a failure the run continued past
pub fn format_failure(error: &ValueSetError) -> String {
    error.to_warning().render_colored()
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Codes")]
    codes: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

/// Table of everything a generate run did
pub fn generation_summary(
    written: &[WrittenDocument],
    skipped: &[String],
    unit_failures: &[UnitFailure],
    output_failures: &[OutputFailure],
) -> String {
    let mut rows: Vec<SummaryRow> = written
        .iter()
        .map(|doc| SummaryRow {
            unit: doc.id.clone(),
            status: "written".to_string(),
            codes: doc.codes.to_string(),
            detail: doc.path.display().to_string(),
        })
        .collect();

    rows.extend(skipped.iter().map(|unit| SummaryRow {
        unit: unit.clone(),
        status: "skipped".to_string(),
        codes: "-".to_string(),
        detail: "template not filled in".to_string(),
    }));

    rows.extend(unit_failures.iter().map(|failure| SummaryRow {
        unit: failure.unit.clone(),
        status: "failed".to_string(),
        codes: "-".to_string(),
        detail: failure.error.to_string(),
    }));

    rows.extend(output_failures.iter().map(|failure| SummaryRow {
        unit: failure.id.clone(),
        status: "not written".to_string(),
        codes: "-".to_string(),
        detail: failure.error.to_string(),
    }));

    if rows.is_empty() {
        return "(no units listed)".to_string();
    }
    Table::new(rows).with(Style::modern()).to_string()
}
