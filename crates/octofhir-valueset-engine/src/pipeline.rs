//! Workbook to value set pipeline
//!
//! Sheet 0 carries the organizational metadata and, from
//! [`UNIT_LIST_OFFSET`] down, the list of unit sheets. Each listed unit is
//! resolved independently: a unit whose sheets are missing or whose code
//! list is invalid is recorded as a failure and the remaining units are
//! still produced.

use indexmap::IndexMap;
use octofhir_valueset_diagnostics::{Result, ValueSetError};
use octofhir_valueset_model::{FhirVersion, ResourceDocument};
use octofhir_valueset_table::{Sheet, Workbook};

use crate::assembler::{ResourceAssembler, should_skip};
use crate::codelist::{self, code_list_sheet_name};
use crate::metadata::{self, OrganizationalMetadata};

/// First row of the unit list on the metadata sheet
pub const UNIT_LIST_OFFSET: usize = 17;

/// Column of the unit list holding the unit sheet name
pub const UNIT_SHEET_COLUMN: usize = 2;

/// Unit sheet names listed on the metadata sheet, in listing order, with
/// the row each was listed on
pub fn resolve_unit_list(sheet: &Sheet) -> IndexMap<String, usize> {
    let mut units = IndexMap::new();
    for row in sheet.rows(UNIT_LIST_OFFSET) {
        if let Some(name) = row.cell_as_string(UNIT_SHEET_COLUMN) {
            units.insert(name, row.index());
        }
    }
    units
}

/// A unit that could not be produced
#[derive(Debug, Clone)]
pub struct UnitFailure {
    pub unit: String,
    pub error: ValueSetError,
}

/// Outcome of one generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub documents: Vec<ResourceDocument>,
    /// Units left out because their template was never filled in
    pub skipped: Vec<String>,
    pub failures: Vec<UnitFailure>,
}

impl GenerationReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs the pipeline for one target release
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    assembler: ResourceAssembler,
}

impl Generator {
    pub fn new(version: FhirVersion) -> Self {
        Self {
            assembler: ResourceAssembler::new(version),
        }
    }

    pub fn assembler(&self) -> &ResourceAssembler {
        &self.assembler
    }

    /// Produce a value set for every populated unit listed in the workbook.
    ///
    /// Only a missing metadata sheet fails the whole run.
    pub fn generate(&self, workbook: &Workbook) -> Result<GenerationReport> {
        let meta_sheet = workbook.sheet(0usize)?;
        let org = metadata::resolve_organizational(meta_sheet);
        let units = resolve_unit_list(meta_sheet);
        tracing::debug!(units = units.len(), "resolved unit list");

        let mut report = GenerationReport::default();
        for unit_sheet in units.keys() {
            match self.generate_unit(workbook, unit_sheet, &org) {
                Ok(Some(document)) => report.documents.push(document),
                Ok(None) => {
                    tracing::warn!(unit = %unit_sheet, "skipping unit with unpopulated template");
                    report.skipped.push(unit_sheet.clone());
                }
                Err(error) => {
                    tracing::warn!(unit = %unit_sheet, %error, "unit failed");
                    report.failures.push(UnitFailure {
                        unit: unit_sheet.clone(),
                        error,
                    });
                }
            }
        }
        Ok(report)
    }

    fn generate_unit(
        &self,
        workbook: &Workbook,
        unit_sheet: &str,
        org: &OrganizationalMetadata,
    ) -> Result<Option<ResourceDocument>> {
        let unit = metadata::resolve_unit(workbook.sheet(unit_sheet)?);
        if should_skip(&unit) {
            return Ok(None);
        }

        let code_list_sheet = workbook.sheet(&code_list_sheet_name(unit_sheet))?;
        let code_list = codelist::resolve(code_list_sheet, org.terminology_version.as_deref())?;
        Ok(Some(self.assembler.assemble(&unit, org, &code_list)))
    }
}

/// Output file name for a document: `<prefix><name>.<extension>`.
///
/// Uses the document's untranslated name, falling back to its id.
pub fn output_name(prefix: &str, document: &ResourceDocument, extension: &str) -> String {
    let stem = document
        .name
        .as_deref()
        .or(document.id.as_deref())
        .unwrap_or("unnamed");
    format!("{prefix}{stem}.{extension}")
}

/// Rewrite the document name for output (`-` becomes `_`)
pub fn translate_name(document: &mut ResourceDocument) {
    if let Some(name) = document.name.as_mut() {
        *name = name.replace('-', "_");
    }
}
