//! Code-list resolution
//!
//! A code-list sheet has the columns Code, Description, Active, System and
//! Version. Blank Active/System/Version cells inherit the value resolved for
//! the previous row, so authors only fill them in when they change.

use chrono::{DateTime, Utc};
use octofhir_valueset_diagnostics::{CellLocation, Result, ValueSetError};
use octofhir_valueset_model::{CodeEntry, Compose, ComposeInclude, Expansion, ExpansionContains};
use octofhir_valueset_table::{Row, Sheet};

/// The clinical terminology whose compose version comes from the workbook metadata
pub const CLINICAL_TERMINOLOGY_SYSTEM: &str = "http://snomed.info/sct";

/// Suffix of code-list sheet names
pub const CODE_LIST_SUFFIX: &str = "-cl";

const HEADER_LABEL: &str = "Code";
const EXPANSION_MARKER: &str = "expansion";

mod column {
    pub const CODE: usize = 0;
    pub const DESCRIPTION: usize = 1;
    pub const ACTIVE: usize = 2;
    pub const SYSTEM: usize = 3;
    pub const VERSION: usize = 4;
}

/// Code-list sheet belonging to a unit sheet (`opioids-vs` -> `opioids-cl`)
pub fn code_list_sheet_name(unit_sheet: &str) -> String {
    let stem = unit_sheet.split('-').next().unwrap_or(unit_sheet);
    format!("{stem}{CODE_LIST_SUFFIX}")
}

/// Ordered code entries of one unit plus its compose include
#[derive(Debug, Clone, PartialEq)]
pub struct CodeList {
    entries: Vec<CodeEntry>,
    include: Option<ComposeInclude>,
    terminology_version: Option<String>,
    timestamp: DateTime<Utc>,
}

impl CodeList {
    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When resolution started
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Intensional definition built from the first retained row.
    ///
    /// Only that row's system is recorded. For the clinical terminology the
    /// include version is the workbook's terminology version, not the row's.
    pub fn compose(&self) -> Option<Compose> {
        let include = self.include.as_ref()?;
        let version = if include.system == CLINICAL_TERMINOLOGY_SYSTEM {
            self.terminology_version.clone()
        } else {
            include.version.clone()
        };
        Some(Compose {
            include: vec![ComposeInclude {
                system: include.system.clone(),
                version,
            }],
        })
    }

    /// Extensional definition: every retained row with row-sourced versions
    pub fn expansion(&self) -> Expansion {
        let mut expansion = Expansion::new(self.timestamp);
        expansion.contains = self.entries.iter().map(ExpansionContains::from).collect();
        expansion
    }
}

/// Values carried forward between rows
#[derive(Debug)]
struct StickyDefaults {
    active: bool,
    system: Option<String>,
    version: Option<String>,
}

impl Default for StickyDefaults {
    fn default() -> Self {
        Self {
            active: true,
            system: None,
            version: None,
        }
    }
}

impl StickyDefaults {
    fn apply(&mut self, row: &Row) {
        if let Some(active) = row.cell_as_string(column::ACTIVE) {
            self.active = active.eq_ignore_ascii_case("true");
        }
        if let Some(system) = row.cell_as_string(column::SYSTEM) {
            self.system = Some(system);
        }
        if let Some(version) = row.cell_as_string(column::VERSION) {
            self.version = Some(version);
        }
    }
}

/// Resolve a code-list sheet, stamping the expansion with the current time
pub fn resolve(sheet: &Sheet, terminology_version: Option<&str>) -> Result<CodeList> {
    resolve_at(sheet, terminology_version, Utc::now())
}

/// Resolve a code-list sheet with an explicit generation timestamp
pub fn resolve_at(
    sheet: &Sheet,
    terminology_version: Option<&str>,
    timestamp: DateTime<Utc>,
) -> Result<CodeList> {
    let mut sticky = StickyDefaults::default();
    let mut entries = Vec::new();
    let mut include = None;

    for row in sheet.rows(0) {
        let Some(code) = row.cell_as_string(column::CODE) else {
            continue;
        };
        if code == HEADER_LABEL || code == EXPANSION_MARKER {
            continue;
        }

        sticky.apply(row);
        let Some(system) = sticky.system.clone() else {
            return Err(ValueSetError::validation_at(
                "A system must be specified in the code list",
                CellLocation::cell(sheet.name(), row.index(), column::SYSTEM),
            ));
        };

        if include.is_none() {
            include = Some(ComposeInclude {
                system: system.clone(),
                version: sticky.version.clone(),
            });
        }

        entries.push(CodeEntry {
            code,
            description: row.cell_as_string(column::DESCRIPTION),
            active: sticky.active,
            system,
            version: sticky.version.clone(),
        });
    }

    tracing::debug!(sheet = sheet.name(), codes = entries.len(), "resolved code list");
    Ok(CodeList {
        entries,
        include,
        terminology_version: terminology_version.map(str::to_string),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_valueset_table::Cell;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sheet(rows: &[[&str; 5]]) -> Sheet {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|v| Cell::from(*v)).collect())
            .collect();
        Sheet::new("opioids-cl", rows)
    }

    #[rstest]
    #[case("opioids-vs", "opioids-cl")]
    #[case("opioids", "opioids-cl")]
    #[case("a-b-c", "a-cl")]
    fn test_code_list_sheet_name(#[case] unit: &str, #[case] expected: &str) {
        assert_eq!(code_list_sheet_name(unit), expected);
    }

    #[test]
    fn test_sticky_system_and_version() {
        let sheet = sheet(&[
            ["Code", "Description", "Active", "System", "Version"],
            ["A", "Alpha", "", "http://loinc.org", "2.68"],
            ["B", "Beta", "", "", ""],
        ]);

        let list = resolve(&sheet, None).unwrap();
        assert_eq!(list.len(), 2);
        let b = &list.entries()[1];
        assert_eq!(b.system, "http://loinc.org");
        assert_eq!(b.version.as_deref(), Some("2.68"));
        assert!(b.active);
    }

    #[test]
    fn test_sticky_active_flag() {
        let sheet = sheet(&[
            ["A", "", "false", "http://loinc.org", ""],
            ["B", "", "", "", ""],
            ["C", "", "TRUE", "", ""],
            ["D", "", "yes", "", ""],
        ]);

        let list = resolve(&sheet, None).unwrap();
        let active: Vec<bool> = list.entries().iter().map(|e| e.active).collect();
        assert_eq!(active, vec![false, false, true, false]);
    }

    #[test]
    fn test_skips_header_blank_and_marker_rows() {
        let sheet = sheet(&[
            ["Code", "Description", "Active", "System", "Version"],
            ["", "orphan description", "", "http://ignored", ""],
            ["expansion", "", "", "", ""],
            ["1234-5", "Foo", "true", "http://loinc.org", ""],
        ]);

        let list = resolve(&sheet, None).unwrap();
        let codes: Vec<&str> = list.entries().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["1234-5"]);
        // Skipped rows never establish a sticky system
        assert_eq!(list.entries()[0].system, "http://loinc.org");
    }

    #[test]
    fn test_first_row_without_system_fails() {
        let sheet = sheet(&[
            ["Code", "Description", "Active", "System", "Version"],
            ["A", "Alpha", "true", "", ""],
        ]);

        let err = resolve(&sheet, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "VS0100: A system must be specified in the code list"
        );
        let location = err.location().unwrap();
        assert_eq!(location.to_string(), "opioids-cl!D2");
    }

    #[test]
    fn test_terminology_override_applies_to_compose_only() {
        let sheet = sheet(&[["1234-5", "Foo", "true", CLINICAL_TERMINOLOGY_SYSTEM, ""]]);

        let list = resolve(&sheet, Some("2021-09")).unwrap();
        let compose = list.compose().unwrap();
        assert_eq!(compose.include.len(), 1);
        assert_eq!(compose.include[0].system, CLINICAL_TERMINOLOGY_SYSTEM);
        assert_eq!(compose.include[0].version.as_deref(), Some("2021-09"));

        let expansion = list.expansion();
        assert_eq!(expansion.contains[0].version, None);
    }

    #[test]
    fn test_other_systems_keep_row_version() {
        let sheet = sheet(&[["A", "", "", "http://loinc.org", "2.68"]]);

        let list = resolve(&sheet, Some("2021-09")).unwrap();
        assert_eq!(
            list.compose().unwrap().include[0].version.as_deref(),
            Some("2.68")
        );
    }

    #[test]
    fn test_compose_records_first_system_only() {
        let sheet = sheet(&[
            ["A", "", "", "http://loinc.org", "2.68"],
            ["B", "", "", "http://www.nlm.nih.gov/research/umls/rxnorm", "2021"],
        ]);

        let list = resolve(&sheet, None).unwrap();
        let compose = list.compose().unwrap();
        assert_eq!(compose.include.len(), 1);
        assert_eq!(compose.include[0].system, "http://loinc.org");

        let expansion = list.expansion();
        let systems: Vec<&str> = expansion
            .contains
            .iter()
            .map(|c| c.system.as_str())
            .collect();
        assert_eq!(
            systems,
            vec!["http://loinc.org", "http://www.nlm.nih.gov/research/umls/rxnorm"]
        );
    }

    #[test]
    fn test_empty_code_list() {
        let sheet = sheet(&[["Code", "Description", "Active", "System", "Version"]]);

        let list = resolve(&sheet, None).unwrap();
        assert!(list.is_empty());
        assert!(list.compose().is_none());
        assert!(list.expansion().contains.is_empty());
    }

    #[test]
    fn test_numeric_codes_keep_integer_form() {
        let sheet = Sheet::new(
            "opioids-cl",
            vec![vec![
                Cell::Number(1049502.0),
                Cell::from("oxycodone"),
                Cell::Empty,
                Cell::from("http://www.nlm.nih.gov/research/umls/rxnorm"),
            ]],
        );

        let list = resolve(&sheet, None).unwrap();
        assert_eq!(list.entries()[0].code, "1049502");
    }

    #[test]
    fn test_timestamp_is_captured_once() {
        let ts = DateTime::parse_from_rfc3339("2021-09-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let sheet = sheet(&[["A", "", "", "http://loinc.org", ""]]);

        let list = resolve_at(&sheet, None, ts).unwrap();
        assert_eq!(list.timestamp(), ts);
        assert_eq!(list.expansion().timestamp, ts);
    }
}
