//! End-to-end tests over an in-memory workbook

use octofhir_valueset_diagnostics::ValueSetError;
use octofhir_valueset_engine::assembler::cpg;
use octofhir_valueset_engine::pipeline::UNIT_LIST_OFFSET;
use octofhir_valueset_engine::{BundleAssembler, FhirVersion, Generator, split};
use octofhir_valueset_model::{JsonSerializer, ResourceSerializer, model_for};
use octofhir_valueset_table::{Cell, Sheet, Workbook};
use pretty_assertions::assert_eq;
use std::num::NonZeroUsize;

const SNOMED: &str = "http://snomed.info/sct";
const RXNORM: &str = "http://www.nlm.nih.gov/research/umls/rxnorm";

fn text_rows(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|r| r.iter().map(|v| Cell::from(*v)).collect())
        .collect()
}

fn metadata_sheet(units: &[&str]) -> Sheet {
    let mut rows = text_rows(&[
        &["Canonical URL", "http://example.org/fhir"],
        &["Publisher", "Centers for Disease Control and Prevention (CDC)"],
        &["Jurisdiction", "US"],
        &["SNOMED CT", "http://snomed.info/sct/731000124108/version/20210901"],
    ]);
    rows.resize(UNIT_LIST_OFFSET, Vec::new());
    for unit in units {
        rows.push(vec![Cell::Empty, Cell::Empty, Cell::from(*unit)]);
    }
    Sheet::new("Metadata", rows)
}

fn unit_sheet(sheet: &str, id: &str, title: &str, compose: &str) -> Sheet {
    Sheet::new(
        sheet,
        text_rows(&[
            &["id", id],
            &["title", title],
            &["status", "draft"],
            &["compose", compose],
        ]),
    )
}

fn workbook() -> Workbook {
    Workbook::new(vec![
        metadata_sheet(&["opioids-vs", "benzo-vs", "template-vs", "broken-vs"]),
        unit_sheet("opioids-vs", "Opioid-Analgesics", "Opioid analgesics", "yes"),
        Sheet::new(
            "opioids-cl",
            text_rows(&[
                &["Code", "Description", "Active", "System", "Version"],
                &["1049502", "oxycodone 12 HR", "true", RXNORM, "2021-09"],
                &["", "", "", "", ""],
                &["1049504", "oxycodone 12 HR 20 MG", "", "", ""],
                &["1014599", "acetaminophen / oxycodone", "false", "", ""],
            ]),
        ),
        unit_sheet("benzo-vs", "benzodiazepines", "Benzodiazepines", ""),
        Sheet::new(
            "benzo-cl",
            text_rows(&[
                &["Code", "Description", "Active", "System", "Version"],
                &["372664007", "Benzodiazepine", "", SNOMED, "ignored"],
            ]),
        ),
        unit_sheet("template-vs", "template", "only fill this out", ""),
        unit_sheet("broken-vs", "broken", "Broken", ""),
        Sheet::new(
            "broken-cl",
            text_rows(&[&["Code"], &["123", "no system"]]),
        ),
    ])
}

#[test]
fn test_generate_isolates_failures_and_skips_templates() {
    let report = Generator::new(FhirVersion::R4).generate(&workbook()).unwrap();

    let ids: Vec<&str> = report
        .documents
        .iter()
        .filter_map(|d| d.id.as_deref())
        .collect();
    assert_eq!(ids, vec!["opioid-analgesics", "benzodiazepines"]);
    assert_eq!(report.skipped, vec!["template-vs".to_string()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].unit, "broken-vs");
    assert!(matches!(
        report.failures[0].error,
        ValueSetError::Validation { .. }
    ));
}

#[test]
fn test_missing_code_list_sheet_fails_only_its_unit() {
    let workbook = Workbook::new(vec![
        metadata_sheet(&["orphan-vs", "benzo-vs"]),
        unit_sheet("orphan-vs", "orphan", "Orphan", ""),
        unit_sheet("benzo-vs", "benzodiazepines", "Benzodiazepines", ""),
        Sheet::new(
            "benzo-cl",
            text_rows(&[&["372664007", "Benzodiazepine", "", SNOMED, ""]]),
        ),
    ]);

    let report = Generator::new(FhirVersion::R4).generate(&workbook).unwrap();

    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.documents[0].id.as_deref(), Some("benzodiazepines"));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].unit, "orphan-vs");
    match &report.failures[0].error {
        ValueSetError::MissingSheet { sheet } => assert_eq!(sheet, "orphan-cl"),
        other => panic!("expected MissingSheet, got {other:?}"),
    }
}

#[test]
fn test_sticky_defaults_flow_into_expansion() {
    let report = Generator::new(FhirVersion::R4).generate(&workbook()).unwrap();
    let opioids = &report.documents[0];

    let entries = opioids.expansion_entries();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.system == RXNORM));
    assert!(entries.iter().all(|e| e.version.as_deref() == Some("2021-09")));
    let active: Vec<bool> = entries.iter().map(|e| e.active).collect();
    assert_eq!(active, vec![true, true, false]);
}

#[test]
fn test_compose_intent_and_tagging() {
    let report = Generator::new(FhirVersion::R4).generate(&workbook()).unwrap();
    let opioids = &report.documents[0];
    let benzo = &report.documents[1];

    assert!(opioids.has_compose());
    assert_eq!(opioids.profiles().len(), 2);
    assert!(!benzo.has_compose());
    assert_eq!(benzo.profiles(), &[cpg::EXECUTABLE_PROFILE.to_string()]);
    assert_eq!(
        benzo.url.as_deref(),
        Some("http://example.org/fhir/ValueSet/benzodiazepines")
    );
}

#[test]
fn test_stu3_documents_are_untagged() {
    let report = Generator::new(FhirVersion::Stu3).generate(&workbook()).unwrap();
    assert!(report.documents.iter().all(|d| d.profiles().is_empty()));
    assert!(report.documents.iter().all(|d| d.extension.is_empty()));
}

#[test]
fn test_round_trip_preserves_expansion_rows() {
    let report = Generator::new(FhirVersion::R4).generate(&workbook()).unwrap();
    let document = &report.documents[0];

    let model = model_for(FhirVersion::R4);
    let serializer = JsonSerializer::pretty();
    let text = serializer.serialize(&model.represent(document).unwrap()).unwrap();
    let parsed = serializer.deserialize_document(&text).unwrap();

    assert_eq!(parsed.expansion_entries(), document.expansion_entries());
    let codes: Vec<String> = parsed.expansion_entries().into_iter().map(|e| e.code).collect();
    assert_eq!(codes, vec!["1049502", "1049504", "1014599"]);
}

#[test]
fn test_generated_documents_bundle_and_split() {
    let report = Generator::new(FhirVersion::R4).generate(&workbook()).unwrap();
    let model = model_for(FhirVersion::R4);
    let resources = report
        .documents
        .iter()
        .map(|d| model.represent(d))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let bundle = BundleAssembler::new(FhirVersion::R4)
        .bundle("opioid-cds-bundle", resources)
        .unwrap();
    assert_eq!(bundle.entries[0].request.url, "ValueSet/opioid-analgesics");

    let chunks = split(&bundle, NonZeroUsize::new(1).unwrap());
    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["opioid-cds-bundle1", "opioid-cds-bundle2"]);
}
