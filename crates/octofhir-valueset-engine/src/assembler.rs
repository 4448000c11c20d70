//! Value set assembly
//!
//! Merges unit metadata, organizational metadata and a resolved code list
//! into a [`ResourceDocument`], then tags it with the CPG knowledge
//! capability profiles and extensions when the target release supports them.

use octofhir_valueset_model::{
    CodeableConcept, Coding, ContactDetail, ContactPoint, Expression, Extension, ExtensionValue,
    FhirVersion, Period, ResourceDocument, VersionModel, model_for,
};

use crate::codelist::CodeList;
use crate::metadata::{OrganizationalMetadata, UnitMetadata};

/// Clinical Practice Guidelines IG canonicals
pub mod cpg {
    pub const COMPUTABLE_PROFILE: &str =
        "http://hl7.org/fhir/uv/cpg/StructureDefinition/cpg-computablevalueset";
    pub const EXECUTABLE_PROFILE: &str =
        "http://hl7.org/fhir/uv/cpg/StructureDefinition/cpg-executablevalueset";
    pub const KNOWLEDGE_CAPABILITY: &str =
        "http://hl7.org/fhir/uv/cpg/StructureDefinition/cpg-knowledgeCapability";
    pub const KNOWLEDGE_REPRESENTATION_LEVEL: &str =
        "http://hl7.org/fhir/uv/cpg/StructureDefinition/cpg-knowledgeRepresentationLevel";
    pub const USAGE_WARNING: &str =
        "http://hl7.org/fhir/uv/cpg/StructureDefinition/cpg-usageWarning";

    /// Attached to every executable value set
    pub const EXPANSION_USAGE_WARNING: &str = "This value set contains a point-in-time expansion enumerating the codes that meet the value set intent. As new versions of the code systems used by the value set are released, the contents of this expansion will need to be updated to incorporate newly defined codes that meet the value set intent. Before, and periodically during production use, the value set expansion contents SHOULD be updated. The value set expansion specifies the timestamp when the expansion was produced, SHOULD contain the parameters used for the expansion, and SHALL contain the codes that are obtained by evaluating the value set definition. If this is ONLY an executable value set, a distributable definition of the value set must be obtained to compute the updated expansion.";
}

/// Core FHIR extensions carrying unit and publication metadata
pub mod ext {
    pub const KEYWORD: &str = "http://hl7.org/fhir/StructureDefinition/valueset-keyWord";
    pub const RULES_TEXT: &str = "http://hl7.org/fhir/StructureDefinition/valueset-rules-text";
    pub const EXPRESSION: &str = "http://hl7.org/fhir/StructureDefinition/valueset-expression";
    pub const WARNING: &str = "http://hl7.org/fhir/StructureDefinition/valueset-warning";
    pub const APPROVAL_DATE: &str = "http://hl7.org/fhir/StructureDefinition/resource-approvalDate";
    pub const EFFECTIVE_PERIOD: &str =
        "http://hl7.org/fhir/StructureDefinition/resource-effectivePeriod";
    pub const LAST_REVIEW_DATE: &str =
        "http://hl7.org/fhir/StructureDefinition/resource-lastReviewDate";
}

/// Coding system for jurisdictions
pub const JURISDICTION_SYSTEM: &str = "urn:iso:std:iso:3166";

/// Whether a unit should be left out of generation entirely
pub fn should_skip(unit: &UnitMetadata) -> bool {
    unit.is_unpopulated_template()
}

/// Builds value sets for one target release
#[derive(Clone, Copy)]
pub struct ResourceAssembler {
    model: &'static dyn VersionModel,
}

impl std::fmt::Debug for ResourceAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceAssembler")
            .field("version", &self.model.version())
            .finish()
    }
}

impl ResourceAssembler {
    pub fn new(version: FhirVersion) -> Self {
        Self {
            model: model_for(version),
        }
    }

    pub fn model(&self) -> &'static dyn VersionModel {
        self.model
    }

    /// Assemble one value set.
    ///
    /// The compose section is attached only when the unit asked for one;
    /// the expansion is always attached.
    pub fn assemble(
        &self,
        unit: &UnitMetadata,
        org: &OrganizationalMetadata,
        code_list: &CodeList,
    ) -> ResourceDocument {
        let mut doc = ResourceDocument::default();
        copy_unit_metadata(&mut doc, unit);
        copy_organizational_metadata(&mut doc, org);

        if let (Some(base), Some(id)) = (&org.canonical_url_base, &unit.id) {
            doc.url = Some(format!("{}/ValueSet/{}", base.trim_end_matches('/'), id));
        }

        if unit.compose_intent() {
            doc.compose = code_list.compose();
        }
        doc.expansion = Some(code_list.expansion());

        if self.model.supports_knowledge_tagging() {
            apply_knowledge_tagging(&mut doc);
        }
        doc
    }
}

/// Add CPG profiles and extensions for each section the document carries
pub fn apply_knowledge_tagging(doc: &mut ResourceDocument) {
    if doc.has_compose() {
        doc.add_profile(cpg::COMPUTABLE_PROFILE);
        doc.add_extension(Extension::code(cpg::KNOWLEDGE_CAPABILITY, "computable"));
        doc.add_extension(Extension::code(cpg::KNOWLEDGE_REPRESENTATION_LEVEL, "structured"));
    }
    if doc.has_expansion() {
        doc.add_profile(cpg::EXECUTABLE_PROFILE);
        doc.add_extension(Extension::code(cpg::KNOWLEDGE_CAPABILITY, "executable"));
        doc.add_extension(Extension::code(cpg::KNOWLEDGE_REPRESENTATION_LEVEL, "executable"));
        doc.add_extension(Extension::string(
            cpg::USAGE_WARNING,
            cpg::EXPANSION_USAGE_WARNING,
        ));
    }
}

fn copy_unit_metadata(doc: &mut ResourceDocument, unit: &UnitMetadata) {
    doc.id = unit.id.clone();
    doc.name = unit.name.clone();
    doc.version = unit.version.clone();
    doc.title = unit.title.clone();
    doc.status = unit.status.clone();
    doc.experimental = unit.experimental_flag();
    doc.date = unit.date.clone();
    doc.description = unit.description.clone();
    doc.purpose = compose_purpose(unit);

    if let Some(keyword) = &unit.keyword {
        doc.add_extension(Extension::string(ext::KEYWORD, keyword));
    }
    if let Some(rules) = &unit.rules_text {
        doc.add_extension(Extension::new(
            ext::RULES_TEXT,
            ExtensionValue::Markdown(rules.clone()),
        ));
    }
    let expression = Expression {
        description: unit.expression_description.clone(),
        name: unit.expression_name.clone(),
        language: unit.expression_language.clone(),
        expression: unit.expression_expression.clone(),
    };
    if !expression.is_empty() {
        doc.add_extension(Extension::new(
            ext::EXPRESSION,
            ExtensionValue::Expression(expression),
        ));
    }
    if let Some(warning) = &unit.warning {
        doc.add_extension(Extension::new(
            ext::WARNING,
            ExtensionValue::Markdown(warning.clone()),
        ));
    }
}

fn copy_organizational_metadata(doc: &mut ResourceDocument, org: &OrganizationalMetadata) {
    doc.publisher = org.publisher.clone();
    doc.copyright = org.copyright.clone();

    if let Some(jurisdiction) = &org.jurisdiction {
        doc.jurisdiction.push(CodeableConcept {
            coding: vec![Coding {
                system: Some(JURISDICTION_SYSTEM.to_string()),
                code: Some(jurisdiction.clone()),
                display: None,
            }],
            text: None,
        });
    }

    let telecom: Vec<ContactPoint> =
        if org.author_telecom_system.is_some() || org.author_telecom_value.is_some() {
            vec![ContactPoint {
                system: org.author_telecom_system.clone(),
                value: org.author_telecom_value.clone(),
            }]
        } else {
            Vec::new()
        };
    if org.author_name.is_some() || !telecom.is_empty() {
        doc.contact.push(ContactDetail {
            name: org.author_name.clone(),
            telecom,
        });
    }

    if let Some(date) = &org.approval_date {
        doc.add_extension(Extension::new(
            ext::APPROVAL_DATE,
            ExtensionValue::Date(date.clone()),
        ));
    }
    if let Some(date) = &org.effective_date {
        doc.add_extension(Extension::new(
            ext::EFFECTIVE_PERIOD,
            ExtensionValue::Period(Period {
                start: Some(date.clone()),
                end: None,
            }),
        ));
    }
    if let Some(date) = &org.last_review_date {
        doc.add_extension(Extension::new(
            ext::LAST_REVIEW_DATE,
            ExtensionValue::Date(date.clone()),
        ));
    }
}

/// Purpose text followed by its labelled sub-sections
fn compose_purpose(unit: &UnitMetadata) -> Option<String> {
    let sections = [
        (None, &unit.purpose),
        (Some("Clinical Focus"), &unit.purpose_clinical_focus),
        (Some("Data Element Scope"), &unit.purpose_data_element_scope),
        (Some("Inclusion Criteria"), &unit.purpose_inclusion_criteria),
        (Some("Exclusion Criteria"), &unit.purpose_exclusion_criteria),
    ];

    let paragraphs: Vec<String> = sections
        .iter()
        .filter_map(|(label, value)| {
            let value = value.as_deref()?;
            Some(match label {
                Some(label) => format!("{label}: {value}"),
                None => value.to_string(),
            })
        })
        .collect();

    (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codelist;
    use chrono::{DateTime, Utc};
    use octofhir_valueset_model::{Compose, ComposeInclude, Expansion};
    use octofhir_valueset_table::{Cell, Sheet};
    use pretty_assertions::assert_eq;

    fn timestamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-09-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn code_list() -> CodeList {
        let sheet = Sheet::new(
            "opioids-cl",
            vec![
                ["Code", "Description", "Active", "System", "Version"],
                ["1049502", "oxycodone", "true", "http://www.nlm.nih.gov/research/umls/rxnorm", ""],
            ]
            .iter()
            .map(|r| r.iter().map(|v| Cell::from(*v)).collect())
            .collect(),
        );
        codelist::resolve_at(&sheet, None, timestamp()).unwrap()
    }

    fn unit() -> UnitMetadata {
        UnitMetadata {
            id: Some("opioid-analgesics".into()),
            name: Some("opioid-analgesics".into()),
            title: Some("Opioid analgesics".into()),
            status: Some("active".into()),
            experimental: Some("false".into()),
            ..Default::default()
        }
    }

    fn count(doc: &ResourceDocument, url: &str) -> usize {
        doc.extensions_by_url(url).count()
    }

    #[test]
    fn test_skip_predicate() {
        assert!(!should_skip(&unit()));
        assert!(should_skip(&UnitMetadata::default()));
        assert!(should_skip(&UnitMetadata {
            title: Some("only fill this out".into()),
            ..unit()
        }));
    }

    #[test]
    fn test_compose_only_tagging() {
        let mut doc = ResourceDocument::new("a");
        doc.compose = Some(Compose {
            include: vec![ComposeInclude {
                system: "http://loinc.org".into(),
                version: None,
            }],
        });
        apply_knowledge_tagging(&mut doc);

        assert_eq!(doc.profiles(), &[cpg::COMPUTABLE_PROFILE.to_string()]);
        assert_eq!(doc.extension.len(), 2);
        let capability: Vec<_> = doc
            .extensions_by_url(cpg::KNOWLEDGE_CAPABILITY)
            .filter_map(|e| e.value.as_str())
            .collect();
        assert_eq!(capability, vec!["computable"]);
        assert_eq!(count(&doc, cpg::USAGE_WARNING), 0);
    }

    #[test]
    fn test_both_sections_receive_both_tag_families() {
        let mut doc = ResourceDocument::new("a");
        doc.compose = Some(Compose::default());
        doc.expansion = Some(Expansion::new(timestamp()));
        apply_knowledge_tagging(&mut doc);

        assert_eq!(
            doc.profiles(),
            &[
                cpg::COMPUTABLE_PROFILE.to_string(),
                cpg::EXECUTABLE_PROFILE.to_string()
            ]
        );
        assert_eq!(count(&doc, cpg::KNOWLEDGE_CAPABILITY), 2);
        assert_eq!(count(&doc, cpg::KNOWLEDGE_REPRESENTATION_LEVEL), 2);
        let warning = doc.extensions_by_url(cpg::USAGE_WARNING).next().unwrap();
        assert_eq!(warning.value.as_str(), Some(cpg::EXPANSION_USAGE_WARNING));
    }

    #[test]
    fn test_r4_assembly_is_tagged() {
        let unit = UnitMetadata {
            compose: Some("yes".into()),
            ..unit()
        };
        let doc = ResourceAssembler::new(FhirVersion::R4).assemble(
            &unit,
            &OrganizationalMetadata::default(),
            &code_list(),
        );

        assert!(doc.has_compose());
        assert!(doc.has_expansion());
        assert_eq!(doc.profiles().len(), 2);
        assert_eq!(count(&doc, cpg::USAGE_WARNING), 1);
    }

    #[test]
    fn test_stu3_assembly_is_never_tagged() {
        let unit = UnitMetadata {
            compose: Some("yes".into()),
            ..unit()
        };
        let doc = ResourceAssembler::new(FhirVersion::Stu3).assemble(
            &unit,
            &OrganizationalMetadata::default(),
            &code_list(),
        );

        assert!(doc.has_compose());
        assert!(doc.profiles().is_empty());
        assert!(doc.extension.is_empty());
    }

    #[test]
    fn test_compose_requires_unit_intent() {
        let doc = ResourceAssembler::new(FhirVersion::R4).assemble(
            &unit(),
            &OrganizationalMetadata::default(),
            &code_list(),
        );

        assert!(!doc.has_compose());
        assert_eq!(doc.profiles(), &[cpg::EXECUTABLE_PROFILE.to_string()]);
    }

    #[test]
    fn test_metadata_mapping() {
        let unit = UnitMetadata {
            keyword: Some("opioid".into()),
            expression_name: Some("Opioids".into()),
            expression_language: Some("text/cql".into()),
            purpose: Some("Identify opioid use".into()),
            purpose_clinical_focus: Some("Pain management".into()),
            ..unit()
        };
        let org = OrganizationalMetadata {
            canonical_url_base: Some("http://example.org/fhir/".into()),
            publisher: Some("CDC".into()),
            jurisdiction: Some("US".into()),
            author_name: Some("CDC NCIPC".into()),
            author_telecom_system: Some("url".into()),
            author_telecom_value: Some("https://www.cdc.gov".into()),
            effective_date: Some("2021-01-01".into()),
            ..Default::default()
        };

        let doc = ResourceAssembler::new(FhirVersion::Stu3).assemble(&unit, &org, &code_list());

        assert_eq!(
            doc.url.as_deref(),
            Some("http://example.org/fhir/ValueSet/opioid-analgesics")
        );
        assert_eq!(doc.name.as_deref(), Some("opioid-analgesics"));
        assert_eq!(doc.experimental, Some(false));
        assert_eq!(doc.publisher.as_deref(), Some("CDC"));
        assert_eq!(
            doc.purpose.as_deref(),
            Some("Identify opioid use\n\nClinical Focus: Pain management")
        );
        assert_eq!(
            doc.jurisdiction[0].coding[0].code.as_deref(),
            Some("US")
        );
        assert_eq!(doc.contact[0].telecom[0].value.as_deref(), Some("https://www.cdc.gov"));
        assert_eq!(count(&doc, ext::KEYWORD), 1);
        assert_eq!(count(&doc, ext::EXPRESSION), 1);
        assert_eq!(count(&doc, ext::EFFECTIVE_PERIOD), 1);
        assert_eq!(count(&doc, ext::RULES_TEXT), 0);
    }

    #[test]
    fn test_name_identity_is_untouched() {
        let doc = ResourceAssembler::new(FhirVersion::R4).assemble(
            &unit(),
            &OrganizationalMetadata::default(),
            &code_list(),
        );
        assert_eq!(doc.name.as_deref(), Some("opioid-analgesics"));
    }
}
