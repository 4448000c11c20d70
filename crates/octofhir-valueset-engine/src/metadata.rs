//! Metadata resolution
//!
//! Both metadata sheets are label/value lists: column A holds a label from a
//! fixed vocabulary, column B the value. Labels outside the vocabulary are
//! ignored so authors can add rows without breaking older tooling.

use octofhir_valueset_table::Sheet;

/// Title the authoring template ships with; a unit still carrying it was never filled in
pub const TEMPLATE_PLACEHOLDER_TITLE: &str = "only fill this out";

const LABEL_COLUMN: usize = 0;
const VALUE_COLUMN: usize = 1;

/// Publisher-wide metadata, one per workbook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationalMetadata {
    pub canonical_url_base: Option<String>,
    pub copyright: Option<String>,
    pub jurisdiction: Option<String>,
    pub publisher: Option<String>,
    pub approval_date: Option<String>,
    pub effective_date: Option<String>,
    pub last_review_date: Option<String>,
    pub author_name: Option<String>,
    pub author_telecom_system: Option<String>,
    pub author_telecom_value: Option<String>,
    /// SNOMED CT edition/version applied to SNOMED compose includes
    pub terminology_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrganizationalKey {
    CanonicalUrl,
    Copyright,
    Jurisdiction,
    Publisher,
    ApprovalDate,
    EffectiveDate,
    LastReviewDate,
    AuthorName,
    AuthorTelecomSystem,
    AuthorTelecomValue,
    TerminologyVersion,
}

impl OrganizationalKey {
    fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "Canonical URL" => Self::CanonicalUrl,
            "Copyright" => Self::Copyright,
            "Jurisdiction" => Self::Jurisdiction,
            "Publisher" => Self::Publisher,
            "approvalDate" => Self::ApprovalDate,
            "effectiveDate" => Self::EffectiveDate,
            "lastReviewDate" => Self::LastReviewDate,
            "author.name" => Self::AuthorName,
            "author.telecom.system" => Self::AuthorTelecomSystem,
            "author.telecom.value" => Self::AuthorTelecomValue,
            "SNOMED CT" => Self::TerminologyVersion,
            _ => return None,
        })
    }
}

impl OrganizationalMetadata {
    fn set(&mut self, key: OrganizationalKey, value: Option<String>) {
        let field = match key {
            OrganizationalKey::CanonicalUrl => &mut self.canonical_url_base,
            OrganizationalKey::Copyright => &mut self.copyright,
            OrganizationalKey::Jurisdiction => &mut self.jurisdiction,
            OrganizationalKey::Publisher => &mut self.publisher,
            OrganizationalKey::ApprovalDate => &mut self.approval_date,
            OrganizationalKey::EffectiveDate => &mut self.effective_date,
            OrganizationalKey::LastReviewDate => &mut self.last_review_date,
            OrganizationalKey::AuthorName => &mut self.author_name,
            OrganizationalKey::AuthorTelecomSystem => &mut self.author_telecom_system,
            OrganizationalKey::AuthorTelecomValue => &mut self.author_telecom_value,
            OrganizationalKey::TerminologyVersion => &mut self.terminology_version,
        };
        *field = value;
    }
}

/// Per value set metadata, one per unit sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitMetadata {
    pub id: Option<String>,
    pub name: Option<String>,
    pub keyword: Option<String>,
    pub rules_text: Option<String>,
    pub expression_description: Option<String>,
    pub expression_name: Option<String>,
    pub expression_language: Option<String>,
    pub expression_expression: Option<String>,
    pub warning: Option<String>,
    pub version: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub experimental: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub purpose: Option<String>,
    pub purpose_clinical_focus: Option<String>,
    pub purpose_data_element_scope: Option<String>,
    pub purpose_inclusion_criteria: Option<String>,
    pub purpose_exclusion_criteria: Option<String>,
    /// Raw `compose` cell; present only when longer than one character
    pub compose: Option<String>,
}

impl UnitMetadata {
    /// Whether the unit asks for an intensional (compose) definition
    pub fn compose_intent(&self) -> bool {
        self.compose.is_some()
    }

    /// Template rows nobody filled in: no title, or the placeholder title
    pub fn is_unpopulated_template(&self) -> bool {
        match self.title.as_deref() {
            None => true,
            Some(title) => title == TEMPLATE_PLACEHOLDER_TITLE,
        }
    }

    /// `experimental` parsed as a boolean; anything but true/false is unknown
    pub fn experimental_flag(&self) -> Option<bool> {
        match self.experimental.as_deref()?.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKey {
    Id,
    Keyword,
    RulesText,
    ExpressionDescription,
    ExpressionName,
    ExpressionLanguage,
    ExpressionExpression,
    Warning,
    Version,
    Title,
    Status,
    Experimental,
    Date,
    Description,
    Purpose,
    PurposeClinicalFocus,
    PurposeDataElementScope,
    PurposeInclusionCriteria,
    PurposeExclusionCriteria,
    Compose,
}

impl UnitKey {
    // No `name` label: the name always follows the id.
    fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "id" => Self::Id,
            "keyword" => Self::Keyword,
            "rules-text" => Self::RulesText,
            "expression.description" => Self::ExpressionDescription,
            "expression.name" => Self::ExpressionName,
            "expression.language" => Self::ExpressionLanguage,
            "expression.expression" => Self::ExpressionExpression,
            "warning" => Self::Warning,
            "version" => Self::Version,
            "title" => Self::Title,
            "status" => Self::Status,
            "experimental" => Self::Experimental,
            "date" => Self::Date,
            "description" => Self::Description,
            "purpose" => Self::Purpose,
            "purpose.ClinicalFocus" => Self::PurposeClinicalFocus,
            "purpose.DataElementScope" => Self::PurposeDataElementScope,
            "purpose.InclusionCriteria" => Self::PurposeInclusionCriteria,
            "purpose.ExclusionCriteria" => Self::PurposeExclusionCriteria,
            "compose" => Self::Compose,
            _ => return None,
        })
    }
}

impl UnitMetadata {
    fn set(&mut self, key: UnitKey, value: Option<String>) {
        let field = match key {
            UnitKey::Id => {
                let id = value.map(|v| v.to_lowercase());
                self.name = id.clone();
                self.id = id;
                return;
            }
            UnitKey::Compose => {
                self.compose = value.filter(|v| v.chars().count() > 1);
                return;
            }
            UnitKey::Keyword => &mut self.keyword,
            UnitKey::RulesText => &mut self.rules_text,
            UnitKey::ExpressionDescription => &mut self.expression_description,
            UnitKey::ExpressionName => &mut self.expression_name,
            UnitKey::ExpressionLanguage => &mut self.expression_language,
            UnitKey::ExpressionExpression => &mut self.expression_expression,
            UnitKey::Warning => &mut self.warning,
            UnitKey::Version => &mut self.version,
            UnitKey::Title => &mut self.title,
            UnitKey::Status => &mut self.status,
            UnitKey::Experimental => &mut self.experimental,
            UnitKey::Date => &mut self.date,
            UnitKey::Description => &mut self.description,
            UnitKey::Purpose => &mut self.purpose,
            UnitKey::PurposeClinicalFocus => &mut self.purpose_clinical_focus,
            UnitKey::PurposeDataElementScope => &mut self.purpose_data_element_scope,
            UnitKey::PurposeInclusionCriteria => &mut self.purpose_inclusion_criteria,
            UnitKey::PurposeExclusionCriteria => &mut self.purpose_exclusion_criteria,
        };
        *field = value;
    }
}

/// Resolve the publisher-wide metadata from the first sheet
pub fn resolve_organizational(sheet: &Sheet) -> OrganizationalMetadata {
    let mut meta = OrganizationalMetadata::default();
    for row in sheet.rows(0) {
        let Some(label) = row.cell_as_string(LABEL_COLUMN) else {
            continue;
        };
        if let Some(key) = OrganizationalKey::from_label(&label) {
            meta.set(key, row.cell_as_string(VALUE_COLUMN));
        }
    }
    meta
}

/// Resolve a unit sheet.
///
/// Labels may be text or numbers; numbers are matched by their text form.
pub fn resolve_unit(sheet: &Sheet) -> UnitMetadata {
    let mut meta = UnitMetadata::default();
    for row in sheet.rows(0) {
        let Some(label) = row.cell_as_string(LABEL_COLUMN) else {
            continue;
        };
        if let Some(key) = UnitKey::from_label(&label) {
            meta.set(key, row.cell_as_string(VALUE_COLUMN));
        }
    }
    tracing::debug!(sheet = sheet.name(), id = ?meta.id, "resolved unit metadata");
    meta
}
