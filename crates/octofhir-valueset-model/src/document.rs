//! ValueSet resource document
//!
//! The structs here serialize directly to FHIR JSON (camelCase, empty
//! collections and absent optionals omitted). Version differences are
//! applied afterwards by a [`crate::VersionModel`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resource type marker, serialized as the `resourceType` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResourceType {
    #[default]
    ValueSet,
    Bundle,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::ValueSet => "ValueSet",
            ResourceType::Bundle => "Bundle",
        }
    }
}

/// A value set as produced by the generator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDocument {
    pub resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<ContactDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jurisdiction: Vec<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compose: Option<Compose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion: Option<Expansion>,
}

impl ResourceDocument {
    /// Create an empty value set with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn has_compose(&self) -> bool {
        self.compose.is_some()
    }

    pub fn has_expansion(&self) -> bool {
        self.expansion.is_some()
    }

    /// Declared profiles, empty when there is no `meta`
    pub fn profiles(&self) -> &[String] {
        self.meta.as_ref().map(|m| m.profile.as_slice()).unwrap_or(&[])
    }

    pub fn add_profile(&mut self, profile: impl Into<String>) {
        self.meta.get_or_insert_with(Meta::default).profile.push(profile.into());
    }

    pub fn add_extension(&mut self, extension: Extension) {
        self.extension.push(extension);
    }

    /// Extensions with the given URL, in document order
    pub fn extensions_by_url<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a Extension> {
        self.extension.iter().filter(move |e| e.url == url)
    }

    /// Expansion contents as code entries, empty without an expansion
    pub fn expansion_entries(&self) -> Vec<CodeEntry> {
        self.expansion
            .as_ref()
            .map(|e| e.contains.iter().map(CodeEntry::from).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
}

/// A FHIR extension with a single typed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub url: String,
    #[serde(flatten)]
    pub value: ExtensionValue,
}

impl Extension {
    pub fn new(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            value,
        }
    }

    pub fn code(url: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(url, ExtensionValue::Code(code.into()))
    }

    pub fn string(url: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(url, ExtensionValue::String(value.into()))
    }
}

/// The `value[x]` choice of an extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtensionValue {
    #[serde(rename = "valueCode")]
    Code(String),
    #[serde(rename = "valueString")]
    String(String),
    #[serde(rename = "valueMarkdown")]
    Markdown(String),
    #[serde(rename = "valueDate")]
    Date(String),
    #[serde(rename = "valuePeriod")]
    Period(Period),
    #[serde(rename = "valueExpression")]
    Expression(Expression),
}

impl ExtensionValue {
    /// The value as text, for the primitive variants
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtensionValue::Code(s)
            | ExtensionValue::String(s)
            | ExtensionValue::Markdown(s)
            | ExtensionValue::Date(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Period {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// FHIR `Expression` datatype
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Expression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Expression {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.name.is_none()
            && self.language.is_none()
            && self.expression.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Intensional definition: the code systems codes are drawn from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Compose {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<ComposeInclude>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComposeInclude {
    pub system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Extensional definition: every code, captured at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expansion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<ExpansionContains>,
}

impl Expansion {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            identifier: None,
            timestamp,
            contains: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpansionContains {
    pub system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// One resolved code-list row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub code: String,
    pub description: Option<String>,
    pub active: bool,
    pub system: String,
    pub version: Option<String>,
}

impl From<&CodeEntry> for ExpansionContains {
    fn from(entry: &CodeEntry) -> Self {
        Self {
            system: entry.system.clone(),
            inactive: (!entry.active).then_some(true),
            version: entry.version.clone(),
            code: entry.code.clone(),
            display: entry.description.clone(),
        }
    }
}

impl From<&ExpansionContains> for CodeEntry {
    fn from(contains: &ExpansionContains) -> Self {
        Self {
            code: contains.code.clone(),
            description: contains.display.clone(),
            active: !contains.inactive.unwrap_or(false),
            system: contains.system.clone(),
            version: contains.version.clone(),
        }
    }
}
