//! Resource serialization
//!
//! This module provides JSON and XML serialization for FHIR resources held
//! as JSON values (value sets after version representation, bundles,
//! arbitrary resources read from disk).

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use octofhir_valueset_diagnostics::ValueSetError;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::{Map, Value};

use crate::{ResourceDocument, TransactionBundle};

/// FHIR XML namespace
pub const FHIR_NAMESPACE: &str = "http://hl7.org/fhir";

/// Narrative XHTML element, carried as a markup string in JSON
const NARRATIVE_DIV: &str = "div";

/// Errors that can occur during serialization
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML serialization error
    #[error("XML error: {0}")]
    Xml(String),
}

impl From<SerializeError> for ValueSetError {
    fn from(err: SerializeError) -> Self {
        ValueSetError::serialization(err.to_string())
    }
}

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Json,
    Xml,
}

impl Encoding {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Xml => "xml",
        }
    }

    /// MIME type used when posting
    pub fn content_type(&self) -> &'static str {
        match self {
            Encoding::Json => "application/fhir+json",
            Encoding::Xml => "application/fhir+xml",
        }
    }

    /// Pretty-printing serializer for this encoding
    pub fn serializer(&self) -> Box<dyn ResourceSerializer> {
        match self {
            Encoding::Json => Box::new(JsonSerializer::pretty()),
            Encoding::Xml => Box::new(XmlSerializer::pretty()),
        }
    }
}

impl FromStr for Encoding {
    type Err = ValueSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Encoding::Json),
            "xml" => Ok(Encoding::Xml),
            other => Err(ValueSetError::config(format!(
                "unsupported encoding: {other}. Use 'json' or 'xml'"
            ))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Trait for resource serializers
pub trait ResourceSerializer: Send + Sync {
    /// Serialize a JSON resource to a string
    fn serialize(&self, resource: &Value) -> Result<String, SerializeError>;
}

/// JSON serializer
#[derive(Debug, Default, Clone)]
pub struct JsonSerializer {
    /// Whether to produce pretty-printed output
    pub pretty: bool,
}

impl JsonSerializer {
    /// Create a new JSON serializer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new JSON serializer with pretty-printing enabled
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Parse a value set
    pub fn deserialize_document(&self, input: &str) -> Result<ResourceDocument, SerializeError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse a transaction bundle
    pub fn deserialize_bundle(&self, input: &str) -> Result<TransactionBundle, SerializeError> {
        Ok(serde_json::from_str(input)?)
    }
}

impl ResourceSerializer for JsonSerializer {
    fn serialize(&self, resource: &Value) -> Result<String, SerializeError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(resource)?
        } else {
            serde_json::to_string(resource)?
        };
        Ok(text)
    }
}

/// XML serializer
///
/// Follows the FHIR XML conventions: primitives become `value` attributes,
/// extension URLs become `url` attributes, repeating elements repeat the
/// tag, and contained resources are wrapped in an element named after their
/// resource type.
#[derive(Debug, Default, Clone)]
pub struct XmlSerializer {
    /// Whether to produce pretty-printed output
    pub pretty: bool,
}

impl XmlSerializer {
    /// Create a new XML serializer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new XML serializer with pretty-printing enabled
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn write_resource<W: Write>(
        &self,
        writer: &mut Writer<W>,
        resource: &Value,
    ) -> Result<(), SerializeError> {
        let obj = resource
            .as_object()
            .ok_or_else(|| SerializeError::Xml("resource is not a JSON object".to_string()))?;
        let resource_type = obj
            .get("resourceType")
            .and_then(Value::as_str)
            .ok_or_else(|| SerializeError::Xml("resource has no resourceType".to_string()))?;

        let mut start = BytesStart::new(resource_type);
        start.push_attribute(("xmlns", FHIR_NAMESPACE));
        write_event(writer, Event::Start(start))?;
        self.write_members(writer, obj, |k| k == "resourceType")?;
        write_event(writer, Event::End(BytesEnd::new(resource_type)))
    }

    /// Write the members of a JSON object as child elements.
    ///
    /// `_name` keys carry the id and extensions of the primitive `name` and
    /// are folded into that element. A narrative `div` is already XHTML and
    /// is written as markup.
    fn write_members<W: Write>(
        &self,
        writer: &mut Writer<W>,
        obj: &Map<String, Value>,
        skip: impl Fn(&str) -> bool,
    ) -> Result<(), SerializeError> {
        for (key, value) in obj.iter().filter(|(k, _)| !skip(k.as_str())) {
            if let Some(base) = key.strip_prefix('_') {
                if !obj.contains_key(base) {
                    self.write_property(writer, base, &Value::Null, Some(value))?;
                }
                continue;
            }
            if let (NARRATIVE_DIV, Value::String(xhtml)) = (key.as_str(), value) {
                write_event(writer, Event::Text(BytesText::from_escaped(xhtml.as_str())))?;
                continue;
            }
            let companion = obj.get(&format!("_{key}"));
            self.write_property(writer, key, value, companion)?;
        }
        Ok(())
    }

    fn write_property<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
        value: &Value,
        companion: Option<&Value>,
    ) -> Result<(), SerializeError> {
        match value {
            Value::Array(items) => {
                let companions = companion.and_then(Value::as_array);
                for (i, item) in items.iter().enumerate() {
                    let item_companion = companions.and_then(|c| c.get(i));
                    self.write_property(writer, name, item, item_companion)?;
                }
                Ok(())
            }
            Value::Null => match companion {
                Some(Value::Array(items)) => {
                    for item in items {
                        self.write_property(writer, name, &Value::Null, Some(item))?;
                    }
                    Ok(())
                }
                Some(Value::Object(ext)) => self.write_primitive(writer, name, None, ext),
                _ => Ok(()),
            },
            Value::Object(obj) if obj.contains_key("resourceType") => {
                write_event(writer, Event::Start(BytesStart::new(name)))?;
                self.write_resource(writer, value)?;
                write_event(writer, Event::End(BytesEnd::new(name)))
            }
            Value::Object(obj) => {
                let mut start = BytesStart::new(name);
                let url = obj.get("url").and_then(Value::as_str);
                let url_is_attribute = is_extension(name) && url.is_some();
                if let Some(url) = url.filter(|_| url_is_attribute) {
                    start.push_attribute(("url", url));
                }

                let skip = |k: &str| url_is_attribute && k == "url";
                if obj.keys().all(|k| skip(k.as_str())) {
                    return write_event(writer, Event::Empty(start));
                }

                write_event(writer, Event::Start(start))?;
                self.write_members(writer, obj, skip)?;
                write_event(writer, Event::End(BytesEnd::new(name)))
            }
            primitive => {
                let text = match primitive {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let empty = Map::new();
                let ext = companion.and_then(Value::as_object).unwrap_or(&empty);
                self.write_primitive(writer, name, Some(&text), ext)
            }
        }
    }

    /// A primitive element: optional `id` and `value` attributes, with any
    /// extensions from its `_name` companion as children.
    fn write_primitive<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
        value: Option<&str>,
        companion: &Map<String, Value>,
    ) -> Result<(), SerializeError> {
        let mut element = BytesStart::new(name);
        if let Some(id) = companion.get("id").and_then(Value::as_str) {
            element.push_attribute(("id", id));
        }
        if let Some(value) = value {
            element.push_attribute(("value", value));
        }

        let skip = |k: &str| k == "id";
        if companion.keys().all(|k| skip(k.as_str())) {
            return write_event(writer, Event::Empty(element));
        }
        write_event(writer, Event::Start(element))?;
        self.write_members(writer, companion, skip)?;
        write_event(writer, Event::End(BytesEnd::new(name)))
    }
}

fn is_extension(name: &str) -> bool {
    name == "extension" || name == "modifierExtension"
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), SerializeError> {
    writer
        .write_event(event)
        .map_err(|e| SerializeError::Xml(e.to_string()))
}

impl ResourceSerializer for XmlSerializer {
    fn serialize(&self, resource: &Value) -> Result<String, SerializeError> {
        let mut writer = if self.pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };

        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        self.write_resource(&mut writer, resource)?;

        String::from_utf8(writer.into_inner()).map_err(|e| SerializeError::Xml(e.to_string()))
    }
}
