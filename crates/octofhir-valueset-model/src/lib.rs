//! FHIR resource model for generated value sets
//!
//! This crate provides:
//! - The `ValueSet` resource document and its compose/expansion sections
//! - Transaction bundles and their PUT entries
//! - Version-specific representation (STU3, R4) behind one capability trait
//! - JSON and XML serialization

pub mod bundle;
pub mod document;
pub mod serialize;
pub mod version;

pub use bundle::*;
pub use document::*;
pub use serialize::{Encoding, JsonSerializer, ResourceSerializer, SerializeError, XmlSerializer};
pub use version::{FhirVersion, VersionModel, model_for};
