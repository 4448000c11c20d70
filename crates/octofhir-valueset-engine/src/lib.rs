//! Value set generation engine
//!
//! This crate provides:
//! - Metadata resolution from label/value sheets
//! - Code-list resolution with sticky column defaults
//! - ValueSet assembly with CPG profile/extension tagging
//! - Transaction bundle assembly and size-bounded splitting
//! - The workbook-to-documents pipeline tying these together
//!
//! # Example
//!
//! ```ignore
//! use octofhir_valueset_engine::{Generator, FhirVersion};
//!
//! let workbook = octofhir_valueset_table::reader::open("opioid-cds.xlsx")?;
//! let report = Generator::new(FhirVersion::R4).generate(&workbook)?;
//! for doc in &report.documents {
//!     println!("{:?}", doc.id);
//! }
//! ```

pub mod assembler;
pub mod bundler;
pub mod codelist;
pub mod metadata;
pub mod pipeline;
pub mod splitter;

pub use assembler::{ResourceAssembler, apply_knowledge_tagging, should_skip};
pub use bundler::BundleAssembler;
pub use codelist::{CodeList, code_list_sheet_name};
pub use metadata::{OrganizationalMetadata, UnitMetadata};
pub use pipeline::{GenerationReport, Generator, UnitFailure, output_name, translate_name};
pub use splitter::split;

pub use octofhir_valueset_model::FhirVersion;
