//! FHIR ValueSet generation for Rust
//!
//! This crate turns an authoring workbook into FHIR ValueSet resources and
//! packages FHIR resources into size-bounded transaction bundles:
//! - Workbook loading (`.xlsx`, `.xls`, `.ods`)
//! - Organizational/unit metadata and code-list resolution
//! - CPG computable/executable tagging for R4
//! - JSON and XML output for R4 and STU3
//! - Transaction bundle assembly, splitting and posting
//!
//! # Example
//!
//! ```ignore
//! use octofhir_valueset::{FhirVersion, Generator, table};
//!
//! let workbook = table::reader::open("opioid-cds.xlsx")?;
//! let report = Generator::new(FhirVersion::R4).generate(&workbook)?;
//! println!("{} value sets", report.documents.len());
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_valueset_diagnostics as diagnostics;
pub use octofhir_valueset_engine as engine;
pub use octofhir_valueset_model as model;
pub use octofhir_valueset_table as table;

// Convenience re-exports
pub use octofhir_valueset_diagnostics::{Result, ValueSetError};
pub use octofhir_valueset_engine::{BundleAssembler, Generator, ResourceAssembler, split};
pub use octofhir_valueset_model::{Encoding, FhirVersion, ResourceDocument, TransactionBundle};

pub mod loader;
pub mod writer;

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
