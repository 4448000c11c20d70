//! Value set generation diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the
//! workbook reader, the resource model and the generation engine,
//! including error codes, cell locations, and diagnostic reporting.

mod error;
mod error_code;
mod location;

pub use error::*;
pub use error_code::*;
pub use location::*;

/// Result type for value set operations
pub type Result<T> = std::result::Result<T, ValueSetError>;
