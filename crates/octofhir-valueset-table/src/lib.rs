//! Workbook access for value set authoring spreadsheets
//!
//! This crate provides:
//! - An in-memory workbook model (sheets, rows, cells)
//! - Blank-as-null and numeric-to-text cell coercion
//! - Sheet lookup by name or position
//! - Loading `.xlsx`/`.xls`/`.ods` files (behind the `xlsx` feature)

mod workbook;

#[cfg(feature = "xlsx")]
pub mod reader;

pub use workbook::*;
