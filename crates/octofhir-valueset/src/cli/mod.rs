//! CLI functionality for the value set tool
//!
//! This module contains all CLI-related functionality including:
//! - Spreadsheet generation
//! - Bundling, splitting and posting
//! - Configuration files
//! - Logging setup
//! - Output formatting

pub mod bundle;
pub mod config;
pub mod generate;
pub mod logging;
pub mod output;
pub mod transport;
