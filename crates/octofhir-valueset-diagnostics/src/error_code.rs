//! Error codes following a structured numbering system
//!
//! Error code ranges:
//! - VS0001-VS0099: Workbook errors (sheets, file access)
//! - VS0100-VS0199: Validation errors (code lists, metadata)
//! - VS0200-VS0299: Model errors (FHIR version, resource shape)
//! - VS0300-VS0399: Output errors (serialization, file output, transport)
//! - VS0400-VS0499: System errors (configuration)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a workbook error (0001-0099)
    pub const fn is_workbook_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a validation error (0100-0199)
    pub const fn is_validation_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a model error (0200-0299)
    pub const fn is_model_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is an output error (0300-0399)
    pub const fn is_output_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VS{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Workbook errors (0001-0099)
    map.insert(
        1,
        ErrorInfo::new("Missing sheet")
            .with_help("Check the unit list on the first sheet against the workbook tabs"),
    );
    map.insert(2, ErrorInfo::new("Unreadable workbook"));

    // Validation errors (0100-0199)
    map.insert(
        100,
        ErrorInfo::new("Code list validation failed")
            .with_help("The first code row of every code list must name its code system"),
    );

    // Model errors (0200-0299)
    map.insert(
        200,
        ErrorInfo::new("Unsupported FHIR version").with_help("Supported versions are r4 and stu3"),
    );
    map.insert(201, ErrorInfo::new("Invalid resource"));

    // Output errors (0300-0399)
    map.insert(300, ErrorInfo::new("Serialization failed"));
    map.insert(301, ErrorInfo::new("I/O error"));
    map.insert(302, ErrorInfo::new("Transport failed"));

    // System errors (0400-0499)
    map.insert(401, ErrorInfo::new("Configuration error"));

    map
});

// Convenience constants for common error codes
pub const VS0001: ErrorCode = ErrorCode::new(1);
pub const VS0002: ErrorCode = ErrorCode::new(2);
pub const VS0100: ErrorCode = ErrorCode::new(100);
pub const VS0200: ErrorCode = ErrorCode::new(200);
pub const VS0201: ErrorCode = ErrorCode::new(201);
pub const VS0300: ErrorCode = ErrorCode::new(300);
pub const VS0301: ErrorCode = ErrorCode::new(301);
pub const VS0302: ErrorCode = ErrorCode::new(302);
pub const VS0401: ErrorCode = ErrorCode::new(401);
