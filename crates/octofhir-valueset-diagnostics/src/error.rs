//! Value set error types

use crate::{
    CellLocation, ErrorCode, VS0001, VS0002, VS0100, VS0200, VS0201, VS0300, VS0301, VS0302,
    VS0401,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the unit or document cannot be produced
    Error,
    /// Warning - something was skipped but the run continues
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Workbook location
    pub location: Option<CellLocation>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: CellLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render with terminal colors
    #[cfg(feature = "colored")]
    pub fn render_colored(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
        };
        let mut out = format!("{}[{}]: {}", severity, self.code, self.message);
        if let Some(loc) = &self.location {
            out.push_str(&format!(" at {}", loc.to_string().cyan()));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".green(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Main value set error type
#[derive(Debug, Clone, Error)]
pub enum ValueSetError {
    /// A referenced sheet does not exist in the workbook
    #[error("{code}: sheet '{sheet}' not found in workbook", code = VS0001)]
    MissingSheet { sheet: String },

    /// The workbook file could not be opened or decoded
    #[error("{code}: {message}", code = VS0002)]
    Workbook { message: String },

    /// Row content violates a resolution rule
    #[error("{code}: {message}", code = VS0100)]
    Validation {
        message: String,
        location: Option<CellLocation>,
    },

    /// Target FHIR version is not recognized
    #[error("{code}: unsupported FHIR version: {version}", code = VS0200)]
    UnsupportedVersion { version: String },

    /// A resource does not have the shape an operation expects
    #[error("{code}: {message}", code = VS0201)]
    InvalidResource { message: String },

    /// Serialization to or from JSON/XML failed
    #[error("{code}: {message}", code = VS0300)]
    Serialization { message: String },

    /// File output failed
    #[error("{code}: {path}: {message}", code = VS0301)]
    Io { path: String, message: String },

    /// Posting to a remote FHIR endpoint failed
    #[error("{code}: error posting to {endpoint}: {message}", code = VS0302)]
    Transport { endpoint: String, message: String },

    /// Invalid configuration
    #[error("{code}: {message}", code = VS0401)]
    Config { message: String },
}

impl ValueSetError {
    /// Create a missing sheet error
    pub fn missing_sheet(sheet: impl Into<String>) -> Self {
        Self::MissingSheet {
            sheet: sheet.into(),
        }
    }

    /// Create a validation error pointing at a workbook location
    pub fn validation_at(message: impl Into<String>, location: CellLocation) -> Self {
        Self::Validation {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Create an unsupported version error
    pub fn unsupported_version(version: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            version: version.into(),
        }
    }

    /// Create an invalid resource error
    pub fn invalid_resource(message: impl Into<String>) -> Self {
        Self::InvalidResource {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an I/O error for a path
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingSheet { .. } => VS0001,
            Self::Workbook { .. } => VS0002,
            Self::Validation { .. } => VS0100,
            Self::UnsupportedVersion { .. } => VS0200,
            Self::InvalidResource { .. } => VS0201,
            Self::Serialization { .. } => VS0300,
            Self::Io { .. } => VS0301,
            Self::Transport { .. } => VS0302,
            Self::Config { .. } => VS0401,
        }
    }

    /// Get the location if available
    pub fn location(&self) -> Option<&CellLocation> {
        match self {
            Self::Validation { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    /// Convert to an error diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        self.diagnostic(Severity::Error)
    }

    /// Convert to a warning diagnostic, for failures a run continues past
    pub fn to_warning(&self) -> Diagnostic {
        self.diagnostic(Severity::Warning)
    }

    fn diagnostic(&self, severity: Severity) -> Diagnostic {
        let message = match self {
            Self::MissingSheet { sheet } => format!("sheet '{sheet}' not found in workbook"),
            Self::UnsupportedVersion { version } => format!("unsupported FHIR version: {version}"),
            Self::Io { path, message } => format!("{path}: {message}"),
            Self::Transport { endpoint, message } => {
                format!("error posting to {endpoint}: {message}")
            }
            Self::Workbook { message }
            | Self::Validation { message, .. }
            | Self::InvalidResource { message }
            | Self::Serialization { message }
            | Self::Config { message } => message.clone(),
        };

        let code = self.code();
        let mut diag = Diagnostic::error(code, message);
        diag.severity = severity;
        if let Some(loc) = self.location() {
            diag = diag.with_location(loc.clone());
        }
        if let Some(help) = code.info().help {
            diag = diag.with_help(help);
        }
        diag
    }
}

impl From<serde_json::Error> for ValueSetError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
