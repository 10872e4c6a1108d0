//! Error handling for macro settings and expansion reports
//!
//! The expansion core never fails. Errors only come from the surfaces around
//! it: reading and writing settings, and editing the definition list by index
//! or by name. Degraded expansions are reported as warnings next to the
//! produced text.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Settings and session error type
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read or written
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Settings JSON is malformed or has the wrong shape
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Settings in another format are malformed or could not be rendered
    #[error("Invalid settings {format}: {message}")]
    Format {
        format: &'static str,
        message: String,
    },
    /// The file extension does not name a known settings format
    #[error("Unsupported settings format '{extension}'")]
    UnsupportedFormat { extension: String },
    /// A definition index past the end of the list
    #[error("No macro definition at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// A name that matches no definition
    #[error("Unknown macro '{0}'")]
    UnknownMacro(String),
}

impl SettingsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SettingsError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(format: &'static str, err: impl fmt::Display) -> Self {
        SettingsError::Format {
            format,
            message: err.to_string(),
        }
    }
}

/// Result type for settings and session operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Kind of warning generated during expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The invocation passed fewer arguments than the template uses
    MissingArgument,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MissingArgument => write!(f, "missing argument"),
        }
    }
}

/// Expansion warning (non-fatal issue)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionWarning {
    pub kind: WarningKind,
    /// Name of the macro being expanded
    pub macro_name: String,
    pub message: String,
}

impl ExpansionWarning {
    pub fn missing_argument(macro_name: &str, index: usize, given: usize) -> Self {
        Self {
            kind: WarningKind::MissingArgument,
            macro_name: macro_name.to_string(),
            message: format!("placeholder ${} has no argument ({} given)", index, given),
        }
    }
}

impl fmt::Display for ExpansionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.macro_name, self.message)
    }
}

/// Expansion output with optional warnings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionOutput {
    /// The expanded text
    pub content: String,
    /// Any warnings generated during expansion
    pub warnings: Vec<ExpansionWarning>,
}

impl ExpansionOutput {
    pub fn new(content: String) -> Self {
        Self {
            content,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(content: String, warnings: Vec<ExpansionWarning>) -> Self {
        Self { content, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_names_path() {
        let err = SettingsError::io(
            "/tmp/macros.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/macros.json"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_index_error_display() {
        let err = SettingsError::IndexOutOfRange { index: 4, len: 2 };
        let msg = err.to_string();
        assert!(msg.contains("index 4"));
        assert!(msg.contains("has 2"));
    }

    #[test]
    fn test_missing_argument_warning() {
        let warning = ExpansionWarning::missing_argument("greet", 1, 1);
        assert_eq!(warning.kind, WarningKind::MissingArgument);
        let msg = warning.to_string();
        assert!(msg.contains("missing argument"));
        assert!(msg.contains("greet"));
        assert!(msg.contains("$1"));
    }

    #[test]
    fn test_expansion_output() {
        let output = ExpansionOutput::new("hello".to_string());
        assert!(!output.has_warnings());

        let output_with_warn = ExpansionOutput::with_warnings(
            "hello undefined".to_string(),
            vec![ExpansionWarning::missing_argument("hello", 0, 0)],
        );
        assert!(output_with_warn.has_warnings());
    }
}
