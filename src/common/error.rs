//! Error types for apicase
//!
//! Fixture-level errors abort a run before any case executes. Row-level
//! errors are turned into failed cases by the runner.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for apicase
#[derive(Error, Debug)]
pub enum Error {
    // === Fixture Errors ===
    #[error("Fixture file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Unsupported fixture format '{0}'. Supported formats: .xls, .xlsx")]
    UnsupportedFormat(String),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration key '{0}' is missing. Add it to config/config.yaml")]
    MissingConfigKey(&'static str),

    #[error("Configuration key '{key}' is invalid: {reason}")]
    InvalidConfigValue { key: &'static str, reason: String },

    // === Request Errors ===
    #[error("Request failed: {0}")]
    Request(String),

    // === Test Case Errors ===
    #[error("Row has no '{0}' column")]
    MissingField(String),

    #[error("Invalid value for '{field}': {value}")]
    InvalidField { field: String, value: String },

    #[error("Test assertion failed: {0}")]
    TestAssertion(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a fixture not found error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an invalid configuration value error
    pub fn invalid_config(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            key,
            reason: reason.into(),
        }
    }

    /// Create an invalid row field error
    pub fn invalid_field(field: &str, value: impl ToString) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Whether this error invalidates the whole fixture rather than one row
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::UnsupportedFormat(_) | Error::Workbook(_)
        )
    }
}

impl From<calamine::Error> for Error {
    fn from(e: calamine::Error) -> Self {
        Error::Workbook(e.to_string())
    }
}

impl From<calamine::XlsxError> for Error {
    fn from(e: calamine::XlsxError) -> Self {
        Error::Workbook(e.to_string())
    }
}

impl From<calamine::XlsError> for Error {
    fn from(e: calamine::XlsError) -> Self {
        Error::Workbook(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
