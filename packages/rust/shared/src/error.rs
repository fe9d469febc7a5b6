//! Error types for ContactScout.
//!
//! Library crates use [`ContactScoutError`] via `thiserror` for failures that
//! abort a whole run (missing input, undecodable file, unreadable header).
//! Per-row lookup failures have their own type in `contactscout-lookup` and
//! never surface here.
//! App crates (cli) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ContactScout operations.
#[derive(Debug, thiserror::Error)]
pub enum ContactScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The input file does not exist.
    #[error("input file not found: {path:?}")]
    InputNotFound { path: PathBuf },

    /// None of the candidate text encodings could decode the input.
    #[error("could not decode {path:?} with any of the tried encodings: {}", tried.join(", "))]
    Decode { path: PathBuf, tried: Vec<String> },

    /// The header row is missing or unreadable.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// HTTP client setup error.
    #[error("network error: {0}")]
    Network(String),

    /// CSV reading or writing error.
    #[error("csv error: {0}")]
    Csv(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad row window, unknown encoding, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ContactScoutError>;

impl ContactScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a schema error from any displayable message.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ContactScoutError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = ContactScoutError::validation("end_row 2 is before start_row 5");
        assert!(err.to_string().contains("end_row 2"));
    }

    #[test]
    fn decode_error_lists_encodings() {
        let err = ContactScoutError::Decode {
            path: PathBuf::from("companies.csv"),
            tried: vec!["utf-8".into(), "latin1".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("companies.csv"));
        assert!(msg.contains("utf-8, latin1"));
    }
}
