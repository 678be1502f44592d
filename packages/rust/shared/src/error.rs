//! Error types for brochure.
//!
//! Library crates use [`BrochureError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all brochure operations.
#[derive(Debug, thiserror::Error)]
pub enum BrochureError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP failure while fetching a page.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Model service transport failure (connection, HTTP error, bad envelope).
    #[error("model error: {0}")]
    Model(String),

    /// Model reply could not be parsed into the requested link structure,
    /// even after the corrective retry.
    #[error("relevance parse error: {message}")]
    RelevanceParse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BrochureError>;

impl BrochureError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a relevance parse error from any displayable message.
    pub fn relevance_parse(msg: impl Into<String>) -> Self {
        Self::RelevanceParse {
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
        let err = BrochureError::config("missing model name");
        assert_eq!(err.to_string(), "config error: missing model name");

        let err = BrochureError::Fetch("https://example.com: HTTP 500".into());
        assert!(err.to_string().contains("HTTP 500"));

        let err = BrochureError::relevance_parse("expected a links array");
        assert!(err.to_string().starts_with("relevance parse error"));
    }
}
