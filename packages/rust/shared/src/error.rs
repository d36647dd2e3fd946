//! Error types for AssetLens.
//!
//! Library crates use [`AssetLensError`] via `thiserror`.
//! The server binary wraps this with `color-eyre` for CLI diagnostics and maps
//! it onto HTTP status codes at the route boundary.

use std::path::PathBuf;

/// Top-level error type for all AssetLens operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetLensError {
    /// Missing or malformed caller input (HTTP 400).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Missing credential or unreadable configuration. Never retried.
    #[error("config error: {message}")]
    Config { message: String },

    /// The scraping provider rejected the request or returned no payload.
    /// The message carries the upstream body verbatim.
    #[error("provider error: {message}")]
    Provider { message: String },

    /// Transport failure talking to the provider or a remote asset service.
    #[error("network error: {0}")]
    Network(String),

    /// An upstream response could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AssetLensError>;

impl AssetLensError {
    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a provider error from any displayable message.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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

    /// Whether the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = AssetLensError::config("FIRECRAWL_API_KEY environment variable is not set");
        assert_eq!(
            err.to_string(),
            "config error: FIRECRAWL_API_KEY environment variable is not set"
        );

        let err = AssetLensError::provider(r#"{"error":"rate limited"}"#);
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn only_validation_is_client_error() {
        assert!(AssetLensError::validation("HTML content is required").is_client_error());
        assert!(!AssetLensError::config("no key").is_client_error());
        assert!(!AssetLensError::provider("boom").is_client_error());
        assert!(!AssetLensError::Network("refused".into()).is_client_error());
    }
}
