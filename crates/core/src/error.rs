//! Error types for the Orangutan domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Orangutan operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors raised by a single tool execution.
///
/// These never escape the tool loop: the registry renders them as
/// `[Error] <tool> failed: <message>` result text.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Path '{path}' escapes the project directory.")]
    PathEscape { path: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{reason}")]
    ExecutionFailed { reason: String },
}

impl ToolError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 404,
            message: "model 'x' not found".into(),
        });
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("model 'x' not found"));
    }

    #[test]
    fn path_escape_names_the_offending_path() {
        let err = ToolError::PathEscape {
            path: "../../etc/passwd".into(),
        };
        assert_eq!(
            err.to_string(),
            "Path '../../etc/passwd' escapes the project directory."
        );
    }

    #[test]
    fn invalid_parameter_helper() {
        let err = ToolError::invalid("offset", "expected a non-negative integer");
        assert!(err.to_string().contains("offset"));
        assert!(err.to_string().contains("non-negative"));
    }
}
