//! Error types for schema building and query execution.

use thiserror::Error;

/// Errors that can occur while compiling a schema.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Declarations violate a registration contract.
    #[error(transparent)]
    Metadata(#[from] typegraph_core::Error),

    /// The engine rejected the assembled schema.
    #[error("Failed to build GraphQL schema: {0}")]
    Engine(String),

    /// Invalid build configuration.
    #[error("Invalid schema configuration: {0}")]
    Config(String),
}

impl BuildError {
    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Metadata(err) => err.code(),
            Self::Engine(_) => "SCHEMA_BUILD_FAILED",
            Self::Config(_) => "INVALID_CONFIG",
        }
    }

    /// The underlying contract violation, if any.
    pub fn metadata(&self) -> Option<&typegraph_core::Error> {
        match self {
            Self::Metadata(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors returned from [`QuerySession::execute`](crate::QuerySession::execute).
#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine reported one or more errors; partial data is discarded.
    #[error("{}", messages.join("\n"))]
    Execution { messages: Vec<String> },

    /// Variable substitution failed.
    #[error("Invalid variables: {0}")]
    Variables(String),

    /// The result could not be converted.
    #[error("Failed to decode result: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SessionError {
    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Execution { .. } => "EXECUTION_FAILED",
            Self::Variables(_) => "INVALID_VARIABLES",
            Self::Decode(_) => "DECODE_FAILED",
        }
    }

    /// Engine error messages, empty for non-execution errors.
    pub fn messages(&self) -> &[String] {
        match self {
            Self::Execution { messages } => messages,
            _ => &[],
        }
    }
}
