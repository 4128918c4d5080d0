//! Error types for LintPilot

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for LintPilot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for LintPilot operations
///
/// Only [`Error::Staging`] ever escapes [`crate::Analyzer::analyze`]. The
/// tool-level variants are absorbed by the analyzer, logged, and recorded in
/// the per-tool reports of the result.
#[derive(Error, Debug)]
pub enum Error {
    /// The scratch workspace could not be created or populated
    #[error("Staging error at {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The analyzer binary for a language could not be located
    #[error("{tool} is not available")]
    ToolUnavailable { tool: String },

    /// The analyzer could not be run to completion
    #[error("{tool} failed: {reason}")]
    ToolExecution { tool: String, reason: String },

    /// The analyzer output could not be turned into issues
    #[error("Could not parse {tool} output: {reason}")]
    OutputParse { tool: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn staging(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Staging {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn execution(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ToolExecution {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::OutputParse {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts an analysis run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Staging { .. })
    }
}
