//! Content loading errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationIssue;

/// A story document could not be loaded or failed validation.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file extension does not name a supported format.
    #[error("unsupported story format for `{0}` (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),

    /// YAML syntax or shape error.
    #[error("invalid YAML story: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or shape error.
    #[error("invalid JSON story: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but failed validation.
    #[error("story failed validation with {} issue(s); first: {}", .0.len(), first_issue(.0))]
    Invalid(Vec<ValidationIssue>),
}

fn first_issue(issues: &[ValidationIssue]) -> String {
    issues
        .first()
        .map_or_else(|| "none".to_owned(), ToString::to_string)
}
