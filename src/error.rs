//! Error types for release artifact uploads.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for uploader operations
pub type Result<T> = std::result::Result<T, UploadError>;

/// Main error type for all uploader operations
#[derive(Error, Debug)]
pub enum UploadError {
    /// Release store errors raised outside of the guarded upload path
    /// (listing, deleting, resolving a release)
    #[error("Release store error: {0}")]
    Store(#[from] StoreError),

    /// An artifact failed permanently and the policy says to abort the batch
    #[error("Failed to upload artifact {name}. {source}.")]
    ArtifactFailed {
        /// Artifact name
        name: String,
        /// Last error returned for this artifact
        #[source]
        source: StoreError,
    },

    /// Artifact discovery and reading errors
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client setup errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure reported by a release artifact store.
///
/// Mirrors what the remote service tells us: an HTTP status plus a message,
/// or a transport failure where no response arrived at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The service answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Http {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// No response was received
    #[error("{0}")]
    Transport(String),

    /// The service answered with something we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The artifact byte source could not be opened
    #[error("Failed to read artifact content: {0}")]
    Source(String),
}

impl StoreError {
    /// Build an HTTP error from a status and message
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        StoreError::Http {
            status,
            message: message.into(),
        }
    }

    /// HTTP status, when the service produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-side failures (status >= 500) are expected to resolve on retry.
    ///
    /// Errors without a status are permanent.
    pub fn is_transient(&self) -> bool {
        self.status().is_some_and(|status| status >= 500)
    }
}

/// Artifact discovery errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Pattern is not a valid glob
    #[error("Invalid artifact pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Reason for the error
        reason: String,
    },

    /// Pattern matched no files
    #[error("Artifact pattern '{pattern}' did not match any files")]
    NoMatch {
        /// The pattern
        pattern: String,
    },

    /// Two artifacts in one batch share a name
    #[error("Duplicate artifact name '{name}' ({first} and {second})")]
    DuplicateName {
        /// Asset name
        name: String,
        /// Path of the first artifact with this name
        first: PathBuf,
        /// Path of the second artifact with this name
        second: PathBuf,
    },

    /// Artifact path has no usable file name
    #[error("Invalid artifact filename: {path}")]
    InvalidFileName {
        /// Path of the artifact
        path: PathBuf,
    },

    /// Artifact file could not be inspected
    #[error("Failed to read artifact {path}: {source}")]
    Unreadable {
        /// Path of the artifact
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No token could be found
    #[error(
        "GitHub token not provided. Set GH_TOKEN or GITHUB_TOKEN environment variable or use --token"
    )]
    MissingToken,

    /// Token contains characters that cannot be sent in a header
    #[error("GitHub token contains invalid characters")]
    InvalidToken,

    /// Repository is missing or malformed
    #[error("Invalid GitHub repository '{value}'. Expected: owner/repo")]
    InvalidRepository {
        /// The value that was given
        value: String,
    },

    /// A URL could not be parsed
    #[error("Invalid URL '{value}': {reason}")]
    InvalidUrl {
        /// The value that was given
        value: String,
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl UploadError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            UploadError::Config(ConfigError::MissingToken) => vec![
                "Export a token: export GITHUB_TOKEN=<token>".to_string(),
                "Ensure the token has contents:write permission on the repository".to_string(),
            ],
            UploadError::Config(ConfigError::InvalidRepository { .. }) => vec![
                "Pass --repo owner/repo or set GITHUB_REPOSITORY".to_string(),
            ],
            UploadError::Store(StoreError::Http { status: 401, .. })
            | UploadError::Store(StoreError::Http { status: 403, .. }) => vec![
                "Verify the token is valid and not expired".to_string(),
                "Ensure the token has contents:write permission on the repository".to_string(),
            ],
            UploadError::Store(StoreError::Http { status: 404, .. }) => vec![
                "Check that the release id belongs to the given repository".to_string(),
            ],
            UploadError::ArtifactFailed { source, .. } if source.is_transient() => vec![
                "GitHub reported a server error; re-run the upload later".to_string(),
                "Raise KODEGEN_UPLOAD_RETRIES to allow more attempts".to_string(),
            ],
            UploadError::ArtifactFailed { .. } => vec![
                "Drop --fail-on-upload-error to continue past failed artifacts".to_string(),
            ],
            UploadError::Artifact(ArtifactError::NoMatch { .. }) => vec![
                "Check the artifact patterns relative to the working directory".to_string(),
                "Drop --fail-on-missing-artifacts to only warn about empty patterns".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by running the same command again
    pub fn is_recoverable(&self) -> bool {
        match self {
            UploadError::Store(e) | UploadError::ArtifactFailed { source: e, .. } => {
                e.is_transient() || matches!(e, StoreError::Transport(_))
            }
            UploadError::Io(_) => true,
            _ => false,
        }
    }
}
