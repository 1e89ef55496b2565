//! Error types for icon resolution and decoding.

use std::path::PathBuf;

/// Result type alias for icon operations.
pub type IconResult<T> = std::result::Result<T, IconError>;

/// Errors produced by the resolver and decoder collaborators.
///
/// The cache itself never hands these to its callers; they surface only
/// through diagnostics and through the collaborator traits.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    /// The icon name did not resolve to any file.
    #[error("icon '{name}' not found")]
    NotFound { name: String },

    /// The icon name cannot be used for lookup.
    #[error("invalid icon name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Reading the icon file failed.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but could not be decoded.
    #[error("failed to decode '{path}': {message}")]
    Decode { path: PathBuf, message: String },
}

impl IconError {
    /// Create a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an invalid-name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a decode error.
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from resolving the name rather than loading a file.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidName { .. })
    }
}
