//! Typed error handling for deadcil.
//!
//! Provides structured errors that library consumers can match on,
//! with full context about what went wrong and where.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for deadcil operations.
///
/// This provides typed errors that library consumers can match on,
/// unlike opaque `anyhow::Error` types.
#[derive(Error, Debug)]
pub enum DeadcilError {
    /// An entry point name could not be resolved against the assembly
    /// or its embedded UI resources. User input error; nothing has been
    /// mutated when this is returned.
    #[error("Unable to resolve entry point: {name}")]
    Resolution { name: String },

    /// Internal consistency failure: an index and the live assembly
    /// tables have diverged, or pipeline stages were invoked out of
    /// order. Never retried, always propagated.
    #[error("Consistency error: {message}")]
    Consistency { message: String },

    /// A collaborator failed to decode an embedded document or blob.
    /// Propagated unchanged; no partial recovery is attempted.
    #[error("Decode error in {name}: {message}")]
    Decode { name: String, message: String },

    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl DeadcilError {
    /// Create a resolution error for an entry point name.
    pub fn resolution(name: impl Into<String>) -> Self {
        Self::Resolution { name: name.into() }
    }

    /// Create an internal consistency error.
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::Consistency {
            message: message.into(),
        }
    }

    /// Create a decode error with the name of the offending item.
    pub fn decode(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error was caused by user input (bad entry point,
    /// bad configuration) rather than an internal failure.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Resolution { .. } | Self::Config { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for deadcil results.
pub type DeadcilResult<T> = Result<T, DeadcilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error() {
        let err = DeadcilError::resolution("Acme.Missing");
        assert!(matches!(err, DeadcilError::Resolution { .. }));
        assert!(err.to_string().contains("Acme.Missing"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_consistency_error_is_internal() {
        let err = DeadcilError::consistency("type table diverged");
        assert!(!err.is_user_error());
        assert!(err.to_string().contains("type table diverged"));
    }

    #[test]
    fn test_io_error_path() {
        let err = DeadcilError::io(
            PathBuf::from("/test/app.dll"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert_eq!(err.path(), Some(&PathBuf::from("/test/app.dll")));
        assert!(err.to_string().contains("/test/app.dll"));
    }

    #[test]
    fn test_decode_error() {
        let err = DeadcilError::decode("ui/window.baml", "truncated record");
        assert!(err.to_string().contains("ui/window.baml"));
        assert!(!err.is_user_error());
    }
}
