//! Error types for loading analysis input and configuration.
//!
//! The scan itself never fails: a call site that cannot be analyzed is
//! skipped. Only reading the front-end dump or the configuration can go
//! wrong, and those failures are reported through [`CheckError`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    /// A file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The front-end dump is not valid analysis input.
    #[error("failed to parse analysis input {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file is malformed.
    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl CheckError {
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::Config { path, .. } => path,
        }
    }

    /// Whether the user can fix the problem by editing their input.
    pub fn is_user_fixable(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::Parse { .. } | Self::Config { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CheckError::config(".errstringcheck.toml", "expected a boolean");
        assert_eq!(
            err.to_string(),
            "invalid configuration .errstringcheck.toml: expected a boolean"
        );
        assert!(err.is_user_fixable());
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = CheckError::Io {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().starts_with("failed to read missing.json"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.path(), std::path::Path::new("missing.json"));
        assert!(err.is_user_fixable());
    }

    #[test]
    fn test_permission_denied_is_not_user_fixable() {
        let err = CheckError::Io {
            path: PathBuf::from("input.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_user_fixable());
    }
}
