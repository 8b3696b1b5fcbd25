//! Error types for release management operations.

use crate::change_file::ChangeType;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during release management operations.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Failed to read or write a change file.
    #[error("Change file I/O error: {message}")]
    #[diagnostic(
        code(beachball::release::change_file_io),
        help("Check that the change directory exists and is writable")
    )]
    ChangeFileIo {
        /// The error message
        message: String,
        /// The path that caused the error
        path: Option<PathBuf>,
        /// The underlying source error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Failed to parse a change file.
    #[error("Invalid change file: {message}")]
    #[diagnostic(
        code(beachball::release::change_file_parse),
        help("Change files are JSON objects with type, comment, packageName, email and dependentChangeType")
    )]
    ChangeFileParse {
        /// The error message
        message: String,
        /// The path to the invalid file
        path: Option<PathBuf>,
    },

    /// Failed to parse or validate a version string.
    #[error("Invalid version: {version}")]
    #[diagnostic(
        code(beachball::release::invalid_version),
        help("Version must follow semantic versioning (e.g., 1.0.0, 2.1.0-beta.1)")
    )]
    InvalidVersion {
        /// The invalid version string
        version: String,
    },

    /// A bump would push a version component past `u64::MAX`.
    #[error("Cannot apply a {change_type} bump to {version}: version component overflows")]
    #[diagnostic(code(beachball::release::version_overflow))]
    VersionOverflow {
        /// The version being bumped
        version: String,
        /// The requested bump
        change_type: ChangeType,
    },

    /// Unknown change type name.
    #[error("Invalid change type: {value}")]
    #[diagnostic(
        code(beachball::release::invalid_change_type),
        help("Expected one of: none, prerelease, patch, minor, major")
    )]
    InvalidChangeType {
        /// The rejected value
        value: String,
    },

    /// A change type is not allowed for a package.
    #[error("Change type '{change_type}' is not allowed for package '{package}'")]
    #[diagnostic(
        code(beachball::release::disallowed_change_type),
        help("Use a change type not listed in the package's disallowedChangeTypes")
    )]
    DisallowedChangeType {
        /// The package name
        package: String,
        /// The rejected change type
        change_type: ChangeType,
    },

    /// Package not found in the workspace.
    #[error("Package not found: {name}")]
    #[diagnostic(
        code(beachball::release::package_not_found),
        help("Ensure the package exists in the workspace and is matched by the workspace patterns")
    )]
    PackageNotFound {
        /// The package name that wasn't found
        name: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(beachball::release::config), help("{help}"))]
    Config {
        /// The error message
        message: String,
        /// Help text for the user
        help: String,
    },

    /// package.json read or write error.
    #[error("Manifest error: {message}")]
    #[diagnostic(
        code(beachball::release::manifest),
        help("Check that the package.json exists and is valid JSON")
    )]
    Manifest {
        /// The error message
        message: String,
        /// The manifest file path
        path: Option<PathBuf>,
    },

    /// Git operation error.
    #[error("Git error: {message}")]
    #[diagnostic(
        code(beachball::release::git),
        help("Ensure you are in a git repository and have the necessary permissions")
    )]
    Git {
        /// The error message
        message: String,
    },

    /// Workspace discovery failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Workspace(#[from] beachball_workspaces::Error),

    /// Wrapped I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(beachball::release::io))]
    Io(#[from] std::io::Error),

    /// Wrapped JSON error.
    #[error("JSON error: {0}")]
    #[diagnostic(code(beachball::release::json))]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new change file I/O error.
    #[must_use]
    pub fn change_file_io(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::ChangeFileIo {
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a new change file I/O error with source.
    #[must_use]
    pub fn change_file_io_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::ChangeFileIo {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    /// Create a new change file parse error.
    #[must_use]
    pub fn change_file_parse(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::ChangeFileParse {
            message: message.into(),
            path,
        }
    }

    /// Create a new invalid version error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a new package not found error.
    #[must_use]
    pub fn package_not_found(name: impl Into<String>) -> Self {
        Self::PackageNotFound { name: name.into() }
    }

    /// Create a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a new manifest error.
    #[must_use]
    pub fn manifest(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Manifest {
            message: message.into(),
            path,
        }
    }

    /// Create a new git error.
    #[must_use]
    pub fn git(message: impl Into<String>) -> Self {
        Self::Git {
            message: message.into(),
        }
    }

    /// Whether this error stems from user configuration rather than a failed operation.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::InvalidChangeType { .. }
                | Self::DisallowedChangeType { .. }
                | Self::PackageNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_file_io_error() {
        let err = Error::change_file_io("failed to write", Some(PathBuf::from("change/a.json")));
        assert!(err.to_string().contains("Change file I/O error"));
    }

    #[test]
    fn test_change_file_io_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::change_file_io_with_source("failed to read", None, io_err);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_change_file_parse_error() {
        let err = Error::change_file_parse("missing packageName", None);
        assert!(err.to_string().contains("Invalid change file"));
    }

    #[test]
    fn test_disallowed_change_type_error() {
        let err = Error::DisallowedChangeType {
            package: "pkg-a".to_string(),
            change_type: ChangeType::Major,
        };
        let msg = err.to_string();
        assert!(msg.contains("major"));
        assert!(msg.contains("pkg-a"));
        assert!(err.is_config());
    }

    #[test]
    fn test_git_error_is_not_config() {
        let err = Error::git("not a repository");
        assert!(err.to_string().contains("Git error"));
        assert!(!err.is_config());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }
}
