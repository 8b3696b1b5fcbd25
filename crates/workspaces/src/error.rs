//! Error types for workspace operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during workspace operations.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No `package.json` at the workspace root.
    #[error("Workspace not found at path: {path}")]
    #[diagnostic(
        code(beachball::workspaces::workspace_not_found),
        help("Run beachball from the root of a repository that contains a package.json")
    )]
    WorkspaceNotFound {
        /// The path that was searched.
        path: PathBuf,
    },

    /// Invalid workspace configuration.
    #[error("Invalid workspace configuration at {path}: {message}")]
    #[diagnostic(
        code(beachball::workspaces::invalid_config),
        help("Check the workspace configuration file for syntax errors or missing required fields")
    )]
    InvalidWorkspaceConfig {
        /// Path to the invalid configuration file.
        path: PathBuf,
        /// Description of what is invalid.
        message: String,
    },

    /// Two workspace members share the same package name.
    #[error("Duplicate package name '{name}' found at {first} and {second}")]
    #[diagnostic(
        code(beachball::workspaces::duplicate_package),
        help("Every package in the monorepo must have a unique name")
    )]
    DuplicatePackage {
        /// The duplicated package name.
        name: String,
        /// Directory of the first package with this name.
        first: PathBuf,
        /// Directory of the second package with this name.
        second: PathBuf,
    },

    /// Workspace member not found.
    #[error("Package '{name}' not found in workspace at {workspace_root}")]
    #[diagnostic(
        code(beachball::workspaces::member_not_found),
        help("Check that the package name is correct and is matched by the workspace patterns")
    )]
    MemberNotFound {
        /// Name of the missing member.
        name: String,
        /// Root of the workspace where the member was expected.
        workspace_root: PathBuf,
    },

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(beachball::workspaces::io_error),
        help("Check that the referenced paths exist and that you have permission to read or write them")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// JSON parsing error.
    #[error("JSON parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(beachball::workspaces::json_error),
        help("Ensure the package.json has valid syntax")
    )]
    Json {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },

    /// YAML parsing error.
    #[error("YAML parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(beachball::workspaces::yaml_error),
        help("Ensure pnpm-workspace.yaml has valid syntax and a `packages` list")
    )]
    Yaml {
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "file operation".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source, path: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_not_found_display() {
        let err = Error::WorkspaceNotFound {
            path: PathBuf::from("/repo"),
        };
        assert!(err.to_string().contains("/repo"));
    }

    #[test]
    fn test_duplicate_package_display() {
        let err = Error::DuplicatePackage {
            name: "pkg-a".to_string(),
            first: PathBuf::from("packages/a"),
            second: PathBuf::from("packages/b"),
        };
        let msg = err.to_string();
        assert!(msg.contains("pkg-a"));
        assert!(msg.contains("packages/a"));
        assert!(msg.contains("packages/b"));
    }

    #[test]
    fn test_io_error_includes_path() {
        let err = Error::Io {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            path: Some(PathBuf::from("package.json")),
            operation: "reading json file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("reading json file"));
        assert!(msg.contains("package.json"));
    }
}
