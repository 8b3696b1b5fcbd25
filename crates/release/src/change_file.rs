//! Change file creation, storage, and parsing.
//!
//! Change files are JSON documents stored in `change/` at the repository root.
//! Each one records the intended bump for a single package:
//!
//! ```json
//! {
//!   "type": "minor",
//!   "comment": "Add a feature",
//!   "packageName": "pkg-a",
//!   "email": "dev@example.com",
//!   "dependentChangeType": "patch"
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

/// The directory name for storing change files.
pub const CHANGE_DIR: &str = "change";

/// Type of version bump for a package, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// No version change.
    None,
    /// Prerelease bump (X.Y.Z-pre.N).
    Prerelease,
    /// Patch version bump (0.0.X).
    Patch,
    /// Minor version bump (0.X.0).
    Minor,
    /// Major version bump (X.0.0).
    Major,
}

impl ChangeType {
    /// All change types, lowest first.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Prerelease,
        Self::Patch,
        Self::Minor,
        Self::Major,
    ];

    /// Lowercase name as written in change files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Prerelease => "prerelease",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl FromStr for ChangeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "prerelease" => Ok(Self::Prerelease),
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            _ => Err(Error::InvalidChangeType {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content of a change file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInfo {
    /// Bump requested for the package.
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    /// Changelog comment.
    pub comment: String,
    /// The package this change applies to.
    pub package_name: String,
    /// Author email.
    pub email: String,
    /// Bump applied to in-repo dependents of the package; the configured
    /// default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependent_change_type: Option<ChangeType>,
    /// Commit that added the change file, looked up from git when bumping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl ChangeInfo {
    /// Create change info with no commit.
    #[must_use]
    pub fn new(
        package_name: impl Into<String>,
        change_type: ChangeType,
        comment: impl Into<String>,
        email: impl Into<String>,
        dependent_change_type: ChangeType,
    ) -> Self {
        Self {
            change_type,
            comment: comment.into(),
            package_name: package_name.into(),
            email: email.into(),
            dependent_change_type: Some(dependent_change_type),
            commit: None,
        }
    }
}

/// A change file read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFile {
    /// Where the file lives.
    pub path: PathBuf,
    /// Parsed content.
    pub info: ChangeInfo,
}

/// File name for a new change file: the package name with every character
/// outside `[A-Za-z0-9@]` replaced by `-`, followed by a UUID.
#[must_use]
pub fn change_file_name(package_name: &str) -> String {
    let prefix: String = package_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '@' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{prefix}-{}.json", Uuid::new_v4())
}

/// Manager for change file operations.
pub struct ChangeFileManager {
    root: PathBuf,
}

impl ChangeFileManager {
    /// Create a new change file manager for the given repository root.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Get the change directory path.
    #[must_use]
    pub fn change_dir(&self) -> PathBuf {
        self.root.join(CHANGE_DIR)
    }

    fn ensure_dir(&self) -> Result<()> {
        let dir = self.change_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                Error::change_file_io_with_source(
                    "Failed to create change directory",
                    Some(dir),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Write a new change file and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the change file cannot be written.
    pub fn write(&self, info: &ChangeInfo) -> Result<PathBuf> {
        self.ensure_dir()?;

        let path = self.change_dir().join(change_file_name(&info.package_name));
        let mut content = serde_json::to_string_pretty(info)?;
        content.push('\n');

        fs::write(&path, content).map_err(|e| {
            Error::change_file_io_with_source("Failed to write change file", Some(path.clone()), e)
        })?;

        tracing::debug!(path = %path.display(), package = %info.package_name, "Wrote change file");
        Ok(path)
    }

    /// Read every change file, sorted by file name.
    ///
    /// Files that are not valid change files are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the change directory cannot be listed.
    pub fn read_all(&self) -> Result<Vec<ChangeFile>> {
        let dir = self.change_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| {
            Error::change_file_io_with_source("Failed to read change directory", Some(dir.clone()), e)
        })? {
            let entry = entry.map_err(|e| {
                Error::change_file_io_with_source("Failed to read directory entry", Some(dir.clone()), e)
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::read_one(&path) {
                Ok(info) => files.push(ChangeFile { path, info }),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping invalid change file"),
            }
        }
        Ok(files)
    }

    fn read_one(path: &Path) -> Result<ChangeInfo> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::change_file_io_with_source("Failed to read change file", Some(path.to_path_buf()), e)
        })?;
        serde_json::from_str(&content)
            .map_err(|e| Error::change_file_parse(e.to_string(), Some(path.to_path_buf())))
    }

    /// Delete the given change files.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be removed.
    pub fn delete_all(&self, files: &[ChangeFile]) -> Result<()> {
        for file in files {
            if file.path.exists() {
                fs::remove_file(&file.path).map_err(|e| {
                    Error::change_file_io_with_source(
                        "Failed to remove change file",
                        Some(file.path.clone()),
                        e,
                    )
                })?;
            }
        }
        tracing::debug!(count = files.len(), "Deleted change files");
        Ok(())
    }
}

/// The maximum change type requested for each package.
#[must_use]
pub fn package_change_types(files: &[ChangeFile]) -> BTreeMap<String, ChangeType> {
    let mut types: BTreeMap<String, ChangeType> = BTreeMap::new();
    for file in files {
        let entry = types
            .entry(file.info.package_name.clone())
            .or_insert(ChangeType::None);
        *entry = (*entry).max(file.info.change_type);
    }
    types
}
