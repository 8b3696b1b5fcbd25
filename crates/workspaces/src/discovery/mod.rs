//! Workspace discovery for JavaScript monorepos.
//!
//! Two sources of workspace patterns are supported:
//! - `package.json` `workspaces` (npm, Yarn), see [`PackageJsonDiscovery`]
//! - `pnpm-workspace.yaml` (pnpm), see [`PnpmWorkspaceDiscovery`]
//!
//! A repository without workspace patterns is treated as a single-package
//! repository whose only member is the root `package.json`.

use crate::error::{Error, Result};
use crate::types::{PackageInfo, PackageManager, Workspace};
use glob::Pattern;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod package_json;
pub mod pnpm_workspace;

pub use package_json::PackageJsonDiscovery;
pub use pnpm_workspace::PnpmWorkspaceDiscovery;

/// Discovers the packages of a monorepo rooted at a directory.
pub trait WorkspaceDiscovery {
    /// Returns the workspace patterns declared at `root`, or `None` when the
    /// repository declares none.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or parsed.
    fn patterns(&self, root: &Path) -> Result<Option<Vec<String>>>;

    /// Discover the workspace rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root manifest is missing or invalid, or if two
    /// members share a name.
    fn discover(&self, root: &Path) -> Result<Workspace> {
        let root_manifest = root.join("package.json");
        if !root_manifest.exists() {
            return Err(Error::WorkspaceNotFound {
                path: root.to_path_buf(),
            });
        }

        let manager = detect_manager(root);
        let mut workspace = Workspace::new(root.to_path_buf(), manager);

        let Some(patterns) = self.patterns(root)? else {
            tracing::debug!(root = %root.display(), "No workspace patterns, treating as single package");
            if let Some(pkg) = read_package(root)? {
                workspace.packages.push(pkg);
            }
            return Ok(workspace);
        };

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        for dir in resolve_glob_patterns(root, &patterns, &[])? {
            let Some(pkg) = read_package(&dir)? else {
                continue;
            };
            if let Some(first) = seen.insert(pkg.name.clone(), pkg.path.clone()) {
                return Err(Error::DuplicatePackage {
                    name: pkg.name,
                    first,
                    second: dir,
                });
            }
            workspace.packages.push(pkg);
        }

        workspace.packages.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(
            root = %root.display(),
            manager = %manager,
            packages = workspace.packages.len(),
            "Discovered workspace"
        );
        Ok(workspace)
    }
}

/// Discover the workspace at `root`, choosing the discovery source from the
/// files present (`pnpm-workspace.yaml` first, then `package.json`).
///
/// # Errors
///
/// Returns an error if discovery fails.
pub fn discover_workspace(root: &Path) -> Result<Workspace> {
    if root.join("pnpm-workspace.yaml").exists() {
        PnpmWorkspaceDiscovery.discover(root)
    } else {
        PackageJsonDiscovery.discover(root)
    }
}

/// Detect the package manager from lockfiles and workspace files at `root`.
///
/// Falls back to npm when nothing more specific is found.
#[must_use]
pub fn detect_manager(root: &Path) -> PackageManager {
    let has_lockfile = |manager: PackageManager| root.join(manager.lockfile_name()).exists();
    if has_lockfile(PackageManager::Pnpm) || root.join("pnpm-workspace.yaml").exists() {
        PackageManager::Pnpm
    } else if has_lockfile(PackageManager::Yarn) || root.join(".yarnrc.yml").exists() {
        PackageManager::Yarn
    } else {
        PackageManager::Npm
    }
}

/// Subset of `package.json` needed for release management.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManifestJson {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub workspaces: Option<WorkspacesField>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, String>,
}

/// The `workspaces` field accepts an array or an object with `packages`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WorkspacesField {
    Array(Vec<String>),
    Object { packages: Vec<String> },
}

impl WorkspacesField {
    pub(crate) fn into_patterns(self) -> Vec<String> {
        match self {
            Self::Array(patterns) | Self::Object { packages: patterns } => patterns,
        }
    }
}

/// Read the package in `dir`.
///
/// Directories without a `package.json`, with invalid JSON, or without a
/// `name` are skipped (`Ok(None)`). Only I/O errors are propagated.
///
/// # Errors
///
/// Returns an error if the manifest exists but cannot be read.
pub fn read_package(dir: &Path) -> Result<Option<PackageInfo>> {
    let manifest_path = dir.join("package.json");
    if !manifest_path.exists() {
        return Ok(None);
    }

    let manifest: ManifestJson = match read_json_file(&manifest_path) {
        Ok(m) => m,
        Err(Error::Json { path, source }) => {
            tracing::warn!(
                path = ?path,
                error = %source,
                "Skipping package with invalid package.json"
            );
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let Some(name) = manifest.name else {
        tracing::debug!(dir = %dir.display(), "Skipping package.json without a name");
        return Ok(None);
    };

    Ok(Some(PackageInfo {
        name,
        version: manifest.version.unwrap_or_else(|| "0.0.0".to_string()),
        private: manifest.private,
        path: dir.to_path_buf(),
        manifest_path,
        dependencies: manifest.dependencies,
        dev_dependencies: manifest.dev_dependencies,
        peer_dependencies: manifest.peer_dependencies,
        optional_dependencies: manifest.optional_dependencies,
    }))
}

/// Resolves glob patterns to find directories, handling exclusions.
///
/// Patterns starting with `!` in `patterns` are treated as exclusions, as are
/// the entries of `exclusions`. `node_modules`, `.git` and `dist` are never
/// traversed.
///
/// Returns a sorted list of unique absolute paths under `root`.
///
/// # Errors
///
/// Currently infallible; invalid patterns are ignored.
pub fn resolve_glob_patterns(
    root: &Path,
    patterns: &[String],
    exclusions: &[String],
) -> Result<Vec<PathBuf>> {
    let mut matched_paths = HashSet::new();
    let mut inclusion_patterns = Vec::new();
    let mut exclusion_patterns = Vec::new();

    for p in exclusions {
        if let Ok(pat) = Pattern::new(p) {
            exclusion_patterns.push(pat);
        }
    }

    for p in patterns {
        let p = p.trim_end_matches('/');
        if let Some(stripped) = p.strip_prefix('!') {
            if let Ok(pat) = Pattern::new(stripped) {
                exclusion_patterns.push(pat);
            }
        } else if let Ok(pat) = Pattern::new(p.strip_prefix("./").unwrap_or(p)) {
            inclusion_patterns.push(pat);
        }
    }

    let walker = WalkDir::new(root).follow_links(false);

    for entry in walker
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            !matches!(name, "node_modules" | ".git" | "dist")
        })
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if path == root {
            continue;
        }

        let Ok(rel_path) = path.strip_prefix(root) else {
            continue;
        };

        if exclusion_patterns.iter().any(|p| p.matches_path(rel_path)) {
            continue;
        }

        if inclusion_patterns.iter().any(|p| p.matches_path(rel_path)) {
            matched_paths.insert(path.to_path_buf());
        }
    }

    let mut result: Vec<PathBuf> = matched_paths.into_iter().collect();
    result.sort();
    Ok(result)
}

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as valid JSON.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::Io {
        source: e,
        path: Some(path.to_path_buf()),
        operation: "reading json file".to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| Error::Json {
        source: e,
        path: Some(path.to_path_buf()),
    })
}

/// Reads and parses a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as valid YAML.
pub fn read_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::Io {
        source: e,
        path: Some(path.to_path_buf()),
        operation: "reading yaml file".to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| Error::Yaml {
        source: e,
        path: Some(path.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_glob_patterns_with_negation() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("packages/a")).unwrap();
        fs::create_dir_all(root.join("packages/b")).unwrap();
        fs::create_dir_all(root.join("packages/a/node_modules/x")).unwrap();

        let patterns = vec!["packages/*".to_string(), "!packages/b".to_string()];
        let result = resolve_glob_patterns(root, &patterns, &[]).unwrap();

        assert_eq!(result, vec![root.join("packages/a")]);
    }

    #[test]
    fn test_read_package_skips_invalid_json() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{ not json").unwrap();
        assert!(read_package(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_package_skips_missing_name() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"version": "1.0.0"}"#).unwrap();
        assert!(read_package(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_package_defaults_version() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"name": "solo"}"#).unwrap();
        let pkg = read_package(temp.path()).unwrap().unwrap();
        assert_eq!(pkg.version, "0.0.0");
        assert!(!pkg.private);
    }

    #[test]
    fn test_detect_manager() {
        let temp = TempDir::new().unwrap();
        assert_eq!(detect_manager(temp.path()), PackageManager::Npm);

        fs::write(temp.path().join("yarn.lock"), "").unwrap();
        assert_eq!(detect_manager(temp.path()), PackageManager::Yarn);

        fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(detect_manager(temp.path()), PackageManager::Pnpm);
    }
}
