//! Core types for representing a monorepo, its packages and package manager.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// JavaScript package managers that can drive a monorepo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm (`package-lock.json`)
    Npm,
    /// pnpm (`pnpm-lock.yaml`, `pnpm-workspace.yaml`)
    Pnpm,
    /// Yarn, classic or berry (`yarn.lock`)
    Yarn,
}

impl PackageManager {
    /// Name of the executable for this package manager.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        }
    }

    /// Name of the lockfile written by this package manager.
    #[must_use]
    pub const fn lockfile_name(self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Pnpm => "pnpm-lock.yaml",
            Self::Yarn => "yarn.lock",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// A single package in the monorepo, as read from its `package.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    /// Package name.
    pub name: String,
    /// Current version string (`0.0.0` when the manifest omits it).
    pub version: String,
    /// Whether the package is marked `"private": true`.
    pub private: bool,
    /// Absolute path of the package directory.
    pub path: PathBuf,
    /// Absolute path of the package's `package.json`.
    pub manifest_path: PathBuf,
    /// `dependencies`
    pub dependencies: BTreeMap<String, String>,
    /// `devDependencies`
    pub dev_dependencies: BTreeMap<String, String>,
    /// `peerDependencies`
    pub peer_dependencies: BTreeMap<String, String>,
    /// `optionalDependencies`
    pub optional_dependencies: BTreeMap<String, String>,
}

impl PackageInfo {
    /// Names of every dependency across all dependency kinds.
    pub fn all_dependency_names(&self) -> impl Iterator<Item = &String> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .chain(self.peer_dependencies.keys())
            .chain(self.optional_dependencies.keys())
    }

    /// Whether this package depends on `name` in any dependency kind.
    #[must_use]
    pub fn depends_on(&self, name: &str) -> bool {
        self.all_dependency_names().any(|dep| dep == name)
    }

    /// Package directory relative to `root` (falls back to the absolute path).
    #[must_use]
    pub fn relative_path(&self, root: &Path) -> PathBuf {
        self.path
            .strip_prefix(root)
            .unwrap_or(&self.path)
            .to_path_buf()
    }
}

/// A discovered monorepo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// The root directory of the repository.
    pub root: PathBuf,
    /// The detected package manager.
    pub manager: PackageManager,
    /// All packages, sorted by name.
    pub packages: Vec<PackageInfo>,
}

impl Workspace {
    /// Creates an empty workspace.
    #[must_use]
    pub fn new(root: PathBuf, manager: PackageManager) -> Self {
        Self {
            root,
            manager,
            packages: Vec::new(),
        }
    }

    /// Finds a package by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageInfo> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Whether the named package belongs to this workspace.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the workspace has no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Determine which package owns a repo-relative file path.
    ///
    /// Uses the longest matching package directory so nested packages win
    /// over their parents. Returns `None` for files outside every package.
    #[must_use]
    pub fn package_for_file(&self, file_path: &Path) -> Option<&PackageInfo> {
        let mut best_match: Option<(&PackageInfo, usize)> = None;

        for pkg in &self.packages {
            let relative = pkg.relative_path(&self.root);
            if file_path.starts_with(&relative) {
                let depth = relative.components().count();
                if best_match.is_none_or(|(_, prev)| depth > prev) {
                    best_match = Some((pkg, depth));
                }
            }
        }

        best_match.map(|(pkg, _)| pkg)
    }

    /// In-repo packages that list `name` as a dependency.
    pub fn dependents_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PackageInfo> {
        self.packages.iter().filter(move |p| p.depends_on(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str, dir: &str, deps: &[&str]) -> PackageInfo {
        let path = PathBuf::from("/repo").join(dir);
        PackageInfo {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            private: false,
            manifest_path: path.join("package.json"),
            path,
            dependencies: deps
                .iter()
                .map(|d| ((*d).to_string(), "^1.0.0".to_string()))
                .collect(),
            dev_dependencies: BTreeMap::new(),
            peer_dependencies: BTreeMap::new(),
            optional_dependencies: BTreeMap::new(),
        }
    }

    fn workspace() -> Workspace {
        let mut ws = Workspace::new(PathBuf::from("/repo"), PackageManager::Yarn);
        ws.packages = vec![
            package("a", "packages/a", &[]),
            package("b", "packages/b", &["a"]),
            package("a-nested", "packages/a/nested", &[]),
        ];
        ws
    }

    #[test]
    fn test_package_manager_names() {
        assert_eq!(PackageManager::Pnpm.binary(), "pnpm");
        assert_eq!(PackageManager::Yarn.lockfile_name(), "yarn.lock");
        assert_eq!(PackageManager::Npm.to_string(), "npm");
    }

    #[test]
    fn test_package_for_file_prefers_nested() {
        let ws = workspace();
        let owner = ws
            .package_for_file(Path::new("packages/a/nested/src/index.ts"))
            .unwrap();
        assert_eq!(owner.name, "a-nested");

        let owner = ws.package_for_file(Path::new("packages/a/src/index.ts")).unwrap();
        assert_eq!(owner.name, "a");
    }

    #[test]
    fn test_package_for_file_outside_packages() {
        let ws = workspace();
        assert!(ws.package_for_file(Path::new("README.md")).is_none());
    }

    #[test]
    fn test_dependents_of() {
        let ws = workspace();
        let names: Vec<&str> = ws.dependents_of("a").map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_get_and_contains() {
        let ws = workspace();
        assert!(ws.contains("b"));
        assert!(ws.get("missing").is_none());
        assert_eq!(ws.len(), 3);
    }
}
