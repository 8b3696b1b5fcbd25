//! Bump calculation and application.
//!
//! Given the workspace and the pending change files, [`BumpCalculator`]
//! decides the new version of every affected package:
//!
//! 1. each package takes the highest change type among its change files
//! 2. change types listed in a package's `disallowedChangeTypes` are rejected
//! 3. with `bumpDeps`, in-repo dependents are bumped transitively by the
//!    change file's `dependentChangeType`, keeping the highest type
//! 4. private packages are never bumped

use crate::change_file::{ChangeFile, ChangeType};
use crate::error::{Error, Result};
use crate::manifest::PackageJson;
use crate::version::Version;
use beachball_workspaces::Workspace;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Settings that influence bump calculation.
#[derive(Debug, Clone)]
pub struct BumpOptions {
    /// Propagate bumps to dependents.
    pub bump_deps: bool,
    /// Dependent change type for change files that do not specify one.
    pub dependent_change_type: ChangeType,
    /// Prefix for prerelease identifiers.
    pub prerelease_prefix: Option<String>,
    /// Disallowed change types per package name.
    pub disallowed: HashMap<String, Vec<ChangeType>>,
}

impl Default for BumpOptions {
    fn default() -> Self {
        Self {
            bump_deps: false,
            dependent_change_type: ChangeType::Patch,
            prerelease_prefix: None,
            disallowed: HashMap::new(),
        }
    }
}

/// A dependent bump caused by a bumped dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentUpdate {
    /// The dependency whose bump caused this one.
    pub dependency: String,
    /// Change type applied to the dependent.
    pub change_type: ChangeType,
}

/// Result of bump calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BumpInfo {
    /// Effective change type for each affected package.
    pub change_types: BTreeMap<String, ChangeType>,
    /// New version for each bumped package.
    pub new_versions: BTreeMap<String, Version>,
    /// Dependent bumps keyed by the dependent package.
    pub dependent_updates: BTreeMap<String, Vec<DependentUpdate>>,
}

impl BumpInfo {
    /// Whether nothing is bumped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_versions.is_empty()
    }
}

/// Calculates bumps for a workspace.
pub struct BumpCalculator<'a> {
    workspace: &'a Workspace,
}

impl<'a> BumpCalculator<'a> {
    /// Create a calculator for `workspace`.
    #[must_use]
    pub const fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Calculate bumps for `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if a change type is disallowed for its package or a
    /// package version cannot be parsed.
    pub fn calculate(&self, changes: &[ChangeFile], options: &BumpOptions) -> Result<BumpInfo> {
        let mut info = BumpInfo::default();
        let mut dependent_types: BTreeMap<String, ChangeType> = BTreeMap::new();

        for change in changes {
            let name = &change.info.package_name;
            let Some(pkg) = self.workspace.get(name) else {
                tracing::warn!(package = %name, path = %change.path.display(), "Change file for unknown package, ignoring");
                continue;
            };
            if pkg.private {
                tracing::info!(package = %name, "Skipping private package");
                continue;
            }

            let change_type = change.info.change_type;
            if options
                .disallowed
                .get(name)
                .is_some_and(|types| types.contains(&change_type))
            {
                return Err(Error::DisallowedChangeType {
                    package: name.clone(),
                    change_type,
                });
            }

            let entry = info.change_types.entry(name.clone()).or_insert(ChangeType::None);
            *entry = (*entry).max(change_type);

            let dependent = change
                .info
                .dependent_change_type
                .unwrap_or(options.dependent_change_type);
            let entry = dependent_types.entry(name.clone()).or_insert(ChangeType::None);
            *entry = (*entry).max(dependent);
        }

        if options.bump_deps {
            self.propagate(&mut info, &dependent_types);
        }

        for (name, change_type) in &info.change_types {
            if *change_type == ChangeType::None {
                continue;
            }
            let Some(pkg) = self.workspace.get(name) else {
                continue;
            };
            let current: Version = pkg.version.parse()?;
            let next = current.bump(*change_type, options.prerelease_prefix.as_deref())?;
            tracing::debug!(package = %name, from = %current, to = %next, "Calculated bump");
            info.new_versions.insert(name.clone(), next);
        }

        Ok(info)
    }

    /// Walk dependents breadth-first. A dependent inherits the dependent
    /// change type of the package that caused its bump.
    fn propagate(&self, info: &mut BumpInfo, dependent_types: &BTreeMap<String, ChangeType>) {
        let mut queue: VecDeque<(String, ChangeType)> = dependent_types
            .iter()
            .filter(|(name, _)| {
                info.change_types
                    .get(*name)
                    .is_some_and(|t| *t != ChangeType::None)
            })
            .map(|(name, t)| (name.clone(), *t))
            .collect();

        while let Some((name, dependent_type)) = queue.pop_front() {
            if dependent_type == ChangeType::None {
                continue;
            }
            for dependent in self.workspace.dependents_of(&name) {
                if dependent.private {
                    continue;
                }

                let updates = info.dependent_updates.entry(dependent.name.clone()).or_default();
                if !updates.iter().any(|u| u.dependency == name) {
                    updates.push(DependentUpdate {
                        dependency: name.clone(),
                        change_type: dependent_type,
                    });
                }

                let current = info
                    .change_types
                    .get(&dependent.name)
                    .copied()
                    .unwrap_or(ChangeType::None);
                if dependent_type > current {
                    info.change_types.insert(dependent.name.clone(), dependent_type);
                    queue.push_back((dependent.name.clone(), dependent_type));
                }
            }
        }
    }
}

/// Write new versions and in-repo dependency ranges to every affected
/// package.json. Returns the manifests that were written.
///
/// # Errors
///
/// Returns an error if a manifest cannot be read or written.
pub fn apply_bumps(workspace: &Workspace, info: &BumpInfo) -> Result<Vec<std::path::PathBuf>> {
    let mut written = Vec::new();

    for pkg in &workspace.packages {
        let new_version = info.new_versions.get(&pkg.name);
        let bumped_deps: Vec<(&String, &Version)> = pkg
            .all_dependency_names()
            .filter_map(|dep| info.new_versions.get_key_value(dep))
            .collect();

        if new_version.is_none() && bumped_deps.is_empty() {
            continue;
        }

        let mut manifest = PackageJson::read(&pkg.manifest_path)?;
        let mut changed = false;
        if let Some(version) = new_version {
            manifest.set_version(version);
            changed = true;
        }
        for (dep, version) in bumped_deps {
            changed |= manifest.update_dependency(dep, version);
        }

        if changed {
            manifest.write()?;
            tracing::info!(package = %pkg.name, version = ?manifest.version(), "Updated package.json");
            written.push(manifest.path().to_path_buf());
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_file::ChangeInfo;
    use beachball_workspaces::{PackageInfo, PackageManager};
    use std::path::PathBuf;

    fn package(name: &str, version: &str, deps: &[&str]) -> PackageInfo {
        let path = PathBuf::from("/repo/packages").join(name);
        PackageInfo {
            name: name.to_string(),
            version: version.to_string(),
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

    fn workspace(packages: Vec<PackageInfo>) -> Workspace {
        let mut ws = Workspace::new(PathBuf::from("/repo"), PackageManager::Npm);
        ws.packages = packages;
        ws
    }

    fn change(pkg: &str, change_type: ChangeType, dependent: ChangeType) -> ChangeFile {
        ChangeFile {
            path: PathBuf::from(format!("/repo/change/{pkg}.json")),
            info: ChangeInfo::new(pkg, change_type, "comment", "dev@example.com", dependent),
        }
    }

    fn bump_deps() -> BumpOptions {
        BumpOptions {
            bump_deps: true,
            ..BumpOptions::default()
        }
    }

    #[test]
    fn test_max_change_type_per_package() {
        let ws = workspace(vec![package("a", "1.0.0", &[])]);
        let changes = vec![
            change("a", ChangeType::Patch, ChangeType::Patch),
            change("a", ChangeType::Minor, ChangeType::Patch),
        ];

        let info = BumpCalculator::new(&ws)
            .calculate(&changes, &BumpOptions::default())
            .unwrap();

        assert_eq!(info.change_types["a"], ChangeType::Minor);
        assert_eq!(info.new_versions["a"].to_string(), "1.1.0");
    }

    #[test]
    fn test_transitive_dependent_propagation() {
        let ws = workspace(vec![
            package("a", "1.0.0", &[]),
            package("b", "1.0.0", &["a"]),
            package("c", "1.0.0", &["b"]),
            package("d", "1.0.0", &[]),
        ]);
        let changes = vec![change("a", ChangeType::Major, ChangeType::Minor)];

        let info = BumpCalculator::new(&ws).calculate(&changes, &bump_deps()).unwrap();

        assert_eq!(info.new_versions["a"].to_string(), "2.0.0");
        assert_eq!(info.new_versions["b"].to_string(), "1.1.0");
        assert_eq!(info.new_versions["c"].to_string(), "1.1.0");
        assert!(!info.new_versions.contains_key("d"));
        assert_eq!(
            info.dependent_updates["b"],
            vec![DependentUpdate {
                dependency: "a".to_string(),
                change_type: ChangeType::Minor
            }]
        );
    }

    #[test]
    fn test_dependent_keeps_higher_own_change() {
        let ws = workspace(vec![package("a", "1.0.0", &[]), package("b", "1.0.0", &["a"])]);
        let changes = vec![
            change("a", ChangeType::Patch, ChangeType::Patch),
            change("b", ChangeType::Major, ChangeType::Patch),
        ];

        let info = BumpCalculator::new(&ws).calculate(&changes, &bump_deps()).unwrap();
        assert_eq!(info.new_versions["b"].to_string(), "2.0.0");
    }

    #[test]
    fn test_no_propagation_without_bump_deps() {
        let ws = workspace(vec![package("a", "1.0.0", &[]), package("b", "1.0.0", &["a"])]);
        let changes = vec![change("a", ChangeType::Minor, ChangeType::Patch)];

        let info = BumpCalculator::new(&ws)
            .calculate(&changes, &BumpOptions::default())
            .unwrap();
        assert_eq!(info.new_versions.len(), 1);
    }

    #[test]
    fn test_disallowed_change_type_rejected() {
        let ws = workspace(vec![package("a", "1.0.0", &[])]);
        let changes = vec![change("a", ChangeType::Major, ChangeType::Patch)];
        let mut options = BumpOptions::default();
        options
            .disallowed
            .insert("a".to_string(), vec![ChangeType::Major]);

        let err = BumpCalculator::new(&ws).calculate(&changes, &options).unwrap_err();
        assert!(matches!(
            err,
            Error::DisallowedChangeType { ref package, change_type: ChangeType::Major } if package == "a"
        ));
    }

    #[test]
    fn test_private_packages_never_bumped() {
        let mut private = package("b", "1.0.0", &["a"]);
        private.private = true;
        let ws = workspace(vec![package("a", "1.0.0", &[]), private]);
        let changes = vec![
            change("a", ChangeType::Minor, ChangeType::Patch),
            change("b", ChangeType::Minor, ChangeType::Patch),
        ];

        let info = BumpCalculator::new(&ws).calculate(&changes, &bump_deps()).unwrap();
        assert!(info.new_versions.contains_key("a"));
        assert!(!info.new_versions.contains_key("b"));
    }

    #[test]
    fn test_none_change_type_does_not_bump() {
        let ws = workspace(vec![package("a", "1.0.0", &[]), package("b", "1.0.0", &["a"])]);
        let changes = vec![change("a", ChangeType::None, ChangeType::Patch)];

        let info = BumpCalculator::new(&ws).calculate(&changes, &bump_deps()).unwrap();
        assert!(info.is_empty());
    }

    #[test]
    fn test_dependent_change_type_fallback() {
        let ws = workspace(vec![package("a", "1.0.0", &[]), package("b", "1.0.0", &["a"])]);
        let mut without = change("a", ChangeType::Patch, ChangeType::Patch);
        without.info.dependent_change_type = None;
        let changes = vec![without];
        let options = BumpOptions {
            bump_deps: true,
            dependent_change_type: ChangeType::Minor,
            ..BumpOptions::default()
        };

        let info = BumpCalculator::new(&ws).calculate(&changes, &options).unwrap();
        assert_eq!(info.new_versions["b"].to_string(), "1.1.0");
    }
}
