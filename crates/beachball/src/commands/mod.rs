//! Command handlers.
//!
//! Each handler returns the text to print on stdout, or the JSON envelope
//! when `--json` is set. Failures are [`CliError`]s whose variant picks the
//! exit code.

pub mod bump;
pub mod change;
pub mod check;
pub mod publish;

use crate::cli::{CliError, OkEnvelope};
use crate::options::CliOptionsCache;
use beachball_release::change_file::CHANGE_DIR;
use beachball_release::changelog::{CHANGELOG_JSON, CHANGELOG_MD};
use beachball_release::{BeachballOptions, BumpOptions, ChangeFile, ChangeType, Command, Git};
use beachball_workspaces::{PackageInfo, Workspace, discover_workspace};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::Instrument;

/// Result type for command handlers.
pub type Result<T> = std::result::Result<T, CliError>;

/// Everything a command needs: resolved options plus access to per-package
/// configuration.
pub struct CommandContext<'a> {
    cache: &'a CliOptionsCache,
    cwd: PathBuf,
    /// Effective repository options.
    pub options: BeachballOptions,
    /// Whether to emit a JSON envelope.
    pub json: bool,
}

impl<'a> CommandContext<'a> {
    /// Resolve options for an invocation started in `cwd`.
    #[must_use]
    pub fn new(cache: &'a CliOptionsCache, cwd: &Path) -> Self {
        let options = cache.get_options(cwd);
        Self {
            cache,
            cwd: cwd.to_path_buf(),
            json: cache.cli().json,
            options,
        }
    }

    /// Repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.options.path
    }

    /// Options with the package's own configuration layered in.
    #[must_use]
    pub fn package_options(&self, package: &PackageInfo) -> BeachballOptions {
        self.cache.get_package_options(&self.cwd, &package.path)
    }

    /// Discover the packages in the repository.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the root has no `package.json`.
    pub fn workspace(&self) -> Result<Workspace> {
        Ok(discover_workspace(self.root())?)
    }

    /// Git access at the repository root.
    #[must_use]
    pub fn git(&self) -> Git {
        Git::new(self.root())
    }

    /// `disallowedChangeTypes` for every package that sets it.
    #[must_use]
    pub fn disallowed_change_types(&self, workspace: &Workspace) -> HashMap<String, Vec<ChangeType>> {
        workspace
            .packages
            .iter()
            .filter_map(|pkg| {
                self.package_options(pkg)
                    .disallowed_change_types
                    .map(|types| (pkg.name.clone(), types))
            })
            .collect()
    }

    /// Bump settings from the options.
    #[must_use]
    pub fn bump_options(&self, workspace: &Workspace) -> BumpOptions {
        BumpOptions {
            bump_deps: self.options.bump_deps,
            dependent_change_type: self.options.dependent_change_type,
            prerelease_prefix: self.options.prerelease_prefix.clone(),
            disallowed: self.disallowed_change_types(workspace),
        }
    }

    /// Public packages with changes relative to the target branch, fetching
    /// the branch first when `fetch` is set.
    ///
    /// Change files and changelogs do not count as changes.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot fetch or compare against the branch.
    pub fn changed_packages(&self, workspace: &Workspace) -> Result<BTreeSet<String>> {
        let git = self.git();
        if self.options.fetch {
            let (remote, branch) = self.options.remote_and_branch();
            git.fetch(&remote, &branch)?;
        }

        let files = git.changed_files(&self.options.branch)?;
        let mut changed = BTreeSet::new();
        for file in files.iter().filter(|f| counts_as_change(f)) {
            match workspace.package_for_file(file) {
                Some(pkg) if pkg.private => {
                    tracing::trace!(file = %file.display(), package = %pkg.name, "Ignoring private package change");
                }
                Some(pkg) => {
                    changed.insert(pkg.name.clone());
                }
                None => tracing::trace!(file = %file.display(), "File belongs to no package"),
            }
        }

        tracing::debug!(count = changed.len(), "Changed packages");
        Ok(changed)
    }
}

fn counts_as_change(file: &Path) -> bool {
    if file.starts_with(CHANGE_DIR) {
        return false;
    }
    !file
        .file_name()
        .is_some_and(|name| name == CHANGELOG_MD || name == CHANGELOG_JSON)
}

/// Packages that have at least one change file.
#[must_use]
pub fn packages_with_change_files(changes: &[ChangeFile]) -> BTreeSet<String> {
    changes.iter().map(|c| c.info.package_name.clone()).collect()
}

/// Render a report as text or as a JSON envelope.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn render<T: Serialize + Display>(report: &T, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(&OkEnvelope::new(report))
            .map_err(|e| CliError::failed(format!("Failed to serialize output: {e}")))
    } else {
        Ok(report.to_string())
    }
}

/// Run the command selected by the options.
///
/// # Errors
///
/// Returns the command's error.
pub async fn execute(cache: &CliOptionsCache, cwd: &Path) -> Result<String> {
    let ctx = CommandContext::new(cache, cwd);
    let command = ctx.options.command;
    let span = crate::command_span!(command);

    async move {
        tracing::info!(root = %ctx.root().display(), "Running command");
        match command {
            Command::Change => change::execute_change(&ctx),
            Command::Check => check::execute_check(&ctx),
            Command::Bump => bump::execute_bump(&ctx),
            Command::Publish => publish::execute_publish(&ctx).await,
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_as_change() {
        assert!(counts_as_change(Path::new("packages/a/index.js")));
        assert!(!counts_as_change(Path::new("change/a-1234.json")));
        assert!(!counts_as_change(Path::new("packages/a/CHANGELOG.md")));
        assert!(!counts_as_change(Path::new("packages/a/CHANGELOG.json")));
        assert!(counts_as_change(Path::new("packages/changes/index.js")));
    }

    #[derive(Serialize)]
    struct Report {
        count: usize,
    }

    impl Display for Report {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{} items", self.count)
        }
    }

    #[test]
    fn test_render_text_and_json() {
        let report = Report { count: 2 };
        assert_eq!(render(&report, false).unwrap(), "2 items");
        let json: serde_json::Value = serde_json::from_str(&render(&report, true).unwrap()).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["data"]["count"], 2);
    }
}
