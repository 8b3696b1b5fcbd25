//! `beachball bump`: apply change files to versions and changelogs.

use super::{CommandContext, Result, render};
use beachball_release::{
    BumpCalculator, BumpInfo, ChangeFile, ChangeFileManager, ChangeType, Git, apply_bumps,
    build_entries, write_changelogs,
};
use beachball_workspaces::Workspace;
use serde::Serialize;
use std::fmt;

/// One package version change.
#[derive(Debug, Clone, Serialize)]
pub struct BumpedPackage {
    /// Package name.
    pub name: String,
    /// Version before the bump.
    pub from: String,
    /// Version after the bump.
    pub to: String,
    /// Effective change type.
    pub change_type: ChangeType,
}

/// Output of `beachball bump`.
#[derive(Debug, Serialize)]
pub struct BumpReport {
    /// Bumped packages, by name.
    pub bumped: Vec<BumpedPackage>,
    /// Change files deleted after bumping.
    pub deleted_change_files: usize,
}

impl fmt::Display for BumpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bumped.is_empty() {
            write!(f, "No packages to bump")?;
        }
        for (i, pkg) in self.bumped.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {} -> {} ({})", pkg.name, pkg.from, pkg.to, pkg.change_type)?;
        }
        if self.deleted_change_files > 0 {
            write!(f, "\nDeleted {} change file(s)", self.deleted_change_files)?;
        }
        Ok(())
    }
}

/// Pending work: the workspace as it was before bumping, its change files and
/// the calculated bumps.
pub struct PendingBump {
    /// Workspace with pre-bump versions.
    pub workspace: Workspace,
    /// Change files consumed by the bump.
    pub changes: Vec<ChangeFile>,
    /// Calculated bumps.
    pub info: BumpInfo,
}

impl PendingBump {
    /// Versions before and after, by package name.
    #[must_use]
    pub fn bumped_packages(&self) -> Vec<BumpedPackage> {
        self.info
            .new_versions
            .iter()
            .map(|(name, version)| BumpedPackage {
                name: name.clone(),
                from: self
                    .workspace
                    .get(name)
                    .map(|pkg| pkg.version.clone())
                    .unwrap_or_default(),
                to: version.to_string(),
                change_type: self
                    .info
                    .change_types
                    .get(name)
                    .copied()
                    .unwrap_or(ChangeType::None),
            })
            .collect()
    }

    /// Record the commit that added each change file, for changelog links.
    /// Files git knows nothing about keep `commit` unset.
    pub fn fill_commits(&mut self, git: &Git) {
        for change in self.changes.iter_mut().filter(|c| c.info.commit.is_none()) {
            match git.commit_adding(&change.path) {
                Ok(commit) => change.info.commit = commit,
                Err(e) => {
                    tracing::debug!(file = %change.path.display(), error = %e, "No commit for change file");
                }
            }
        }
    }
}

/// Read change files and calculate bumps without touching the tree.
///
/// # Errors
///
/// Returns an error if discovery fails, change files cannot be read, or a
/// change type is disallowed.
pub fn calculate(ctx: &CommandContext<'_>) -> Result<PendingBump> {
    let workspace = ctx.workspace()?;
    let changes = ChangeFileManager::new(ctx.root()).read_all()?;
    let options = ctx.bump_options(&workspace);
    let info = BumpCalculator::new(&workspace).calculate(&changes, &options)?;
    Ok(PendingBump {
        workspace,
        changes,
        info,
    })
}

/// Write versions, dependency ranges and changelogs, then delete the consumed
/// change files unless `keepChangeFiles` is set.
///
/// Change files are consumed even when none of them bumps anything, such as
/// a batch of `none` changes.
///
/// # Errors
///
/// Returns an error if a manifest, changelog or change file cannot be written.
pub fn apply(ctx: &CommandContext<'_>, pending: &PendingBump) -> Result<BumpReport> {
    let bumped = pending.bumped_packages();

    if !pending.info.is_empty() {
        let written = apply_bumps(&pending.workspace, &pending.info)?;
        tracing::info!(manifests = written.len(), "Updated package.json files");

        if ctx.options.generate_changelog {
            let entries = build_entries(&pending.info, &pending.changes, chrono::Utc::now());
            for (name, entry) in &entries {
                if let Some(pkg) = pending.workspace.get(name) {
                    write_changelogs(&pkg.path, name, entry)?;
                }
            }
        }
    }

    let deleted_change_files = if ctx.options.keep_change_files || pending.changes.is_empty() {
        0
    } else {
        ChangeFileManager::new(ctx.root()).delete_all(&pending.changes)?;
        pending.changes.len()
    };

    Ok(BumpReport {
        bumped,
        deleted_change_files,
    })
}

/// Execute the `bump` command.
///
/// # Errors
///
/// See [`calculate`] and [`apply`].
pub fn execute_bump(ctx: &CommandContext<'_>) -> Result<String> {
    let mut pending = calculate(ctx)?;
    pending.fill_commits(&ctx.git());
    let report = apply(ctx, &pending)?;
    render(&report, ctx.json)
}
