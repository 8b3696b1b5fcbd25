//! `beachball change`: write change files for changed packages.

use super::{CommandContext, Result, packages_with_change_files, render};
use crate::cli::CliError;
use beachball_release::{ChangeFileManager, ChangeInfo, ChangeType, Error};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Author recorded when git has no `user.email`.
const UNKNOWN_EMAIL: &str = "email not defined";
/// Commit message for change files.
const CHANGE_COMMIT_MESSAGE: &str = "Change files";

/// Output of `beachball change`.
#[derive(Debug, Serialize)]
pub struct ChangeReport {
    /// Packages that received a change file.
    pub packages: Vec<String>,
    /// Written change files.
    pub change_files: Vec<PathBuf>,
    /// Whether the change files were committed.
    pub committed: bool,
}

impl fmt::Display for ChangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.change_files.is_empty() {
            return write!(f, "No change files are needed");
        }
        for (package, path) in self.packages.iter().zip(&self.change_files) {
            writeln!(f, "Wrote change file for {package}: {}", path.display())?;
        }
        if self.committed {
            write!(f, "Committed {} change file(s)", self.change_files.len())
        } else {
            write!(f, "Change files were not committed")
        }
    }
}

/// Execute the `change` command.
///
/// Targets the `--package` list, or else every changed public package that
/// has no change file yet.
///
/// # Errors
///
/// Returns a configuration error when `--type` or `--message` is missing, a
/// named package does not exist, or the change type is disallowed for a
/// package. Git failures are command failures.
pub fn execute_change(ctx: &CommandContext<'_>) -> Result<String> {
    let workspace = ctx.workspace()?;
    let manager = ChangeFileManager::new(ctx.root());

    let targets: Vec<String> = if let Some(packages) = &ctx.options.package {
        for name in packages {
            if !workspace.contains(name) {
                return Err(Error::package_not_found(name).into());
            }
        }
        packages.clone()
    } else {
        let existing = packages_with_change_files(&manager.read_all()?);
        ctx.changed_packages(&workspace)?
            .into_iter()
            .filter(|name| !existing.contains(name))
            .collect()
    };

    if targets.is_empty() {
        tracing::info!("No packages need change files");
        return render(
            &ChangeReport {
                packages: Vec::new(),
                change_files: Vec::new(),
                committed: false,
            },
            ctx.json,
        );
    }

    let change_type = ctx.options.change_type.ok_or_else(|| {
        CliError::config_with_help(
            format!("A change type is required for: {}", targets.join(", ")),
            format!(
                "Pass --type with one of: {}",
                ChangeType::ALL.map(ChangeType::as_str).join(", ")
            ),
        )
    })?;
    if ctx.options.message.trim().is_empty() {
        return Err(CliError::config_with_help(
            "A change description is required",
            "Pass --message \"<description of the change>\"",
        ));
    }

    for name in &targets {
        let Some(pkg) = workspace.get(name) else {
            continue;
        };
        let disallowed = ctx.package_options(pkg).disallowed_change_types.unwrap_or_default();
        if disallowed.contains(&change_type) {
            return Err(Error::DisallowedChangeType {
                package: name.clone(),
                change_type,
            }
            .into());
        }
    }

    let git = ctx.git();
    let email = git.user_email().unwrap_or_else(|| UNKNOWN_EMAIL.to_string());

    let mut change_files = Vec::with_capacity(targets.len());
    for name in &targets {
        let info = ChangeInfo::new(
            name.clone(),
            change_type,
            ctx.options.message.clone(),
            email.clone(),
            ctx.options.dependent_change_type,
        );
        let path = manager.write(&info)?;
        tracing::info!(package = %name, path = %path.display(), "Wrote change file");
        change_files.push(path);
    }

    let committed = if ctx.options.commit {
        git.add(&change_files)?;
        git.commit(CHANGE_COMMIT_MESSAGE)?;
        true
    } else {
        false
    };

    render(
        &ChangeReport {
            packages: targets,
            change_files,
            committed,
        },
        ctx.json,
    )
}
