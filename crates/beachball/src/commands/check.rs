//! `beachball check`: verify that every changed package has a change file.

use super::{CommandContext, Result, packages_with_change_files, render};
use crate::cli::CliError;
use beachball_release::{ChangeFileManager, Error};
use serde::Serialize;
use std::fmt;

/// Output of a passing `beachball check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Public packages changed relative to the target branch.
    pub changed_packages: Vec<String>,
    /// Number of pending change files.
    pub change_files: usize,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changed_packages.is_empty() {
            write!(f, "No change files are needed")
        } else {
            write!(
                f,
                "Found change files for all changed packages: {}",
                self.changed_packages.join(", ")
            )
        }
    }
}

/// Execute the `check` command.
///
/// # Errors
///
/// Returns a configuration error if a change file uses a change type its
/// package disallows, and a failure listing the packages that need change
/// files, with the `changehint` as help.
pub fn execute_check(ctx: &CommandContext<'_>) -> Result<String> {
    let workspace = ctx.workspace()?;
    let changes = ChangeFileManager::new(ctx.root()).read_all()?;

    for change in &changes {
        let name = &change.info.package_name;
        let Some(pkg) = workspace.get(name) else {
            tracing::warn!(
                package = %name,
                path = %change.path.display(),
                "Change file refers to a package that is not in the workspace"
            );
            continue;
        };
        let disallowed = ctx.package_options(pkg).disallowed_change_types.unwrap_or_default();
        if disallowed.contains(&change.info.change_type) {
            return Err(Error::DisallowedChangeType {
                package: name.clone(),
                change_type: change.info.change_type,
            }
            .into());
        }
    }

    let changed = ctx.changed_packages(&workspace)?;
    let covered = packages_with_change_files(&changes);
    let missing: Vec<&str> = changed
        .iter()
        .filter(|name| !covered.contains(*name))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        tracing::debug!(missing = ?missing, "Packages without change files");
        return Err(CliError::failed_with_help(
            format!("Change files are needed for: {}", missing.join(", ")),
            ctx.options.changehint.clone(),
        ));
    }

    render(
        &CheckReport {
            changed_packages: changed.into_iter().collect(),
            change_files: changes.len(),
        },
        ctx.json,
    )
}
