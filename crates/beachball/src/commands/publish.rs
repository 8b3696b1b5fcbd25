//! `beachball publish`: bump, publish to the registry, then commit, tag and push.

use super::bump::{self, BumpedPackage};
use super::{CommandContext, Result, render};
use crate::cli::CliError;
use beachball_npm::{PublishArgs, publish_package};
use beachball_release::{Git, PublishPlan, release_tag};
use serde::Serialize;
use std::fmt;

/// Commit message when `--message` is not given.
const RELEASE_COMMIT_MESSAGE: &str = "applying package updates";

/// Output of `beachball publish`.
#[derive(Debug, Default, Serialize)]
pub struct PublishReport {
    /// Whether the run stopped at the plan for lack of `--yes`.
    pub dry_run: bool,
    /// Bumped packages.
    pub bumped: Vec<BumpedPackage>,
    /// Packages in publish order.
    pub publish_order: Vec<String>,
    /// Packages published to the registry.
    pub published: Vec<String>,
    /// Created release tags.
    pub tags: Vec<String>,
    /// Whether the release commit was created.
    pub committed: bool,
    /// Whether the release was pushed.
    pub pushed: bool,
}

impl fmt::Display for PublishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bumped.is_empty() {
            write!(f, "Nothing to publish")?;
            if self.committed {
                write!(f, "\nCommitted removal of consumed change files")?;
            }
            return Ok(());
        }
        writeln!(f, "Bumps:")?;
        for pkg in &self.bumped {
            writeln!(f, "  {}: {} -> {}", pkg.name, pkg.from, pkg.to)?;
        }
        writeln!(f, "Publish order: {}", self.publish_order.join(", "))?;
        if self.dry_run {
            return write!(f, "Run again with --yes to publish");
        }
        if !self.published.is_empty() {
            writeln!(f, "Published: {}", self.published.join(", "))?;
        }
        if !self.tags.is_empty() {
            writeln!(f, "Tagged: {}", self.tags.join(", "))?;
        }
        match (self.committed, self.pushed) {
            (true, true) => write!(f, "Committed and pushed release"),
            (true, false) => write!(f, "Committed release, not pushed"),
            _ => write!(f, "Release changes were not committed"),
        }
    }
}

/// The git half of a release: commit, tag, push.
struct ReleaseCommit {
    git: Git,
    message: String,
    tags: Vec<String>,
    push_to: Option<(String, String)>,
}

impl ReleaseCommit {
    /// Returns the created tags and whether the release was pushed.
    fn run(self) -> Result<(Vec<String>, bool)> {
        self.git.add_all()?;
        self.git.commit(&self.message)?;
        for tag in &self.tags {
            self.git.tag(tag)?;
        }
        let pushed = match &self.push_to {
            Some((remote, branch)) => {
                self.git.push(remote, branch)?;
                true
            }
            None => false,
        };
        Ok((self.tags, pushed))
    }
}

/// Run blocking work (git, file history) off the async runtime.
async fn run_blocking<T, F>(task: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CliError::failed(format!("{task} task failed: {e}")))?
}

/// Execute the `publish` command.
///
/// Without `--yes` only the plan is printed. With it, packages are bumped,
/// published in dependency order, and the result committed, tagged and pushed
/// as the options allow. The first failing `npm publish` stops the run before
/// anything is committed.
///
/// # Errors
///
/// Returns an error if bumping fails, `npm publish` fails for any package, or
/// a git step fails.
pub async fn execute_publish(ctx: &CommandContext<'_>) -> Result<String> {
    let mut pending = bump::calculate(ctx)?;
    let plan = PublishPlan::from_bump(&pending.workspace, &pending.info)?;

    let mut report = PublishReport {
        dry_run: !ctx.options.yes,
        bumped: pending.bumped_packages(),
        publish_order: plan.iter().map(|p| p.name.clone()).collect(),
        ..PublishReport::default()
    };

    if pending.changes.is_empty() {
        tracing::info!("No change files, nothing to publish");
        return render(&report, ctx.json);
    }
    if report.dry_run {
        tracing::info!(packages = plan.len(), "Publish plan ready, waiting for --yes");
        return render(&report, ctx.json);
    }

    let git = ctx.git();
    let pending = run_blocking("Change file history", move || {
        pending.fill_commits(&git);
        Ok(pending)
    })
    .await?;
    let applied = bump::apply(ctx, &pending)?;

    if ctx.options.publish {
        for package in plan.iter() {
            let package_options = pending
                .workspace
                .get(&package.name)
                .map_or_else(|| ctx.options.clone(), |pkg| ctx.package_options(pkg));
            let args = PublishArgs::from_options(&package_options);

            let result = publish_package(&package.path, &args).await;
            if !result.success {
                let detail = match &result.error {
                    Some(error) => error.clone(),
                    None => result.all_output(),
                };
                return Err(CliError::failed_with_help(
                    format!("Publishing {}@{} failed: {detail}", package.name, package.version),
                    "Packages earlier in the publish order may already be on the registry",
                ));
            }
            tracing::info!(package = %package.name, version = %package.version, "Published");
            report.published.push(package.name.clone());
        }
    } else {
        tracing::info!("Skipping registry publish");
    }

    let touched_tree = !pending.info.is_empty() || applied.deleted_change_files > 0;
    if ctx.options.commit && touched_tree {
        let message = if ctx.options.message.trim().is_empty() {
            RELEASE_COMMIT_MESSAGE.to_string()
        } else {
            ctx.options.message.clone()
        };
        let tags = if ctx.options.git_tags {
            plan.iter()
                .map(|package| release_tag(&package.name, &package.version.to_string()))
                .collect()
        } else {
            Vec::new()
        };
        let release = ReleaseCommit {
            git: ctx.git(),
            message,
            tags,
            push_to: ctx.options.push.then(|| ctx.options.remote_and_branch()),
        };

        let (tags, pushed) = run_blocking("Release commit", move || release.run()).await?;
        report.committed = true;
        report.tags = tags;
        report.pushed = pushed;
    }

    render(&report, ctx.json)
}
