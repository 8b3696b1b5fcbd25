//! Git plumbing via the `git` executable.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Split `remote/branch` into its parts.
///
/// Only the first `/` separates the remote, so `origin/feature/x` yields
/// `("origin", "feature/x")`. A value without `/` is a branch on `origin`.
#[must_use]
pub fn parse_remote_branch(branch: &str) -> (String, String) {
    match branch.split_once('/') {
        Some((remote, name)) if !remote.is_empty() && !name.is_empty() => {
            (remote.to_string(), name.to_string())
        }
        _ => ("origin".to_string(), branch.to_string()),
    }
}

/// Release tag for a package version: `<name>_v<version>`.
#[must_use]
pub fn release_tag(package: &str, version: &str) -> String {
    format!("{package}_v{version}")
}

/// A git working tree.
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
}

impl Git {
    /// Operate on the repository containing `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(args = ?args, cwd = %self.root.display(), "git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::git(format!("Failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(output)
    }

    fn run_stdout(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Fetch `branch` from `remote`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub fn fetch(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["fetch", remote, branch]).map(|_| ())
    }

    /// Repo-relative paths changed since `branch`: committed changes
    /// (`<branch>...HEAD`), staged and unstaged changes, and untracked files.
    ///
    /// # Errors
    ///
    /// Returns an error if `branch` cannot be compared against.
    pub fn changed_files(&self, branch: &str) -> Result<Vec<PathBuf>> {
        let mut changed = BTreeSet::new();

        let committed = self.run_stdout(&["diff", "--name-only", "--relative", &format!("{branch}...HEAD")])?;
        let staged = self.run_stdout(&["diff", "--name-only", "--relative", "--cached"])?;
        let unstaged = self.run_stdout(&["diff", "--name-only", "--relative"])?;
        let untracked = self.run_stdout(&["ls-files", "--others", "--exclude-standard"])?;

        for list in [committed, staged, unstaged, untracked] {
            changed.extend(list.lines().filter(|l| !l.is_empty()).map(PathBuf::from));
        }
        Ok(changed.into_iter().collect())
    }

    /// Stage paths.
    ///
    /// # Errors
    ///
    /// Returns an error if `git add` fails.
    pub fn add(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add".to_string(), "--".to_string()];
        args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&args).map(|_| ())
    }

    /// Stage everything in the working tree.
    ///
    /// # Errors
    ///
    /// Returns an error if `git add` fails.
    pub fn add_all(&self) -> Result<()> {
        self.run(&["add", "--all"]).map(|_| ())
    }

    /// Commit staged changes.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to commit or the commit fails.
    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    /// Create a lightweight tag at HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag exists or cannot be created.
    pub fn tag(&self, name: &str) -> Result<()> {
        self.run(&["tag", name]).map(|_| ())
    }

    /// Push HEAD to `remote/branch` along with tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the push fails.
    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["push", "--follow-tags", "--no-verify", remote, &format!("HEAD:{branch}")])
            .map(|_| ())
    }

    /// Configured `user.email`, if any.
    #[must_use]
    pub fn user_email(&self) -> Option<String> {
        self.run_stdout(&["config", "user.email"])
            .ok()
            .filter(|email| !email.is_empty())
    }

    /// The most recent commit that added `path`, or `None` when the file was
    /// never committed.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot read the history.
    pub fn commit_adding(&self, path: &Path) -> Result<Option<String>> {
        let path = path.to_string_lossy();
        let hash = self.run_stdout(&["log", "-1", "--diff-filter=A", "--format=%H", "--", &path])?;
        Ok(Some(hash).filter(|hash| !hash.is_empty()))
    }
}
