//! Package manager invocations.
//!
//! Every wrapper runs its binary to completion and reports the outcome in a
//! [`PackageManagerResult`]; failures are data, not errors.

use beachball_workspaces::PackageManager;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Outcome of a package manager run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageManagerResult {
    /// Whether the process started and exited with status 0.
    pub success: bool,
    /// Exit code, when the process exited normally.
    pub exit_code: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// Why the process could not be run, if it could not.
    pub error: Option<String>,
}

impl PackageManagerResult {
    /// Combined stdout and stderr, for diagnostics.
    #[must_use]
    pub fn all_output(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{out}\n{err}"),
        }
    }
}

/// Run `program args` in `cwd` to completion.
pub async fn run_command(program: &str, args: &[&str], cwd: &Path) -> PackageManagerResult {
    tracing::debug!(program, args = ?args, cwd = %cwd.display(), "Running command");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .await;

    match output {
        Ok(output) => {
            let result = PackageManagerResult {
                success: output.status.success(),
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                error: None,
            };
            if !result.success {
                tracing::debug!(program, exit_code = ?result.exit_code, "Command failed");
            }
            result
        }
        Err(e) => {
            tracing::debug!(program, error = %e, "Command could not be started");
            PackageManagerResult {
                success: false,
                error: Some(format!("Failed to run {program}: {e}")),
                ..PackageManagerResult::default()
            }
        }
    }
}

/// Run `npm args` in `cwd`.
pub async fn npm(args: &[&str], cwd: &Path) -> PackageManagerResult {
    run_command(PackageManager::Npm.binary(), args, cwd).await
}

/// Run `pnpm args` in `cwd`.
pub async fn pnpm(args: &[&str], cwd: &Path) -> PackageManagerResult {
    run_command(PackageManager::Pnpm.binary(), args, cwd).await
}

/// Run `yarn args` in `cwd`.
pub async fn yarn(args: &[&str], cwd: &Path) -> PackageManagerResult {
    run_command(PackageManager::Yarn.binary(), args, cwd).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_command_success() {
        let temp = TempDir::new().unwrap();
        let result = run_command("sh", &["-c", "echo hello"], temp.path()).await;
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "hello");
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_run_command_nonzero_exit() {
        let temp = TempDir::new().unwrap();
        let result = run_command("sh", &["-c", "echo oops >&2; exit 2"], temp.path()).await;
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(2));
        assert_eq!(result.stderr.trim(), "oops");
        assert_eq!(result.all_output(), "oops");
    }

    #[tokio::test]
    async fn test_run_command_missing_binary() {
        let temp = TempDir::new().unwrap();
        let result = run_command("definitely-not-a-real-binary-xyz", &[], temp.path()).await;
        assert!(!result.success);
        assert!(result.exit_code.is_none());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_pnpm_and_yarn_failures_are_results() {
        let temp = TempDir::new().unwrap();
        // fails whether or not the binaries are installed
        let result = pnpm(&["__beachball_missing_script__"], temp.path()).await;
        assert!(!result.success);
        let result = yarn(&["__beachball_missing_script__"], temp.path()).await;
        assert!(!result.success);
    }
}
