//! Command-line options, converted once per process.
//!
//! `main` builds a single [`CliOptionsCache`] from the parsed arguments and
//! passes it to every command. The CLI layer is computed on first use and the
//! same reference is handed out afterwards.

use crate::cli::Cli;
use beachball_release::options::{resolve_options, resolve_package_options};
use beachball_release::{BeachballOptions, CliOptions};
use std::path::Path;
use std::sync::OnceLock;

/// The parsed command line and its memoized options layer.
#[derive(Debug)]
pub struct CliOptionsCache {
    cli: Cli,
    options: OnceLock<CliOptions>,
}

impl CliOptionsCache {
    /// Wrap parsed arguments.
    #[must_use]
    pub const fn new(cli: Cli) -> Self {
        Self {
            cli,
            options: OnceLock::new(),
        }
    }

    /// Parse `args` (program name first).
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments, `--help` or `--version`.
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        use clap::Parser;
        Cli::try_parse_from(args).map(Self::new)
    }

    /// The parsed arguments.
    #[must_use]
    pub const fn cli(&self) -> &Cli {
        &self.cli
    }

    /// The command-line options layer.
    pub fn get(&self) -> &CliOptions {
        self.options.get_or_init(|| {
            let options = self.cli.to_cli_options();
            tracing::debug!(options = ?options, "Parsed command-line options");
            options
        })
    }

    /// Effective repository options: defaults, repository config, CLI.
    #[must_use]
    pub fn get_options(&self, cwd: &Path) -> BeachballOptions {
        resolve_options(cwd, self.get())
    }

    /// Effective options for the package at `package_path`: defaults,
    /// repository config, package config, CLI.
    #[must_use]
    pub fn get_package_options(&self, cwd: &Path, package_path: &Path) -> BeachballOptions {
        resolve_package_options(cwd, package_path, self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_same_reference() {
        let cache = CliOptionsCache::try_from_args(["beachball", "check", "-b", "origin/main"]).unwrap();
        let first = cache.get();
        let second = cache.get();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.branch.as_deref(), Some("origin/main"));
    }

    #[test]
    fn test_invalid_args_are_rejected() {
        assert!(CliOptionsCache::try_from_args(["beachball", "--type", "gigantic"]).is_err());
    }
}
