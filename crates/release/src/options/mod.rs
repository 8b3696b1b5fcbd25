//! Layered option resolution.
//!
//! Effective options are built by merging, in increasing precedence:
//!
//! 1. [`BeachballOptions::defaults`]
//! 2. repository configuration ([`repo_options`])
//! 3. package configuration ([`package_options`]), for per-package settings
//! 4. command-line options
//!
//! Merging is shallow: a field set in a higher layer replaces the lower value.

mod config_file;
mod defaults;
mod types;

pub use config_file::{CONFIG_FILE_NAMES, ConfigSource, find_config, package_options, repo_options};
pub use defaults::{DEFAULT_BRANCH, DEFAULT_CHANGEHINT, DEFAULT_REGISTRY, DEFAULT_TAG};
pub use types::{
    Access, BeachballOptions, CliOptions, Command, PackageOptions, PartialOptions, RepoOptions,
};

use std::path::{Path, PathBuf};

/// Repository root: the CLI `path` resolved against `cwd`, or `cwd` itself.
#[must_use]
pub fn repo_root(cwd: &Path, cli: &CliOptions) -> PathBuf {
    cli.path.as_deref().map_or_else(|| cwd.to_path_buf(), |path| cwd.join(path))
}

/// Defaults, then repository config found from the CLI `path` (or `cwd`),
/// then the CLI layer.
#[must_use]
pub fn resolve_options(cwd: &Path, cli: &CliOptions) -> BeachballOptions {
    let root = repo_root(cwd, cli);
    let repo = repo_options(&root);
    let mut options = BeachballOptions::defaults(&root).merged([&repo, cli]);
    options.path = root;
    options
}

/// Effective options for a single package: defaults, repository config,
/// the package's own config, then the CLI layer.
#[must_use]
pub fn resolve_package_options(
    cwd: &Path,
    package_path: &Path,
    cli: &CliOptions,
) -> BeachballOptions {
    let root = repo_root(cwd, cli);
    let repo = repo_options(&root);
    let package = package_options(&root.join(package_path));
    let mut options = BeachballOptions::defaults(&root).merged([&repo, &package, cli]);
    options.path = root;
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_file::ChangeType;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_wins_over_every_layer() {
        let temp = TempDir::new().unwrap();
        let pkg = temp.path().join("packages/a");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(temp.path().join(".beachballrc.json"), r#"{"tag": "repo"}"#).unwrap();
        fs::write(
            pkg.join("package.json"),
            r#"{"name": "a", "beachball": {"tag": "package"}}"#,
        )
        .unwrap();

        let cli = CliOptions {
            tag: Some("cli".to_string()),
            ..CliOptions::default()
        };
        let opts = resolve_package_options(temp.path(), &pkg, &cli);
        assert_eq!(opts.tag, "cli");

        let opts = resolve_package_options(temp.path(), &pkg, &CliOptions::default());
        assert_eq!(opts.tag, "package");

        let opts = resolve_options(temp.path(), &CliOptions::default());
        assert_eq!(opts.tag, "repo");
    }

    #[test]
    fn test_package_layer_overrides_repo() {
        let temp = TempDir::new().unwrap();
        let pkg = temp.path().join("packages/a");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            temp.path().join(".beachballrc.json"),
            r#"{"disallowedChangeTypes": ["major"]}"#,
        )
        .unwrap();
        fs::write(
            pkg.join("package.json"),
            r#"{"name": "a", "beachball": {"disallowedChangeTypes": ["minor"]}}"#,
        )
        .unwrap();

        let opts = resolve_package_options(temp.path(), &pkg, &CliOptions::default());
        assert_eq!(opts.disallowed_change_types, Some(vec![ChangeType::Minor]));
    }

    #[test]
    fn test_cli_path_selects_repo() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join(".beachballrc.json"), r#"{"registry": "http://localhost:4873"}"#).unwrap();

        let cli = CliOptions {
            path: Some(repo.clone()),
            ..CliOptions::default()
        };
        let opts = resolve_options(temp.path(), &cli);
        assert_eq!(opts.path, repo);
        assert_eq!(opts.registry, "http://localhost:4873");
    }

    #[test]
    fn test_relative_cli_path_is_resolved_against_cwd() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        fs::create_dir_all(&repo).unwrap();
        fs::write(temp.path().join(".beachballrc.json"), r#"{"tag": "parent"}"#).unwrap();
        fs::write(repo.join(".beachballrc.json"), r#"{"branch": "origin/main"}"#).unwrap();

        let cli = CliOptions {
            path: Some(PathBuf::from("repo")),
            ..CliOptions::default()
        };
        let opts = resolve_options(temp.path(), &cli);
        assert!(opts.path.is_absolute());
        assert_eq!(opts.path, repo);
        assert_eq!(opts.branch, "origin/main");

        assert_eq!(repo_root(temp.path(), &CliOptions::default()), temp.path());
    }
}
