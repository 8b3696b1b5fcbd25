//! Option precedence through the command-line cache.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use beachball::CliOptionsCache;
use beachball_release::options::{DEFAULT_BRANCH, DEFAULT_REGISTRY};
use beachball_release::{Access, ChangeType, Command};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cache(args: &[&str]) -> CliOptionsCache {
    let mut all = vec!["beachball"];
    all.extend_from_slice(args);
    CliOptionsCache::try_from_args(all).unwrap()
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_defaults_without_config_or_flags() {
    let temp = TempDir::new().unwrap();
    let options = cache(&[]).get_options(temp.path());

    assert_eq!(options.path, temp.path());
    assert_eq!(options.command, Command::Change);
    assert_eq!(options.branch, DEFAULT_BRANCH);
    assert_eq!(options.branch, "origin/master");
    assert_eq!(options.registry, DEFAULT_REGISTRY);
    assert_eq!(options.registry, "https://registry.npmjs.org/");
    assert_eq!(options.access, Access::Restricted);
    assert_eq!(options.tag, "latest");
    assert!(options.fetch && options.push && options.publish && options.bump_deps);
    assert!(!options.yes);
    assert!(options.package.is_none());
    assert!(options.change_type.is_none());
}

#[test]
fn test_cli_wins_over_package_repo_and_defaults() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        ".beachballrc.json",
        r#"{"branch": "origin/repo", "tag": "repo", "access": "public", "push": false}"#,
    );
    write(
        root,
        "packages/a/package.json",
        r#"{"name": "a", "version": "1.0.0", "beachball": {"tag": "package", "branch": "origin/package"}}"#,
    );
    let pkg = root.join("packages/a");

    let flags = cache(&["-b", "origin/cli", "-t", "cli", "--access", "restricted", "--push"]);
    let options = flags.get_package_options(root, &pkg);
    assert_eq!(options.branch, "origin/cli");
    assert_eq!(options.tag, "cli");
    assert_eq!(options.access, Access::Restricted);
    assert!(options.push);

    let bare = cache(&[]);
    let options = bare.get_package_options(root, &pkg);
    assert_eq!(options.tag, "package");
    assert_eq!(options.branch, "origin/package");
    assert_eq!(options.access, Access::Public);
    assert!(!options.push);

    let options = bare.get_options(root);
    assert_eq!(options.tag, "repo");
    assert_eq!(options.branch, "origin/repo");
}

#[test]
fn test_yaml_rc_and_package_json_key() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, ".beachballrc", "disallowedChangeTypes:\n  - major\ntype: patch\n");
    let options = cache(&[]).get_options(root);
    assert_eq!(options.disallowed_change_types, Some(vec![ChangeType::Major]));
    assert_eq!(options.change_type, Some(ChangeType::Patch));

    let other = TempDir::new().unwrap();
    write(
        other.path(),
        "package.json",
        r#"{"name": "root", "beachball": {"registry": "http://localhost:4873"}}"#,
    );
    let options = cache(&[]).get_options(other.path());
    assert_eq!(options.registry, "http://localhost:4873");
}

#[test]
fn test_unparsable_config_is_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, ".beachballrc.json", "{ not json");
    write(root, "beachball.config.json", r#"{"tag": "from-config"}"#);

    let options = cache(&[]).get_options(root);
    assert_eq!(options.tag, "from-config");
}

#[test]
fn test_path_flag_selects_repository() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repo");
    write(&repo, ".beachballrc.json", r#"{"branch": "upstream/main"}"#);

    let path = repo.to_string_lossy().into_owned();
    let options = cache(&["--path", &path]).get_options(temp.path());
    assert_eq!(options.path, repo);
    assert_eq!(options.branch, "upstream/main");
}

#[test]
fn test_cache_returns_same_options() {
    let flags = cache(&["check", "--no-fetch"]);
    assert!(std::ptr::eq(flags.get(), flags.get()));
    assert_eq!(flags.get().fetch, Some(false));
    assert_eq!(flags.get().command, Some(Command::Check));
}
