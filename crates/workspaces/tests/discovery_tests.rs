//! End-to-end discovery tests against on-disk monorepo layouts.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use beachball_workspaces::{Error, PackageManager, discover_workspace};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_yarn_workspace_discovery() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "package.json",
        r#"{"name": "monorepo", "private": true, "workspaces": ["packages/*"]}"#,
    );
    write(root, "yarn.lock", "");
    write(
        root,
        "packages/foo/package.json",
        r#"{"name": "foo", "version": "1.0.0"}"#,
    );
    write(
        root,
        "packages/bar/package.json",
        r#"{"name": "bar", "version": "1.2.0", "dependencies": {"foo": "^1.0.0"}}"#,
    );
    // directories without a manifest are ignored
    fs::create_dir_all(root.join("packages/empty")).unwrap();

    let ws = discover_workspace(root).unwrap();

    assert_eq!(ws.manager, PackageManager::Yarn);
    let names: Vec<&str> = ws.packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["bar", "foo"]);

    let bar = ws.get("bar").unwrap();
    assert_eq!(bar.version, "1.2.0");
    assert!(bar.depends_on("foo"));
    assert_eq!(bar.path, root.join("packages/bar"));
}

#[test]
fn test_pnpm_workspace_discovery() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "package.json", r#"{"name": "monorepo", "private": true}"#);
    write(root, "pnpm-workspace.yaml", "packages:\n  - 'libs/*'\n");
    write(
        root,
        "libs/core/package.json",
        r#"{"name": "@scope/core", "version": "0.1.0", "beachball": {"disallowedChangeTypes": ["major"]}}"#,
    );

    let ws = discover_workspace(root).unwrap();

    assert_eq!(ws.manager, PackageManager::Pnpm);
    assert_eq!(ws.len(), 1);
    let core = ws.get("@scope/core").unwrap();
    assert_eq!(core.version, "0.1.0");
    assert_eq!(core.path, root.join("libs/core"));
}

#[test]
fn test_single_package_repo() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "package.json", r#"{"name": "solo", "version": "2.0.0"}"#);

    let ws = discover_workspace(root).unwrap();

    assert_eq!(ws.manager, PackageManager::Npm);
    assert_eq!(ws.len(), 1);
    assert_eq!(
        ws.package_for_file(Path::new("src/index.js")).unwrap().name,
        "solo"
    );
}

#[test]
fn test_missing_root_manifest() {
    let temp = TempDir::new().unwrap();
    let err = discover_workspace(temp.path()).unwrap_err();
    assert!(matches!(err, Error::WorkspaceNotFound { .. }));
}

#[test]
fn test_duplicate_package_names() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "package.json",
        r#"{"name": "monorepo", "workspaces": ["packages/*"]}"#,
    );
    write(root, "packages/a/package.json", r#"{"name": "same"}"#);
    write(root, "packages/b/package.json", r#"{"name": "same"}"#);

    let err = discover_workspace(root).unwrap_err();
    assert!(matches!(err, Error::DuplicatePackage { ref name, .. } if name == "same"));
}

#[test]
fn test_malformed_member_is_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "package.json",
        r#"{"name": "monorepo", "workspaces": ["packages/*"]}"#,
    );
    write(root, "packages/good/package.json", r#"{"name": "good"}"#);
    write(root, "packages/bad/package.json", "{ nope");

    let ws = discover_workspace(root).unwrap();
    assert_eq!(ws.len(), 1);
    assert!(ws.contains("good"));
}
