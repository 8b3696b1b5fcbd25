//! Discovery for npm and Yarn workspaces via `package.json`.

use super::{ManifestJson, WorkspaceDiscovery, read_json_file};
use crate::error::Result;
use std::path::Path;

/// Reads workspace patterns from the `workspaces` field of the root
/// `package.json`, in either the array or the `{ "packages": [...] }` form.
pub struct PackageJsonDiscovery;

impl WorkspaceDiscovery for PackageJsonDiscovery {
    fn patterns(&self, root: &Path) -> Result<Option<Vec<String>>> {
        let manifest: ManifestJson = read_json_file(&root.join("package.json"))?;
        Ok(manifest.workspaces.map(super::WorkspacesField::into_patterns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_array_patterns() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "root", "workspaces": ["packages/*"]}"#,
        )
        .unwrap();

        let patterns = PackageJsonDiscovery.patterns(temp.path()).unwrap();
        assert_eq!(patterns, Some(vec!["packages/*".to_string()]));
    }

    #[test]
    fn test_object_patterns() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "root", "workspaces": {"packages": ["libs/*"], "nohoist": []}}"#,
        )
        .unwrap();

        let patterns = PackageJsonDiscovery.patterns(temp.path()).unwrap();
        assert_eq!(patterns, Some(vec!["libs/*".to_string()]));
    }

    #[test]
    fn test_no_workspaces_field() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"name": "solo"}"#).unwrap();

        assert!(PackageJsonDiscovery.patterns(temp.path()).unwrap().is_none());
    }
}
