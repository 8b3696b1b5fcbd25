//! Discovery for pnpm workspaces via `pnpm-workspace.yaml`.

use super::{WorkspaceDiscovery, read_yaml_file};
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Reads workspace patterns from the `packages` list of `pnpm-workspace.yaml`.
pub struct PnpmWorkspaceDiscovery;

#[derive(Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

impl WorkspaceDiscovery for PnpmWorkspaceDiscovery {
    fn patterns(&self, root: &Path) -> Result<Option<Vec<String>>> {
        let path = root.join("pnpm-workspace.yaml");
        if !path.exists() {
            return Ok(None);
        }
        let config: PnpmWorkspace = read_yaml_file(&path)?;
        Ok(Some(config.packages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_pnpm_patterns() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("pnpm-workspace.yaml"),
            "packages:\n  - 'packages/*'\n  - '!packages/internal'\n",
        )
        .unwrap();

        let patterns = PnpmWorkspaceDiscovery.patterns(temp.path()).unwrap().unwrap();
        assert_eq!(patterns, vec!["packages/*", "!packages/internal"]);
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(PnpmWorkspaceDiscovery.patterns(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pnpm-workspace.yaml"), "packages: [unclosed").unwrap();
        assert!(PnpmWorkspaceDiscovery.patterns(temp.path()).is_err());
    }
}
