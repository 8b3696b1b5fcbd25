//! Built-in option defaults.

use super::types::{Access, BeachballOptions, Command};
use crate::change_file::ChangeType;
use std::path::Path;

/// Default target branch.
pub const DEFAULT_BRANCH: &str = "origin/master";
/// Default npm registry.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";
/// Default npm dist-tag.
pub const DEFAULT_TAG: &str = "latest";
/// Default hint shown when change files are missing.
pub const DEFAULT_CHANGEHINT: &str = "Run \"beachball change\" to create a change file";

impl BeachballOptions {
    /// The hard-coded defaults, rooted at `path`.
    #[must_use]
    pub fn defaults(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            command: Command::Change,
            branch: DEFAULT_BRANCH.to_string(),
            registry: DEFAULT_REGISTRY.to_string(),
            tag: DEFAULT_TAG.to_string(),
            token: String::new(),
            message: String::new(),
            access: Access::Restricted,
            package: None,
            change_type: None,
            dependent_change_type: ChangeType::Patch,
            disallowed_change_types: None,
            changehint: DEFAULT_CHANGEHINT.to_string(),
            prerelease_prefix: None,
            fetch: true,
            push: true,
            publish: true,
            bump_deps: true,
            yes: false,
            commit: true,
            git_tags: true,
            generate_changelog: true,
            keep_change_files: false,
        }
    }
}

impl Default for BeachballOptions {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| ".".into());
        Self::defaults(&cwd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = BeachballOptions::defaults(Path::new("/repo"));
        assert_eq!(opts.branch, "origin/master");
        assert_eq!(opts.registry, "https://registry.npmjs.org/");
        assert_eq!(opts.access, Access::Restricted);
        assert_eq!(opts.command, Command::Change);
        assert_eq!(opts.dependent_change_type, ChangeType::Patch);
        assert!(opts.fetch && opts.push && opts.publish && opts.bump_deps);
        assert!(!opts.yes);
        assert!(!opts.keep_change_files);
    }
}
