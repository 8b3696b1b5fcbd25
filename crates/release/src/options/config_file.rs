//! Configuration file discovery.
//!
//! Starting at a directory and walking up to the filesystem root, the first
//! directory holding one of these wins:
//!
//! 1. `.beachballrc` (JSON or YAML)
//! 2. `.beachballrc.json`
//! 3. `beachball.config.json`
//! 4. the `beachball` key of `package.json`
//!
//! A file that cannot be read or parsed is logged at `warn` and treated as if
//! it did not exist, so the search continues.

use super::types::PartialOptions;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Dedicated configuration file names, in search order.
pub const CONFIG_FILE_NAMES: [&str; 3] = [".beachballrc", ".beachballrc.json", "beachball.config.json"];

/// A configuration layer and the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// The file the options were read from.
    pub path: PathBuf,
    /// The parsed options.
    pub options: PartialOptions,
}

/// Search upward from `start` for the nearest configuration.
#[must_use]
pub fn find_config(start: &Path) -> Option<ConfigSource> {
    for dir in start.ancestors() {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.is_file()
                && let Some(options) = load_config_file(&path)
            {
                return Some(ConfigSource { path, options });
            }
        }

        let manifest = dir.join("package.json");
        if manifest.is_file()
            && let Some(options) = load_package_json_key(&manifest)
        {
            return Some(ConfigSource {
                path: manifest,
                options,
            });
        }
    }
    None
}

/// Options from the nearest repository configuration above `cwd`, or an
/// empty layer.
#[must_use]
pub fn repo_options(cwd: &Path) -> PartialOptions {
    find_config(cwd).map_or_else(PartialOptions::default, |source| {
        tracing::debug!(path = %source.path.display(), "Loaded repository options");
        source.options
    })
}

/// Options from the nearest configuration above `package_path`, or an empty
/// layer.
#[must_use]
pub fn package_options(package_path: &Path) -> PartialOptions {
    find_config(package_path).map_or_else(PartialOptions::default, |source| {
        tracing::debug!(path = %source.path.display(), "Loaded package options");
        source.options
    })
}

fn load_config_file(path: &Path) -> Option<PartialOptions> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read config file, ignoring");
            return None;
        }
    };

    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        // JSON is accepted here too since it is valid YAML
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    };

    match parsed {
        Ok(options) => Some(options),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot parse config file, ignoring");
            None
        }
    }
}

fn load_package_json_key(path: &Path) -> Option<PartialOptions> {
    let content = fs::read_to_string(path).ok()?;
    let manifest: Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot parse package.json, ignoring");
            return None;
        }
    };

    let section = manifest.get("beachball")?.clone();
    match serde_json::from_value(section) {
        Ok(options) => Some(options),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Invalid beachball section in package.json, ignoring"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_walks_upward() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("packages/a/src");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            temp.path().join(".beachballrc.json"),
            r#"{"branch": "origin/main"}"#,
        )
        .unwrap();

        let source = find_config(&nested).unwrap();
        assert_eq!(source.path, temp.path().join(".beachballrc.json"));
        assert_eq!(source.options.branch.as_deref(), Some("origin/main"));
    }

    #[test]
    fn test_rc_file_accepts_yaml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".beachballrc"), "tag: next\npush: false\n").unwrap();

        let options = repo_options(temp.path());
        assert_eq!(options.tag.as_deref(), Some("next"));
        assert_eq!(options.push, Some(false));
    }

    #[test]
    fn test_dedicated_file_wins_over_package_json() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "root", "beachball": {"tag": "from-package"}}"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("beachball.config.json"),
            r#"{"tag": "from-config"}"#,
        )
        .unwrap();

        assert_eq!(repo_options(temp.path()).tag.as_deref(), Some("from-config"));
    }

    #[test]
    fn test_package_json_key() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "pkg", "beachball": {"disallowedChangeTypes": ["major"]}}"#,
        )
        .unwrap();

        let options = package_options(temp.path());
        assert_eq!(
            options.disallowed_change_types,
            Some(vec![crate::change_file::ChangeType::Major])
        );
    }

    #[test]
    fn test_unparsable_config_is_skipped() {
        let temp = TempDir::new().unwrap();
        let child = temp.path().join("child");
        fs::create_dir_all(&child).unwrap();
        fs::write(temp.path().join(".beachballrc.json"), r#"{"tag": "outer"}"#).unwrap();
        fs::write(child.join(".beachballrc.json"), "{ broken").unwrap();

        assert_eq!(repo_options(&child).tag.as_deref(), Some("outer"));
    }

    #[test]
    fn test_package_json_without_key_is_not_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"name": "pkg"}"#).unwrap();

        assert!(find_config(temp.path()).is_none());
    }
}
