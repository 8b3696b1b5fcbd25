//! package.json reading and writing.
//!
//! Manifests are edited as [`serde_json::Value`] with key order preserved, so
//! only the `version` field and in-repo dependency ranges change on disk.

use crate::error::{Error, Result};
use crate::version::Version;
use semver::VersionReq;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Dependency sections rewritten when an in-repo dependency is bumped.
pub const DEPENDENCY_KEYS: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// An editable package.json.
#[derive(Debug, Clone)]
pub struct PackageJson {
    path: PathBuf,
    doc: Value,
}

impl PackageJson {
    /// Read a package.json.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::manifest(
                format!("Failed to read package.json: {e}"),
                Some(path.to_path_buf()),
            )
        })?;
        let doc: Value = serde_json::from_str(&content).map_err(|e| {
            Error::manifest(
                format!("Failed to parse package.json: {e}"),
                Some(path.to_path_buf()),
            )
        })?;
        if !doc.is_object() {
            return Err(Error::manifest(
                "package.json must contain a JSON object",
                Some(path.to_path_buf()),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// The `version` field, if present.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.doc.get("version").and_then(Value::as_str)
    }

    /// Set the `version` field.
    pub fn set_version(&mut self, version: &Version) {
        if let Some(obj) = self.doc.as_object_mut() {
            obj.insert("version".to_string(), Value::String(version.to_string()));
        }
    }

    /// Point every dependency section's entry for `dependency` at `version`,
    /// keeping the range style. Returns whether anything changed.
    pub fn update_dependency(&mut self, dependency: &str, version: &Version) -> bool {
        let mut changed = false;
        for key in DEPENDENCY_KEYS {
            let Some(range) = self
                .doc
                .get_mut(key)
                .and_then(|deps| deps.get_mut(dependency))
            else {
                continue;
            };
            if let Some(current) = range.as_str()
                && let Some(updated) = updated_range(current, version)
            {
                *range = Value::String(updated);
                changed = true;
            }
        }
        changed
    }

    /// Write the manifest back with two-space indentation and a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&self.doc)?;
        content.push('\n');
        fs::write(&self.path, content).map_err(|e| {
            Error::manifest(
                format!("Failed to write package.json: {e}"),
                Some(self.path.clone()),
            )
        })
    }

    /// Path of the manifest.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The range that should replace `range` once a dependency moves to `version`,
/// or `None` to leave it alone.
///
/// Exact versions always move. `^` and `~` ranges move only when they no
/// longer admit the new version. `workspace:` ranges are handled on their
/// inner range; `workspace:*`, `workspace:^` and other protocols or tags are
/// left alone.
#[must_use]
pub fn updated_range(range: &str, version: &Version) -> Option<String> {
    if let Some(inner) = range.strip_prefix("workspace:") {
        if matches!(inner, "*" | "^" | "~") {
            return None;
        }
        return updated_range(inner, version).map(|r| format!("workspace:{r}"));
    }

    let (prefix, rest) = if let Some(rest) = range.strip_prefix('^') {
        ("^", rest)
    } else if let Some(rest) = range.strip_prefix('~') {
        ("~", rest)
    } else {
        ("", range)
    };

    // only plain versions are rewritten
    rest.parse::<Version>().ok()?;

    let new_range = format!("{prefix}{version}");
    if new_range == range {
        return None;
    }
    if prefix.is_empty() {
        return Some(new_range);
    }

    let still_matches = VersionReq::parse(range)
        .ok()
        .zip(version.to_semver().ok())
        .is_some_and(|(req, v)| req.matches(&v));
    if still_matches { None } else { Some(new_range) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_updated_range_exact() {
        assert_eq!(updated_range("1.0.0", &v("1.0.1")), Some("1.0.1".to_string()));
        assert_eq!(updated_range("1.0.1", &v("1.0.1")), None);
    }

    #[test]
    fn test_updated_range_caret_and_tilde() {
        assert_eq!(updated_range("^1.0.0", &v("1.1.0")), None);
        assert_eq!(updated_range("^1.0.0", &v("2.0.0")), Some("^2.0.0".to_string()));
        assert_eq!(updated_range("~1.0.0", &v("1.0.5")), None);
        assert_eq!(updated_range("~1.0.0", &v("1.1.0")), Some("~1.1.0".to_string()));
    }

    #[test]
    fn test_updated_range_workspace_protocol() {
        assert_eq!(updated_range("workspace:*", &v("2.0.0")), None);
        assert_eq!(updated_range("workspace:^", &v("2.0.0")), None);
        assert_eq!(
            updated_range("workspace:^1.0.0", &v("2.0.0")),
            Some("workspace:^2.0.0".to_string())
        );
    }

    #[test]
    fn test_updated_range_leaves_other_forms() {
        assert_eq!(updated_range("*", &v("2.0.0")), None);
        assert_eq!(updated_range(">=1.0.0 <2", &v("2.0.0")), None);
        assert_eq!(updated_range("file:../a", &v("2.0.0")), None);
        assert_eq!(updated_range("latest", &v("2.0.0")), None);
    }

    #[test]
    fn test_package_json_edit_preserves_key_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        fs::write(
            &path,
            r#"{
  "name": "b",
  "version": "1.0.0",
  "main": "index.js",
  "dependencies": {
    "a": "1.0.0",
    "lodash": "^4.0.0"
  }
}
"#,
        )
        .unwrap();

        let mut manifest = PackageJson::read(&path).unwrap();
        manifest.set_version(&v("1.0.1"));
        assert!(manifest.update_dependency("a", &v("1.1.0")));
        assert!(!manifest.update_dependency("missing", &v("1.1.0")));
        manifest.write().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#""version": "1.0.1""#));
        assert!(content.contains(r#""a": "1.1.0""#));
        assert!(content.find("\"name\"").unwrap() < content.find("\"main\"").unwrap());
        assert!(content.ends_with("}\n"));
    }

    #[test]
    fn test_read_rejects_non_object() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        fs::write(&path, "[]").unwrap();
        assert!(PackageJson::read(&path).is_err());
    }
}
