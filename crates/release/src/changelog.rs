//! Changelog generation.
//!
//! Every bumped package gets an entry prepended to `CHANGELOG.json` and
//! `CHANGELOG.md` in its directory. Entries hold the comments of the change
//! files that were consumed plus a `Bump <dep> to v<version>` line for each
//! dependency whose bump caused this one.

use crate::bump::BumpInfo;
use crate::change_file::{ChangeFile, ChangeType};
use crate::error::{Error, Result};
use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Markdown changelog file name.
pub const CHANGELOG_MD: &str = "CHANGELOG.md";
/// JSON changelog file name.
pub const CHANGELOG_JSON: &str = "CHANGELOG.json";

const START_MARKER: &str = "<!-- Start content -->";
const DEPENDENT_AUTHOR: &str = "beachball";

/// One changelog line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogComment {
    /// The comment text.
    pub comment: String,
    /// Author email.
    pub author: String,
    /// Package the comment belongs to.
    pub package: String,
    /// Commit that introduced the change, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// A release of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// Version being released.
    pub version: Version,
    /// Release date.
    pub date: DateTime<Utc>,
    /// Git tag of the release.
    pub tag: String,
    /// Comments grouped by change type.
    pub comments: BTreeMap<ChangeType, Vec<ChangelogComment>>,
}

impl ChangelogEntry {
    /// Format this entry as Markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "## {}\n", self.version);
        let _ = writeln!(output, "{}\n", format_date(&self.date));

        // highest severity first; prerelease and none share a section
        let sections = [
            ("Major changes", &[ChangeType::Major][..]),
            ("Minor changes", &[ChangeType::Minor][..]),
            ("Patches", &[ChangeType::Patch][..]),
            ("Changes", &[ChangeType::Prerelease, ChangeType::None][..]),
        ];

        for (title, types) in sections {
            let comments: Vec<&ChangelogComment> = types
                .iter()
                .filter_map(|t| self.comments.get(t))
                .flatten()
                .collect();
            if comments.is_empty() {
                continue;
            }
            let _ = writeln!(output, "### {title}\n");
            for c in comments {
                let _ = writeln!(output, "- {} ({})", c.comment, c.author);
            }
            output.push('\n');
        }

        output
    }

    fn to_json(&self) -> JsonEntry {
        JsonEntry {
            date: format_date(&self.date),
            version: self.version.to_string(),
            tag: self.tag.clone(),
            comments: self
                .comments
                .iter()
                .map(|(t, c)| (t.as_str().to_string(), c.clone()))
                .collect(),
        }
    }
}

/// `CHANGELOG.json` contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogJson {
    /// Package name.
    pub name: String,
    /// Releases, newest first.
    pub entries: Vec<JsonEntry>,
}

/// One release in `CHANGELOG.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonEntry {
    /// Release date in RFC 7231 form.
    pub date: String,
    /// Released version.
    pub version: String,
    /// Git tag of the release.
    pub tag: String,
    /// Comments keyed by change type name.
    pub comments: BTreeMap<String, Vec<ChangelogComment>>,
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build one entry per bumped package.
#[must_use]
pub fn build_entries(
    info: &BumpInfo,
    changes: &[ChangeFile],
    date: DateTime<Utc>,
) -> BTreeMap<String, ChangelogEntry> {
    let mut entries = BTreeMap::new();

    for (name, version) in &info.new_versions {
        let mut comments: BTreeMap<ChangeType, Vec<ChangelogComment>> = BTreeMap::new();

        for change in changes.iter().filter(|c| &c.info.package_name == name) {
            comments
                .entry(change.info.change_type)
                .or_default()
                .push(ChangelogComment {
                    comment: change.info.comment.clone(),
                    author: change.info.email.clone(),
                    package: name.clone(),
                    commit: change.info.commit.clone(),
                });
        }

        for update in info.dependent_updates.get(name).into_iter().flatten() {
            let Some(dep_version) = info.new_versions.get(&update.dependency) else {
                continue;
            };
            comments
                .entry(update.change_type)
                .or_default()
                .push(ChangelogComment {
                    comment: format!("Bump {} to v{dep_version}", update.dependency),
                    author: DEPENDENT_AUTHOR.to_string(),
                    package: name.clone(),
                    commit: None,
                });
        }

        entries.insert(
            name.clone(),
            ChangelogEntry {
                version: version.clone(),
                date,
                tag: crate::git::release_tag(name, &version.to_string()),
                comments,
            },
        );
    }

    entries
}

/// Prepend `entry` to both changelog files in `package_dir`.
///
/// # Errors
///
/// Returns an error if a changelog cannot be read or written.
pub fn write_changelogs(package_dir: &Path, package: &str, entry: &ChangelogEntry) -> Result<()> {
    write_json(&package_dir.join(CHANGELOG_JSON), package, entry)?;
    write_markdown(&package_dir.join(CHANGELOG_MD), package, entry)?;
    tracing::debug!(package = %package, version = %entry.version, "Updated changelogs");
    Ok(())
}

fn write_json(path: &Path, package: &str, entry: &ChangelogEntry) -> Result<()> {
    let mut log = if path.exists() {
        let content = read(path)?;
        match serde_json::from_str::<ChangelogJson>(&content) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Replacing unreadable CHANGELOG.json");
                ChangelogJson::default()
            }
        }
    } else {
        ChangelogJson::default()
    };

    log.name = package.to_string();
    log.entries.insert(0, entry.to_json());

    let mut content = serde_json::to_string_pretty(&log)?;
    content.push('\n');
    write(path, &content)
}

fn write_markdown(path: &Path, package: &str, entry: &ChangelogEntry) -> Result<()> {
    let new_entry = entry.to_markdown();

    let content = if path.exists() {
        let existing = read(path)?;
        if let Some(idx) = existing.find(START_MARKER) {
            let split = idx + START_MARKER.len();
            format!(
                "{}\n\n{}{}",
                &existing[..split],
                new_entry,
                existing[split..].trim_start_matches('\n')
            )
        } else {
            format!("{}{}{}", header(package), new_entry, existing)
        }
    } else {
        format!("{}{}", header(package), new_entry)
    };

    write(path, &content)
}

fn header(package: &str) -> String {
    format!(
        "# Change Log - {package}\n\n<!-- This log was last generated by beachball and should not be manually modified. -->\n\n{START_MARKER}\n\n"
    )
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::change_file_io_with_source(
            format!("Failed to read changelog: {}", path.display()),
            Some(path.to_path_buf()),
            e,
        )
    })
}

fn write(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| {
        Error::change_file_io_with_source(
            format!("Failed to write changelog: {}", path.display()),
            Some(path.to_path_buf()),
            e,
        )
    })
}
