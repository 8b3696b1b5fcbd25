//! Option records: the effective [`BeachballOptions`] and the partial
//! [`PartialOptions`] layers merged into it.

use crate::change_file::ChangeType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The command to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Create change files.
    #[default]
    Change,
    /// Verify every changed package has a change file.
    Check,
    /// Apply change files to versions and changelogs.
    Bump,
    /// Bump, publish to the registry and push to git.
    Publish,
}

impl Command {
    /// Lowercase command name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Check => "check",
            Self::Bump => "bump",
            Self::Publish => "publish",
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "change" => Ok(Self::Change),
            "check" => Ok(Self::Check),
            "bump" => Ok(Self::Bump),
            "publish" => Ok(Self::Publish),
            other => Err(Error::config(
                format!("Unknown command: {other}"),
                "Valid commands are change, check, bump and publish",
            )),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// npm publish access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Anyone can install the package.
    Public,
    /// Scoped packages are visible to the owning organization only.
    #[default]
    Restricted,
}

impl Access {
    /// Value passed to `npm publish --access`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Restricted => "restricted",
        }
    }
}

impl FromStr for Access {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(Self::Public),
            "restricted" => Ok(Self::Restricted),
            other => Err(Error::config(
                format!("Invalid access level: {other}"),
                "Use --access public or --access restricted",
            )),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved options for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeachballOptions {
    /// Repository directory.
    pub path: PathBuf,
    /// Command to run.
    pub command: Command,
    /// Target branch as `remote/branch`.
    pub branch: String,
    /// npm registry URL.
    pub registry: String,
    /// npm dist-tag.
    pub tag: String,
    /// npm auth token.
    pub token: String,
    /// Change file comment or commit message.
    pub message: String,
    /// npm publish access.
    pub access: Access,
    /// Restrict the command to these packages.
    pub package: Option<Vec<String>>,
    /// Change type for new change files.
    #[serde(rename = "type")]
    pub change_type: Option<ChangeType>,
    /// Change type applied to dependents of a changed package.
    pub dependent_change_type: ChangeType,
    /// Change types a package refuses.
    pub disallowed_change_types: Option<Vec<ChangeType>>,
    /// Hint printed when change files are missing.
    pub changehint: String,
    /// Prefix for prerelease identifiers (`beta` gives `1.0.1-beta.0`).
    pub prerelease_prefix: Option<String>,
    /// Fetch the target branch before comparing.
    pub fetch: bool,
    /// Push the release commit and tags.
    pub push: bool,
    /// Publish packages to the registry.
    pub publish: bool,
    /// Bump in-repo dependents of changed packages.
    pub bump_deps: bool,
    /// Skip confirmation.
    pub yes: bool,
    /// Commit change files and release changes.
    pub commit: bool,
    /// Create `<name>_v<version>` tags.
    pub git_tags: bool,
    /// Write CHANGELOG.md and CHANGELOG.json.
    pub generate_changelog: bool,
    /// Keep change files after bumping.
    pub keep_change_files: bool,
}

/// A partial options layer: repository config, package config or CLI.
///
/// Every field is optional. Fields that are `Some` replace the value below
/// them when merged; lists are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialOptions {
    /// See [`BeachballOptions::path`].
    pub path: Option<PathBuf>,
    /// See [`BeachballOptions::command`].
    pub command: Option<Command>,
    /// See [`BeachballOptions::branch`].
    pub branch: Option<String>,
    /// See [`BeachballOptions::registry`].
    pub registry: Option<String>,
    /// See [`BeachballOptions::tag`].
    pub tag: Option<String>,
    /// See [`BeachballOptions::token`].
    pub token: Option<String>,
    /// See [`BeachballOptions::message`].
    pub message: Option<String>,
    /// See [`BeachballOptions::access`].
    pub access: Option<Access>,
    /// See [`BeachballOptions::package`].
    pub package: Option<Vec<String>>,
    /// See [`BeachballOptions::change_type`].
    #[serde(rename = "type")]
    pub change_type: Option<ChangeType>,
    /// See [`BeachballOptions::dependent_change_type`].
    pub dependent_change_type: Option<ChangeType>,
    /// See [`BeachballOptions::disallowed_change_types`].
    pub disallowed_change_types: Option<Vec<ChangeType>>,
    /// See [`BeachballOptions::changehint`].
    pub changehint: Option<String>,
    /// See [`BeachballOptions::prerelease_prefix`].
    pub prerelease_prefix: Option<String>,
    /// See [`BeachballOptions::fetch`].
    pub fetch: Option<bool>,
    /// See [`BeachballOptions::push`].
    pub push: Option<bool>,
    /// See [`BeachballOptions::publish`].
    pub publish: Option<bool>,
    /// See [`BeachballOptions::bump_deps`].
    pub bump_deps: Option<bool>,
    /// See [`BeachballOptions::yes`].
    pub yes: Option<bool>,
    /// See [`BeachballOptions::commit`].
    pub commit: Option<bool>,
    /// See [`BeachballOptions::git_tags`].
    pub git_tags: Option<bool>,
    /// See [`BeachballOptions::generate_changelog`].
    pub generate_changelog: Option<bool>,
    /// See [`BeachballOptions::keep_change_files`].
    pub keep_change_files: Option<bool>,
}

/// Repository-level configuration layer.
pub type RepoOptions = PartialOptions;
/// Package-level configuration layer.
pub type PackageOptions = PartialOptions;
/// Command-line layer.
pub type CliOptions = PartialOptions;

macro_rules! overlay {
    ($target:expr, $layer:expr; $($field:ident),* $(,)?) => {
        $(
            if let Some(value) = &$layer.$field {
                $target.$field = value.clone();
            }
        )*
    };
}

macro_rules! overlay_optional {
    ($target:expr, $layer:expr; $($field:ident),* $(,)?) => {
        $(
            if $layer.$field.is_some() {
                $target.$field = $layer.$field.clone();
            }
        )*
    };
}

impl BeachballOptions {
    /// Shallow-merge `layer` over these options.
    pub fn apply(&mut self, layer: &PartialOptions) {
        overlay!(self, layer;
            path, command, branch, registry, tag, token, message, access,
            dependent_change_type, changehint, fetch, push, publish, bump_deps,
            yes, commit, git_tags, generate_changelog, keep_change_files,
        );
        overlay_optional!(self, layer;
            package, change_type, disallowed_change_types, prerelease_prefix,
        );
    }

    /// Merge layers in increasing precedence over `self`.
    #[must_use]
    pub fn merged<'a>(mut self, layers: impl IntoIterator<Item = &'a PartialOptions>) -> Self {
        for layer in layers {
            self.apply(layer);
        }
        self
    }

    /// Remote name and branch name of [`Self::branch`].
    #[must_use]
    pub fn remote_and_branch(&self) -> (String, String) {
        crate::git::parse_remote_branch(&self.branch)
    }
}
