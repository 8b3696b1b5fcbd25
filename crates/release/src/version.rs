//! Semantic version parsing, ordering and bumping.

use crate::change_file::ChangeType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A semantic version with `SemVer` 2.0.0 precedence rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major version number.
    pub major: u64,
    /// Minor version number.
    pub minor: u64,
    /// Patch version number.
    pub patch: u64,
    /// Pre-release identifier (e.g., "alpha", "beta.1").
    pub prerelease: Option<String>,
    /// Build metadata (e.g., "20230101", "commit.abc123").
    pub build: Option<String>,
}

impl Version {
    /// Create a new version.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Create a version with a pre-release identifier.
    #[must_use]
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// Create a version with build metadata.
    #[must_use]
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    /// Check if this is a pre-release version.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Apply a change type to this version.
    ///
    /// Release bumps drop any prerelease and build metadata. A prerelease
    /// version is first promoted to its release when that release already
    /// satisfies the bump (`1.0.0-beta.1` + patch = `1.0.0`).
    ///
    /// `prerelease` increments the trailing numeric identifier
    /// (`1.0.1-beta.0` -> `1.0.1-beta.1`) or appends `.0`. On a release
    /// version it bumps the patch and starts `<prefix>.0` (or `0` without a
    /// prefix). A prefix different from the current one restarts at `<prefix>.0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionOverflow`] when a component would exceed `u64::MAX`.
    pub fn bump(&self, change_type: ChangeType, prerelease_prefix: Option<&str>) -> Result<Self> {
        let pre = self.is_prerelease();
        let next = |n: u64| {
            n.checked_add(1).ok_or_else(|| Error::VersionOverflow {
                version: self.to_string(),
                change_type,
            })
        };
        Ok(match change_type {
            ChangeType::None => self.clone(),
            ChangeType::Major => {
                if pre && self.minor == 0 && self.patch == 0 {
                    Self::new(self.major, 0, 0)
                } else {
                    Self::new(next(self.major)?, 0, 0)
                }
            }
            ChangeType::Minor => {
                if pre && self.patch == 0 {
                    Self::new(self.major, self.minor, 0)
                } else {
                    Self::new(self.major, next(self.minor)?, 0)
                }
            }
            ChangeType::Patch => {
                if pre {
                    Self::new(self.major, self.minor, self.patch)
                } else {
                    Self::new(self.major, self.minor, next(self.patch)?)
                }
            }
            ChangeType::Prerelease => {
                let Some(current) = &self.prerelease else {
                    let start = prerelease_prefix.map_or_else(|| "0".to_string(), |p| format!("{p}.0"));
                    return Ok(Self::new(self.major, self.minor, next(self.patch)?).with_prerelease(start));
                };
                Self::new(self.major, self.minor, self.patch)
                    .with_prerelease(next_prerelease(current, prerelease_prefix))
            }
        })
    }

    /// Convert to a [`semver::Version`] for range matching.
    ///
    /// # Errors
    ///
    /// Returns an error if the prerelease or build identifiers are not valid semver.
    pub fn to_semver(&self) -> Result<semver::Version> {
        semver::Version::parse(&self.to_string()).map_err(|_| Error::invalid_version(self.to_string()))
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);

        let (version_pre, build) = match s.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (s, None),
        };

        let (version, prerelease) = match version_pre.split_once('-') {
            Some((v, p)) => (v, Some(p.to_string())),
            None => (version_pre, None),
        };

        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() != 3 {
            return Err(Error::invalid_version(s));
        }

        let number = |part: &str, label: &str| {
            part.parse::<u64>()
                .map_err(|_| Error::invalid_version(format!("Invalid {label} version: {part}")))
        };

        Ok(Self {
            major: number(parts[0], "major")?,
            minor: number(parts[1], "minor")?,
            patch: number(parts[2], "patch")?,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            })
            // build metadata only breaks ties, keeping `cmp` consistent with `==`
            .then_with(|| self.build.cmp(&other.build))
    }
}

/// The prerelease identifier after `current`. A `prefix` that `current` does
/// not start with restarts at `<prefix>.0`.
fn next_prerelease(current: &str, prefix: Option<&str>) -> String {
    if let Some(p) = prefix
        && current != p
        && !current.starts_with(&format!("{p}."))
    {
        return format!("{p}.0");
    }

    let mut parts: Vec<String> = current.split('.').map(String::from).collect();
    let last = parts.last().and_then(|last| last.parse::<u64>().ok());
    match last.and_then(|n| n.checked_add(1)) {
        Some(n) => {
            let idx = parts.len() - 1;
            parts[idx] = n.to_string();
        }
        // non-numeric or saturated tail
        None => parts.push("0".to_string()),
    }
    parts.join(".")
}

/// Identifier-wise prerelease precedence: numeric identifiers compare
/// numerically and sort below alphanumeric ones; a shorter list of equal
/// identifiers sorts first.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(n), Ok(m)) => n.cmp(&m).then_with(|| x.cmp(y)),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
