//! Release management for JavaScript monorepos.
//!
//! This crate holds everything beachball does between "a package changed" and
//! "a new version is on the registry", minus the process wrappers:
//!
//! - **Change files**: one JSON file per intended bump in `change/`
//! - **Bump calculation**: highest change type per package, dependent
//!   propagation, `disallowedChangeTypes` enforcement
//! - **Changelogs**: `CHANGELOG.md` and `CHANGELOG.json` per package
//! - **Publish ordering**: dependencies first
//! - **Options**: defaults, `.beachballrc*` / `package.json` configuration layers
//!
//! # Architecture
//!
//! - [`change_file`] - change file storage and change types
//! - [`version`] - semantic versions and bumping
//! - [`bump`] - bump calculation and package.json updates
//! - [`changelog`] - changelog generation
//! - [`publish`] - topological publish ordering
//! - [`manifest`] - package.json editing
//! - [`git`] - git plumbing
//! - [`options`] - option records and configuration layers
//!
//! # Example
//!
//! ```rust,ignore
//! use beachball_release::{ChangeFileManager, ChangeInfo, ChangeType};
//! use std::path::Path;
//!
//! let manager = ChangeFileManager::new(Path::new("."));
//! manager.write(&ChangeInfo::new(
//!     "pkg-a",
//!     ChangeType::Minor,
//!     "Add a feature",
//!     "dev@example.com",
//!     ChangeType::Patch,
//! ))?;
//! ```

pub mod bump;
pub mod change_file;
pub mod changelog;
pub mod error;
pub mod git;
pub mod manifest;
pub mod options;
pub mod publish;
pub mod version;

pub use bump::{BumpCalculator, BumpInfo, BumpOptions, DependentUpdate, apply_bumps};
pub use change_file::{ChangeFile, ChangeFileManager, ChangeInfo, ChangeType, package_change_types};
pub use changelog::{ChangelogEntry, build_entries, write_changelogs};
pub use error::{Error, Result};
pub use git::{Git, parse_remote_branch, release_tag};
pub use manifest::PackageJson;
pub use options::{Access, BeachballOptions, CliOptions, Command, PartialOptions};
pub use publish::{PublishPackage, PublishPlan};
pub use version::Version;
