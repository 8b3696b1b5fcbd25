//! Monorepo package discovery for beachball.
//!
//! Finds every package in a JavaScript monorepo and reads the metadata release
//! management needs from each `package.json`: name, version, `private`, the
//! dependency maps and the package-level `beachball` configuration object.
//!
//! # Discovery
//!
//! - [`PackageJsonDiscovery`] - npm and Yarn workspaces (`package.json` `workspaces`)
//! - [`PnpmWorkspaceDiscovery`] - pnpm workspaces (`pnpm-workspace.yaml`)
//! - [`discover_workspace`] - picks the right source for a repository root
//!
//! Member directories with a missing or malformed `package.json`, or without a
//! `name`, are skipped so a single broken package does not stop discovery.
//!
//! ```rust,ignore
//! use beachball_workspaces::discover_workspace;
//! use std::path::Path;
//!
//! let workspace = discover_workspace(Path::new("."))?;
//! for pkg in &workspace.packages {
//!     println!("{} {}", pkg.name, pkg.version);
//! }
//! ```

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    PackageJsonDiscovery, PnpmWorkspaceDiscovery, WorkspaceDiscovery, detect_manager,
    discover_workspace, read_package,
};
pub use error::{Error, Result};
pub use types::{PackageInfo, PackageManager, Workspace};
