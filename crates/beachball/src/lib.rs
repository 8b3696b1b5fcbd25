//! beachball: version bumps, changelogs and npm publishing for JavaScript
//! monorepos.
//!
//! The binary in `main.rs` is a thin shell over this library:
//!
//! - [`cli`] - argument surface, error type and exit codes
//! - [`options`] - the memoized command-line options layer
//! - [`commands`] - `change`, `check`, `bump` and `publish`
//! - [`tracing`] - subscriber setup
//!
//! Release logic lives in `beachball-release`, package discovery in
//! `beachball-workspaces` and process wrappers in `beachball-npm`.

/// CLI argument parsing and exit codes.
pub mod cli;
/// Command implementations.
pub mod commands;
/// Memoized command-line options.
pub mod options;
/// Tracing configuration.
pub mod tracing;

pub use cli::{CliError, EXIT_CONFIG, EXIT_FAILED, EXIT_OK};
pub use options::CliOptionsCache;
