use crate::tracing::LogLevel;
use beachball_release::{Access, ChangeType, CliOptions, Command};
use clap::{ArgAction, Parser};
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Command failure, including a failed `check`
pub const EXIT_FAILED: i32 = 1;
/// Configuration or usage error exit code
pub const EXIT_CONFIG: i32 = 2;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Configuration or usage error (exit code 2)
    #[error("{message}")]
    #[diagnostic(code(beachball::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The command ran and failed (exit code 1)
    #[error("{message}")]
    #[diagnostic(code(beachball::cli::failed))]
    Failed {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new command failure
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new command failure with help text
    #[must_use]
    pub fn failed_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

fn help_of(diagnostic: &dyn Diagnostic) -> Option<String> {
    diagnostic.help().map(|h| h.to_string())
}

/// Configuration mistakes map to exit code 2, everything else to 1.
impl From<beachball_release::Error> for CliError {
    fn from(err: beachball_release::Error) -> Self {
        let help = help_of(&err);
        let message = err.to_string();
        if err.is_config() {
            Self::Config { message, help }
        } else {
            Self::Failed { message, help }
        }
    }
}

impl From<beachball_workspaces::Error> for CliError {
    fn from(err: beachball_workspaces::Error) -> Self {
        let help = help_of(&err);
        let message = err.to_string();
        match err {
            beachball_workspaces::Error::WorkspaceNotFound { .. }
            | beachball_workspaces::Error::InvalidWorkspaceConfig { .. }
            | beachball_workspaces::Error::DuplicatePackage { .. } => {
                Self::Config { message, help }
            }
            _ => Self::Failed { message, help },
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CONFIG,
        CliError::Failed { .. } => EXIT_FAILED,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let (code, help) = match err {
            CliError::Config { help, .. } => ("config", help),
            CliError::Failed { help, .. } => ("failed", help),
        };
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": code,
            "message": err.to_string(),
            "help": help,
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

fn parse_command(s: &str) -> Result<Command, String> {
    s.parse().map_err(|e: beachball_release::Error| e.to_string())
}

fn parse_change_type(s: &str) -> Result<ChangeType, String> {
    s.parse().map_err(|e: beachball_release::Error| e.to_string())
}

fn parse_access(s: &str) -> Result<Access, String> {
    s.parse().map_err(|e: beachball_release::Error| e.to_string())
}

/// Collapse a `--flag` / `--no-flag` pair into a tri-state.
const fn toggle(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}

/// beachball: version bumps, changelogs and npm publishing for monorepos.
#[derive(Parser, Debug)]
#[command(name = "beachball")]
#[command(about = "Version bumps, changelogs and npm publishing for JavaScript monorepos")]
#[command(version, disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Command to run: change, check, bump or publish.
    #[arg(value_parser = parse_command, value_name = "COMMAND")]
    pub command: Option<Command>,

    /// Print help.
    #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Emit JSON envelope on stdout.
    #[arg(long, global = true, help = "Emit JSON envelope on stdout")]
    pub json: bool,

    /// Repository root; defaults to the current directory.
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Target branch as remote/branch.
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// npm dist-tag.
    #[arg(short = 't', long)]
    pub tag: Option<String>,

    /// npm registry URL.
    #[arg(short = 'r', long)]
    pub registry: Option<String>,

    /// Change file comment or commit message.
    #[arg(short = 'm', long)]
    pub message: Option<String>,

    /// npm auth token.
    #[arg(short = 'n', long)]
    pub token: Option<String>,

    /// Skip confirmation.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Restrict to these packages (repeatable).
    #[arg(short = 'p', long, action = ArgAction::Append)]
    pub package: Vec<String>,

    /// npm publish access: public or restricted.
    #[arg(long, value_parser = parse_access)]
    pub access: Option<Access>,

    /// Hint printed when change files are missing.
    #[arg(long)]
    pub changehint: Option<String>,

    /// Change type for new change files.
    #[arg(long = "type", value_parser = parse_change_type)]
    pub change_type: Option<ChangeType>,

    /// Change type applied to dependents.
    #[arg(long, value_parser = parse_change_type)]
    pub dependent_change_type: Option<ChangeType>,

    /// Prerelease identifier prefix, as in `beta` for `1.0.1-beta.0`.
    #[arg(long)]
    pub prerelease_prefix: Option<String>,

    /// Fetch the target branch before comparing.
    #[arg(long, overrides_with = "no_fetch")]
    pub fetch: bool,
    /// Do not fetch the target branch.
    #[arg(long = "no-fetch", overrides_with = "fetch")]
    pub no_fetch: bool,

    /// Push the release commit and tags.
    #[arg(long, overrides_with = "no_push")]
    pub push: bool,
    /// Do not push.
    #[arg(long = "no-push", overrides_with = "push")]
    pub no_push: bool,

    /// Publish packages to the registry.
    #[arg(long, overrides_with = "no_publish")]
    pub publish: bool,
    /// Do not publish to the registry.
    #[arg(long = "no-publish", overrides_with = "publish")]
    pub no_publish: bool,

    /// Bump in-repo dependents of changed packages.
    #[arg(long = "bumpDeps", alias = "bump-deps", overrides_with = "no_bump_deps")]
    pub bump_deps: bool,
    /// Do not bump dependents.
    #[arg(long = "no-bumpDeps", alias = "no-bump-deps", overrides_with = "bump_deps")]
    pub no_bump_deps: bool,

    /// Keep change files after bumping.
    #[arg(long)]
    pub keep_change_files: bool,

    /// Do not commit change files or release changes.
    #[arg(long)]
    pub no_commit: bool,

    /// Do not create release tags.
    #[arg(long)]
    pub no_git_tags: bool,

    /// Do not write CHANGELOG.md and CHANGELOG.json.
    #[arg(long)]
    pub no_changelog: bool,
}

impl Cli {
    /// The command-line options layer. Flags that were not given stay `None`.
    #[must_use]
    pub fn to_cli_options(&self) -> CliOptions {
        CliOptions {
            path: self.path.clone(),
            command: self.command,
            branch: self.branch.clone(),
            registry: self.registry.clone(),
            tag: self.tag.clone(),
            token: self.token.clone(),
            message: self.message.clone(),
            access: self.access,
            package: Some(self.package.clone()).filter(|p| !p.is_empty()),
            change_type: self.change_type,
            dependent_change_type: self.dependent_change_type,
            disallowed_change_types: None,
            changehint: self.changehint.clone(),
            prerelease_prefix: self.prerelease_prefix.clone(),
            fetch: toggle(self.fetch, self.no_fetch),
            push: toggle(self.push, self.no_push),
            publish: toggle(self.publish, self.no_publish),
            bump_deps: toggle(self.bump_deps, self.no_bump_deps),
            yes: self.yes.then_some(true),
            commit: self.no_commit.then_some(false),
            git_tags: self.no_git_tags.then_some(false),
            generate_changelog: self.no_changelog.then_some(false),
            keep_change_files: self.keep_change_files.then_some(true),
        }
    }
}

/// Parse command line arguments into a CLI structure.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
