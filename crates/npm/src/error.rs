//! Error types for the test registry launcher.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while launching or querying the test registry.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// `url()` was called before a successful `start()`.
    #[error("Registry has not been started")]
    #[diagnostic(
        code(beachball::npm::not_started),
        help("Call start() and wait for it to succeed before asking for the URL")
    )]
    NotStarted,

    /// No port at or above the candidate could be bound.
    #[error("No free port found at or above {start}")]
    #[diagnostic(code(beachball::npm::no_free_port))]
    NoFreePort {
        /// The first port that was tried
        start: u16,
    },

    /// The launcher could not be spawned.
    #[error("Failed to spawn registry launcher '{program}': {source}")]
    #[diagnostic(
        code(beachball::npm::spawn),
        help("Check that the launcher program is installed and on PATH")
    )]
    Spawn {
        /// The launcher program
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The launcher reported that its port is taken.
    #[error("Port {port} is already in use")]
    #[diagnostic(code(beachball::npm::port_in_use))]
    PortInUse {
        /// The port that could not be bound
        port: u16,
    },

    /// The launcher wrote to stderr before becoming ready.
    #[error("Registry launcher failed: {message}")]
    #[diagnostic(code(beachball::npm::stderr))]
    Stderr {
        /// The stderr line
        message: String,
    },

    /// The launcher exited before becoming ready.
    #[error("Registry launcher exited before it was ready (exit code {code:?})")]
    #[diagnostic(code(beachball::npm::early_exit))]
    EarlyExit {
        /// Exit code, if the process exited normally
        code: Option<i32>,
    },

    /// Wrapped I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(beachball::npm::io))]
    Io(#[from] std::io::Error),
}
