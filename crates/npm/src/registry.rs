//! A local npm registry for tests.
//!
//! [`TestRegistry`] spawns a registry process (verdaccio by default) on the
//! first free port at or above a candidate and waits until it reports
//! `verdaccio running` on stdout. Output on stderr before that point fails the
//! start, except for `EADDRINUSE`, which moves on to the next port.

use crate::error::{Error, Result};
use std::net::TcpListener;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

/// Stdout marker that signals the registry is ready.
pub const READY_MARKER: &str = "verdaccio running";
/// Default first port to try.
pub const DEFAULT_PORT: u16 = 4873;
/// Placeholder substituted with the chosen port in launcher arguments.
pub const PORT_PLACEHOLDER: &str = "{port}";

/// Program and argument template used to launch the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLauncher {
    /// Program to run.
    pub program: String,
    /// Arguments; `{port}` is replaced with the chosen port.
    pub args: Vec<String>,
}

impl RegistryLauncher {
    /// A launcher running `program args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn args_for(&self, port: u16) -> Vec<String> {
        let port = port.to_string();
        self.args
            .iter()
            .map(|a| a.replace(PORT_PLACEHOLDER, &port))
            .collect()
    }
}

impl Default for RegistryLauncher {
    /// `npx verdaccio --listen {port}`
    fn default() -> Self {
        Self::new("npx", ["verdaccio", "--listen", PORT_PLACEHOLDER])
    }
}

/// Find the first port at or above `start` that can be bound on localhost.
///
/// # Errors
///
/// Returns [`Error::NoFreePort`] if every port up to 65535 is taken.
pub fn find_free_port(start: u16) -> Result<u16> {
    (start..=u16::MAX)
        .find(|port| TcpListener::bind(("127.0.0.1", *port)).is_ok())
        .ok_or(Error::NoFreePort { start })
}

/// A registry process for tests.
#[derive(Debug)]
pub struct TestRegistry {
    launcher: RegistryLauncher,
    start_port: u16,
    port: Option<u16>,
    child: Option<Child>,
}

impl TestRegistry {
    /// A registry that will be started with `launcher`.
    #[must_use]
    pub fn new(launcher: RegistryLauncher) -> Self {
        Self {
            launcher,
            start_port: DEFAULT_PORT,
            port: None,
            child: None,
        }
    }

    /// Use `port` as the first candidate instead of the default.
    #[must_use]
    pub fn with_start_port(mut self, port: u16) -> Self {
        self.start_port = port;
        self
    }

    /// Start the registry and wait until it is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the launcher cannot be spawned, writes to stderr,
    /// or exits before reporting readiness. Port conflicts are retried on the
    /// next port until no free port remains.
    pub async fn start(&mut self) -> Result<()> {
        let mut candidate = self.start_port;
        loop {
            let port = find_free_port(candidate)?;
            match self.launch(port).await {
                Ok(child) => {
                    tracing::info!(port, "Test registry running");
                    self.child = Some(child);
                    self.port = Some(port);
                    return Ok(());
                }
                Err(Error::PortInUse { port }) => {
                    tracing::debug!(port, "Registry port in use, trying next");
                    candidate = port.checked_add(1).ok_or(Error::NoFreePort { start: self.start_port })?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn launch(&self, port: u16) -> Result<Child> {
        let mut child = Command::new(&self.launcher.program)
            .args(self.launcher.args_for(port))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.launcher.program.clone(),
                source,
            })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.start_kill();
            return Err(Error::EarlyExit { code: None });
        };
        let mut stdout = BufReader::new(stdout).lines();
        let mut stderr = BufReader::new(stderr).lines();

        let failure = loop {
            tokio::select! {
                line = stdout.next_line() => match line? {
                    Some(line) if line.contains(READY_MARKER) => {
                        drain("stdout", stdout);
                        drain("stderr", stderr);
                        return Ok(child);
                    }
                    Some(line) => tracing::debug!(target: "registry", "{line}"),
                    None => break Error::EarlyExit { code: child.wait().await?.code() },
                },
                line = stderr.next_line() => match line? {
                    Some(line) if line.contains("EADDRINUSE") => break Error::PortInUse { port },
                    Some(line) => break Error::Stderr { message: line },
                    None => break Error::EarlyExit { code: child.wait().await?.code() },
                },
                status = child.wait() => break Error::EarlyExit { code: status?.code() },
            }
        };

        let _ = child.kill().await;
        Err(failure)
    }

    /// The registry URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotStarted`] before a successful [`Self::start`].
    pub fn url(&self) -> Result<String> {
        self.port
            .map(|port| format!("http://localhost:{port}"))
            .ok_or(Error::NotStarted)
    }

    /// Port the registry listens on, once started.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Kill the registry process.
    pub async fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "Failed to stop test registry");
            }
            tracing::debug!("Test registry stopped");
        }
        self.port = None;
    }
}

impl Drop for TestRegistry {
    fn drop(&mut self) {
        if let Some(child) = &mut self.child {
            let _ = child.start_kill();
        }
    }
}

/// Keep reading a stream after startup so the process never blocks on a full pipe.
fn drain<R>(stream: &'static str, mut lines: tokio::io::Lines<BufReader<R>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::trace!(target: "registry", stream, "{line}");
        }
    });
}
