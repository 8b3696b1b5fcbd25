//! Package manager process wrappers for beachball.
//!
//! - [`command`]: run npm, pnpm or yarn and capture the outcome
//! - [`publish`]: build and run `npm publish` with registry auth
//! - [`registry`]: launch a throwaway local registry for tests

pub mod command;
pub mod error;
pub mod publish;
pub mod registry;

pub use command::{PackageManagerResult, npm, pnpm, run_command, yarn};
pub use error::{Error, Result};
pub use publish::{PublishArgs, auth_prefix, publish_package};
pub use registry::{RegistryLauncher, TestRegistry, find_free_port};
