//! beachball CLI entry point.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use beachball::cli::{self, CliError, EXIT_OK, exit_code_for, render_error};
use beachball::tracing::{TracingConfig, TracingFormat};
use beachball::{CliOptionsCache, commands};

#[tokio::main]
async fn main() {
    // NOTE: tracing may be unusable during a panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let exit_code = run().await;
    std::process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = cli::parse();
    let json = cli.json;

    let tracing_config = TracingConfig {
        format: if json {
            TracingFormat::Json
        } else {
            TracingFormat::Compact
        },
        level: cli.level.into(),
        ..Default::default()
    };
    if let Err(e) = beachball::tracing::init_tracing(tracing_config) {
        eprintln!("Warning: {e}");
    }

    let cache = CliOptionsCache::new(cli);
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            let err = CliError::failed(format!("Cannot determine the current directory: {e}"));
            render_error(&err, json);
            return exit_code_for(&err);
        }
    };

    match commands::execute(&cache, &cwd).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            EXIT_OK
        }
        Err(err) => {
            render_error(&err, json);
            exit_code_for(&err)
        }
    }
}
