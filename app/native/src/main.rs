#![allow(clippy::multiple_crate_versions)]

//! Deskshell command-line interface.
//!
//! Logs go to stderr, filtered by `DESKSHELL_LOG` (default `info`).

use deskshell_lib::constants;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env(constants::env::LOG_FILTER)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    if let Err(err) = deskshell_lib::cli::run() {
        eprintln!("deskshell: {err}");
        std::process::exit(1);
    }
}
