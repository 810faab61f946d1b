//! # Arcane Engine
//!
//! Headless runner for the Arcane combat prototype.
//!
//! Loads `arcane.toml` (or the file named by `ARCANE_CONFIG`), builds the
//! combat world and runs a scripted session on a fixed timestep, logging
//! stats along the way. Set `RUST_LOG` to adjust verbosity.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("arcane=info".parse()?))
        .init();

    info!("Arcane starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    app::run()?;

    info!("Arcane shutdown complete");
    Ok(())
}
