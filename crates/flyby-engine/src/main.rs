//! # Flyby Engine
//!
//! Headless entry point for Flyby: a vehicle flying over endless streamed
//! noise terrain.
//!
//! This crate ties together:
//! - World: terrain synthesis, segment streaming, height queries
//! - Gameplay: flight control and the session tick
//!
//! Usage: `flyby [CONFIG_PATH]`. Without a path, `FLYBY_CONFIG` or
//! `./flyby.toml` is used, falling back to defaults. `flyby --init` writes
//! the default configuration there and exits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod intro;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("flyby=info".parse()?))
        .init();

    info!("Flyby starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args_os().nth(1) {
        Some(arg) if arg == "--init" => {
            EngineConfig::default().save()?;
            return Ok(());
        },
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };

    let summary = app::run(config)?;
    info!(
        "Final position ({:.1}, {:.1}, {:.1}), {} segments loaded",
        summary.pose.position.x, summary.pose.position.y, summary.pose.position.z, summary.loaded
    );

    info!("Flyby shutdown complete");
    Ok(())
}
