//! Signal handling for graceful shutdown
//!
//! A SIGTERM or SIGINT ends the session the same way a spoken "goodbye"
//! does: resources released, background tasks cancelled.

use anyhow::Context;
use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;

/// Resolve when the process receives SIGTERM or SIGINT
pub async fn shutdown_signal() -> anyhow::Result<()> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to register SIGTERM handler")?;
    let mut sigint =
        signal(SignalKind::interrupt()).context("failed to register SIGINT handler")?;

    tokio::select! {
        _ = sigterm.recv() => debug!("received SIGTERM"),
        _ = sigint.recv() => debug!("received SIGINT"),
    }
    Ok(())
}
