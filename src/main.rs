//! aural: hands-free desktop command assistant
//!
//! A single dispatch loop turns recognized utterances into commands:
//! - Substring intent routing over an ordered rule table
//! - Session modes gating which commands apply
//! - Background reminders and a stopwatch that announce over a shared,
//!   serialized voice
//!
//! Ships with console adapters for speech in and out; real recognition,
//! synthesis, and browser automation plug in behind the same traits.

mod assistant;
mod collab;
mod config;
mod events;
mod lifecycle;
mod router;
mod session;
mod speech;
mod tasks;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::assistant::Assistant;
use crate::collab::{FileEditorLauncher, ShellProcessControl, UnconfiguredBrowser};
use crate::config::Config;
use crate::events::SessionEvent;
use crate::lifecycle::shutdown_signal;
use crate::speech::{ConsoleInput, ConsoleTts, Voice};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "aural starting");

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.data_dir, "configuration loaded");

    // Session events for observers (logging arm below; external surfaces
    // subscribe the same way)
    let (event_tx, mut event_rx) = broadcast::channel::<SessionEvent>(64);

    // Wire the collaborators behind their traits
    let voice = Arc::new(Voice::new(Box::new(ConsoleTts::new())));
    let input = Arc::new(ConsoleInput::start());
    let data_dir = config.data_dir.clone();
    let mut assistant = Assistant::new(
        config,
        Arc::clone(&voice),
        input,
        Arc::new(ShellProcessControl::new()),
        Arc::new(FileEditorLauncher::new(data_dir)),
        Arc::new(UnconfiguredBrowser::new()),
        event_tx,
    );

    info!("assistant initialized, entering dispatch loop");

    tokio::select! {
        // Run the dispatch loop (ends on a spoken shutdown command)
        _ = assistant.run() => {
            info!("dispatch loop exited");
        }

        // Log session events as they happen
        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        info!(%event, "session event");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "session event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("session event handler exited");
        }

        // Wait for shutdown signal
        result = shutdown_signal() => {
            if let Err(e) = result {
                warn!(?e, "signal handler error");
            } else {
                info!("shutdown signal received");
            }
        }
    }

    // Cleanup: a spoken shutdown already released everything; this is a
    // no-op then, and the real release on the signal path
    info!("shutting down...");
    assistant.release_all().await;

    info!("aural stopped");

    Ok(())
}
