//! Manual stopwatch
//!
//! A singleton: start records the wall-clock start time and spawns a
//! monitor task ticking at 1 Hz; the monitor is cancelled cooperatively
//! through a watch-channel stop flag, and `stop` waits until it has
//! observably finished before reporting. The monitor only ticks — all
//! state lives here and is mutated by the foreground loop alone.

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::speech::Voice;

struct Running {
    started_at: DateTime<Local>,
    stop_tx: watch::Sender<bool>,
    monitor: JoinHandle<()>,
}

/// Singleton stopwatch with a cooperatively cancelled monitor task
#[derive(Default)]
pub struct Stopwatch {
    running: Option<Running>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Wall-clock start time of the current run, if any
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.running.as_ref().map(|r| r.started_at)
    }

    /// Start the stopwatch. A spoken no-op if it is already running;
    /// returns whether a new run actually began.
    pub fn start(&mut self, voice: &Voice) -> bool {
        if self.running.is_some() {
            voice.speak("Stopwatch is already running.");
            return false;
        }

        let started_at = Local::now();
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let monitor = tokio::spawn(async move {
            let mut tick = interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = tick.tick() => {}
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("stopwatch monitor stopped");
        });

        self.running = Some(Running {
            started_at,
            stop_tx,
            monitor,
        });
        info!(started_at = %started_at.format("%H:%M:%S"), "stopwatch started");
        voice.speak(&format!(
            "Stopwatch started at: {}",
            started_at.format("%H:%M:%S")
        ));
        true
    }

    /// Stop the stopwatch, report elapsed time at whole-second precision,
    /// and clear the state. Blocks until the monitor has observably
    /// stopped. A spoken no-op if not running; returns the elapsed seconds
    /// of a finished run.
    pub async fn stop(&mut self, voice: &Voice) -> Option<i64> {
        let Some(running) = self.running.take() else {
            voice.speak("Stopwatch is not running.");
            return None;
        };

        let _ = running.stop_tx.send(true);
        if let Err(e) = running.monitor.await {
            warn!(?e, "stopwatch monitor join error");
        }

        let stopped_at = Local::now();
        let elapsed_secs = (stopped_at - running.started_at).num_seconds();
        info!(elapsed_secs, "stopwatch stopped");
        voice.speak(&format!(
            "Stopwatch stopped at: {}",
            stopped_at.format("%H:%M:%S")
        ));
        voice.speak(&format!("Total duration: {}", format_elapsed(elapsed_secs)));
        Some(elapsed_secs)
    }

    /// Speak the elapsed time of the current run without stopping it
    pub fn query(&self, voice: &Voice) {
        match &self.running {
            Some(running) => {
                let elapsed_secs = (Local::now() - running.started_at).num_seconds();
                voice.speak(&format!("Elapsed time: {}", format_elapsed(elapsed_secs)));
            }
            None => voice.speak("Stopwatch is not running."),
        }
    }

    /// Cancel a running monitor without any announcement (process shutdown)
    pub async fn cancel(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop_tx.send(true);
            let _ = running.monitor.await;
        }
    }
}

/// Whole-second elapsed form: "0:00:05"
fn format_elapsed(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
