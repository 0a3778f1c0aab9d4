//! Background task supervisor
//!
//! Owns the handles of every detached task: reminder pollers and the
//! stopwatch. Independent of the dispatch loop except at shutdown, where
//! outstanding reminders are aborted and the stopwatch monitor is
//! cancelled cooperatively.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tracing::info;

use crate::speech::Voice;

use super::reminder::spawn_reminder;
use super::Stopwatch;

/// Supervisor for reminders and the stopwatch
#[derive(Default)]
pub struct TaskSupervisor {
    reminders: Vec<JoinHandle<()>>,
    pub stopwatch: Stopwatch,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an independent reminder poller
    pub fn add_reminder(&mut self, fire_at: NaiveDateTime, message: String, voice: Arc<Voice>) {
        // Finished pollers keep their handle until the next sweep
        self.reminders.retain(|h| !h.is_finished());
        self.reminders.push(spawn_reminder(fire_at, message, voice));
    }

    /// Reminders still outstanding
    pub fn pending_reminders(&self) -> usize {
        self.reminders.iter().filter(|h| !h.is_finished()).count()
    }

    /// Cancel everything: abort reminder pollers, stop the stopwatch
    /// monitor without an announcement
    pub async fn shutdown(&mut self) {
        let outstanding = self.pending_reminders();
        if outstanding > 0 {
            info!(outstanding, "aborting outstanding reminders");
        }
        for handle in self.reminders.drain(..) {
            handle.abort();
        }
        self.stopwatch.cancel().await;
    }
}
