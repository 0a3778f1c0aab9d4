//! Events emitted by the session and background tasks
//!
//! Broadcast on a channel and consumed by the logging arm in `main`.
//! Everything here is serializable so a future UI surface can subscribe
//! without a new protocol.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::session::SessionMode;

/// Events emitted during a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The active session mode changed
    ModeChanged {
        from: SessionMode,
        to: SessionMode,
    },

    /// A reminder task was scheduled
    ReminderScheduled {
        fire_at: NaiveDateTime,
    },

    /// The stopwatch was started
    StopwatchStarted,

    /// The stopwatch was stopped
    StopwatchStopped {
        /// Whole seconds elapsed between start and stop
        elapsed_secs: i64,
    },

    /// The user asked the assistant to shut down
    ShutdownRequested,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::ModeChanged { from, to } => {
                write!(f, "MODE_CHANGED ({from} -> {to})")
            }
            SessionEvent::ReminderScheduled { fire_at } => {
                write!(f, "REMINDER_SCHEDULED ({fire_at})")
            }
            SessionEvent::StopwatchStarted => write!(f, "STOPWATCH_STARTED"),
            SessionEvent::StopwatchStopped { elapsed_secs } => {
                write!(f, "STOPWATCH_STOPPED ({elapsed_secs}s)")
            }
            SessionEvent::ShutdownRequested => write!(f, "SHUTDOWN_REQUESTED"),
        }
    }
}
