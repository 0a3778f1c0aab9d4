//! Reminder time parsing and the reminder poller task
//!
//! A reminder is independent of the dispatch loop: once spawned it polls
//! the wall clock at 1 Hz, speaks its message exactly once when the fire
//! time is reached or passed, and terminates. There is no explicit cancel;
//! outstanding reminders are aborted at process shutdown.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use regex::Regex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use crate::speech::Voice;

/// The spoken time expression could not be interpreted
#[derive(Debug, thiserror::Error)]
#[error("could not interpret {input:?} as a time of day")]
pub struct TimeParseError {
    pub input: String,
}

/// Normalize compact meridian forms to a colon form: "2pm" becomes
/// "2:00 pm" and "230pm" becomes "2:30 pm". Anything else passes through
/// unchanged.
pub fn normalize_compact_time(text: &str) -> String {
    // Unwrap is fine: the pattern is a compile-time constant
    let compact = Regex::new(r"^(\d{1,4})\s*([ap])\.?\s*m\.?$").unwrap();
    let trimmed = text.trim();
    match compact.captures(trimmed) {
        Some(caps) => {
            let digits = &caps[1];
            let meridian = format!("{}m", &caps[2]);
            let (hours, minutes) = if digits.len() <= 2 {
                (digits.to_string(), 0)
            } else {
                let split = digits.len() - 2;
                (
                    digits[..split].to_string(),
                    digits[split..].parse().unwrap_or(0),
                )
            };
            format!("{hours}:{minutes:02} {meridian}")
        }
        None => trimmed.to_string(),
    }
}

// chrono refuses minute-less inputs, so bare hours are given ":00" before
// parsing instead of carrying a minute-less format here
const TIME_FORMATS: &[&str] = &["%I:%M %p", "%H:%M:%S", "%H:%M"];

/// Parse a spoken time expression into an absolute fire time.
///
/// The parsed time of day is pinned to today's date; if that moment is
/// already past relative to `now`, it rolls forward exactly one day.
pub fn parse_reminder_time(input: &str, now: NaiveDateTime) -> Result<NaiveDateTime, TimeParseError> {
    let mut text = normalize_compact_time(input);
    // Tolerate a leading filler word: "at 2:00 pm"
    for prefix in ["at ", "around "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim().to_string();
        }
    }
    let mut text = text.to_uppercase();
    // A bare hour like "17" becomes "17:00"
    if !text.is_empty() && text.len() <= 2 && text.chars().all(|c| c.is_ascii_digit()) {
        text.push_str(":00");
    }

    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&text, fmt).ok())
        .ok_or_else(|| TimeParseError {
            input: input.to_string(),
        })?;

    let mut fire_at = now.date().and_time(time);
    if fire_at < now {
        fire_at += ChronoDuration::days(1);
    }
    Ok(fire_at)
}

/// Spoken announcement form of a fire time: "2:18 pm"
pub fn format_fire_time(fire_at: NaiveDateTime) -> String {
    fire_at.format("%-I:%M %p").to_string().to_lowercase()
}

/// Spawn the detached poller for one reminder
pub fn spawn_reminder(fire_at: NaiveDateTime, message: String, voice: Arc<Voice>) -> JoinHandle<()> {
    info!(%fire_at, "reminder scheduled");
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(1));
        loop {
            tick.tick().await;
            if Local::now().naive_local() >= fire_at {
                voice.speak(&format!("Reminder: {message}"));
                debug!(%fire_at, "reminder fired");
                break;
            }
        }
    })
}
