//! Output serializer
//!
//! A single process-wide lock around the blocking synthesis call. The
//! dispatch loop and every background task share one [`Voice`], so two
//! announcements can never interleave mid-utterance. Ordering between
//! callers is lock-acquisition order only.

use std::sync::Mutex;

use tracing::debug;

use super::TextToSpeech;

/// Serialized spoken output
pub struct Voice {
    tts: Box<dyn TextToSpeech>,
    guard: Mutex<()>,
}

impl Voice {
    pub fn new(tts: Box<dyn TextToSpeech>) -> Self {
        Self {
            tts,
            guard: Mutex::new(()),
        }
    }

    /// Speak one utterance, holding the lock for the duration of synthesis
    pub fn speak(&self, text: &str) {
        let _held = self
            .guard
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        debug!(%text, "speaking");
        self.tts.say(text);
    }
}
