//! Speech collaborator traits
//!
//! Recognition and synthesis are external capabilities. Both contracts are
//! deliberately infallible at this boundary: a failed or timed-out listen
//! yields an empty utterance, never an error, so the dispatch loop can
//! treat every cycle uniformly.

use std::time::Duration;

/// Speech recognition input
pub trait SpeechInput: Send + Sync {
    /// Listen for one utterance.
    ///
    /// Blocks for at most `timeout` waiting for speech to start and caps a
    /// single phrase at `phrase_limit`. Returns the recognized text, or an
    /// empty string on timeout or recognition failure.
    fn listen(&self, timeout: Duration, phrase_limit: Duration) -> String;
}

/// Speech synthesis output.
///
/// `say` performs the blocking synthesis call. Callers must route through
/// [`super::Voice`] rather than calling this directly, so concurrent
/// announcements never interleave.
pub trait TextToSpeech: Send + Sync {
    fn say(&self, text: &str);
}
