//! Console speech adapter
//!
//! Stands in for microphone capture and synthesis when developing without
//! either: typed lines are "utterances", spoken output goes to stdout. A
//! dedicated reader thread owns stdin and hands lines over a channel so
//! that listen calls can use a bounded wait.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{SpeechInput, TextToSpeech};

/// Line-based speech input reading from stdin
pub struct ConsoleInput {
    lines: Mutex<Receiver<String>>,
}

impl ConsoleInput {
    /// Spawn the stdin reader thread and return the input handle
    pub fn start() -> Self {
        let (tx, rx) = mpsc::channel();

        if let Err(e) = thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                info!("stdin reader thread started");
                let stdin = std::io::stdin();
                let mut line = String::new();
                loop {
                    line.clear();
                    match stdin.read_line(&mut line) {
                        Ok(0) => break, // EOF
                        Ok(_) => {
                            if tx.send(line.trim_end().to_string()).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(?e, "stdin read error");
                            break;
                        }
                    }
                }
                info!("stdin reader thread stopped");
            })
        {
            warn!(?e, "failed to spawn stdin reader thread");
        }

        Self {
            lines: Mutex::new(rx),
        }
    }
}

impl SpeechInput for ConsoleInput {
    fn listen(&self, timeout: Duration, _phrase_limit: Duration) -> String {
        let rx = self
            .lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match rx.recv_timeout(timeout) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                debug!("listen timed out");
                String::new()
            }
            Err(RecvTimeoutError::Disconnected) => String::new(),
        }
    }
}

/// Speech synthesis printing to stdout
#[derive(Default)]
pub struct ConsoleTts;

impl ConsoleTts {
    pub fn new() -> Self {
        Self
    }
}

impl TextToSpeech for ConsoleTts {
    fn say(&self, text: &str) {
        println!("[assistant] {text}");
    }
}
