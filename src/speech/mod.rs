//! Speech I/O: recognition input, synthesis output, and the output serializer

mod console;
mod io;
mod voice;

pub use console::{ConsoleInput, ConsoleTts};
pub use io::{SpeechInput, TextToSpeech};
pub use voice::Voice;
