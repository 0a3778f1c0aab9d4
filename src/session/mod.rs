//! Session state: the single active mode and the owned resource handles

mod state;

pub use state::{SessionMode, SessionState};
