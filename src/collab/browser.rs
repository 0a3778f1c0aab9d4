//! Browser launcher placeholder
//!
//! Real browser automation is an external collaborator (a WebDriver
//! binding). Until one is wired in, opening a browser reports the service
//! as unavailable and the handler aborts with the cause spoken.

use super::{BrowserKind, BrowserLauncher, BrowserSession, CollabError};

/// Launcher that always reports browser automation as unavailable
#[derive(Default)]
pub struct UnconfiguredBrowser;

impl UnconfiguredBrowser {
    pub fn new() -> Self {
        Self
    }
}

impl BrowserLauncher for UnconfiguredBrowser {
    fn open(&self, kind: BrowserKind) -> Result<Box<dyn BrowserSession>, CollabError> {
        Err(CollabError::Unavailable(format!(
            "no browser automation driver is configured for {kind}"
        )))
    }
}
