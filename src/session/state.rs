//! Session mode register and resource ownership
//!
//! One mutable mode value plus at most one live handle per external
//! resource type (document editor, browser session) and the registry of
//! self-opened OS processes. All mutation goes through the methods here,
//! and only the foreground dispatch loop calls them; background tasks
//! never touch session state.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::collab::{
    BrowserKind, BrowserLauncher, BrowserSession, CollabError, DocumentEditor, EditorKind,
    EditorLauncher, ProcessHandle,
};
use crate::events::SessionEvent;

/// The single active modal context gating which commands are valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// No active mode
    Idle,
    /// A notepad-style editor is open
    Notepad,
    /// A word-processor document is open
    Word,
    /// Blocking dictation into the notepad editor
    InteractiveNotepad,
    /// Blocking dictation into the word processor
    InteractiveWord,
    /// The notes application was opened
    Notes,
    /// A browser automation session is live
    BrowserOpen,
    /// The stopwatch is running
    StopwatchRunning,
}

impl Default for SessionMode {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionMode::Idle => write!(f, "Idle"),
            SessionMode::Notepad => write!(f, "Notepad"),
            SessionMode::Word => write!(f, "Word"),
            SessionMode::InteractiveNotepad => write!(f, "InteractiveNotepad"),
            SessionMode::InteractiveWord => write!(f, "InteractiveWord"),
            SessionMode::Notes => write!(f, "Notes"),
            SessionMode::BrowserOpen => write!(f, "BrowserOpen"),
            SessionMode::StopwatchRunning => write!(f, "StopwatchRunning"),
        }
    }
}

/// Mutable session register: mode, resource handles, process registry
pub struct SessionState {
    mode: SessionMode,
    editor: Option<(EditorKind, Box<dyn DocumentEditor>)>,
    browser: Option<Box<dyn BrowserSession>>,
    tracked: HashMap<String, Option<ProcessHandle>>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionState {
    pub fn new(event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            mode: SessionMode::Idle,
            editor: None,
            browser: None,
            tracked: HashMap::new(),
            event_tx,
        }
    }

    /// Current mode
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Transition to a new mode, logging and broadcasting the change
    pub fn set_mode(&mut self, mode: SessionMode) {
        if mode == self.mode {
            return;
        }
        let from = self.mode;
        self.mode = mode;
        info!(from = %from, to = %mode, "mode transition");
        let _ = self.event_tx.send(SessionEvent::ModeChanged { from, to: mode });
    }

    /// Acquire a document-editor handle, releasing any prior one first
    pub fn acquire_editor(
        &mut self,
        launcher: &dyn EditorLauncher,
        kind: EditorKind,
        path: Option<&Path>,
    ) -> Result<(), CollabError> {
        if let Err(e) = self.release_editor() {
            warn!(%e, "error releasing previous editor");
        }
        let handle = launcher.open(kind, path)?;
        self.editor = Some((kind, handle));
        Ok(())
    }

    /// The live editor handle, if any
    pub fn editor(&mut self) -> Option<&mut (dyn DocumentEditor + 'static)> {
        self.editor.as_mut().map(|(_, editor)| editor.as_mut())
    }

    /// Kind of the live editor, if any
    pub fn editor_kind(&self) -> Option<EditorKind> {
        self.editor.as_ref().map(|(kind, _)| *kind)
    }

    /// Release the editor handle. Idempotent; the entry is cleared even if
    /// the close itself fails.
    pub fn release_editor(&mut self) -> Result<bool, CollabError> {
        match self.editor.take() {
            Some((_, mut editor)) => editor.close().map(|_| true),
            None => Ok(false),
        }
    }

    /// Acquire a browser handle, releasing any prior one first
    pub fn acquire_browser(
        &mut self,
        launcher: &dyn BrowserLauncher,
        kind: BrowserKind,
    ) -> Result<(), CollabError> {
        if let Err(e) = self.release_browser() {
            warn!(%e, "error releasing previous browser");
        }
        let handle = launcher.open(kind)?;
        self.browser = Some(handle);
        Ok(())
    }

    /// The live browser handle, if any
    pub fn browser(&mut self) -> Option<&mut (dyn BrowserSession + 'static)> {
        self.browser.as_deref_mut()
    }

    pub fn browser_open(&self) -> bool {
        self.browser.is_some()
    }

    /// Release the browser handle. Idempotent; the entry is cleared even if
    /// quitting the driver fails.
    pub fn release_browser(&mut self) -> Result<bool, CollabError> {
        match self.browser.take() {
            Some(mut browser) => browser.quit().map(|_| true),
            None => Ok(false),
        }
    }

    /// Record an application this session opened. `None` marks a process
    /// opened via an OS URI that cannot be tracked.
    pub fn track_process(&mut self, name: &str, handle: Option<ProcessHandle>) {
        self.tracked.insert(name.to_string(), handle);
    }

    /// Forget a tracked application. Returns false if it was not tracked.
    pub fn untrack_process(&mut self, name: &str) -> bool {
        self.tracked.remove(name).is_some()
    }

    /// Handle recorded for a tracked application
    pub fn tracked_handle(&self, name: &str) -> Option<Option<ProcessHandle>> {
        self.tracked.get(name).copied()
    }

    /// Names of all tracked applications, sorted
    pub fn tracked_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tracked.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Editor launcher that journals open/close calls
    struct JournalLauncher {
        journal: Arc<Mutex<Vec<String>>>,
        counter: AtomicUsize,
    }

    struct JournalEditor {
        id: usize,
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl EditorLauncher for JournalLauncher {
        fn open(
            &self,
            _kind: EditorKind,
            _path: Option<&Path>,
        ) -> Result<Box<dyn DocumentEditor>, CollabError> {
            let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            self.journal.lock().unwrap().push(format!("open#{id}"));
            Ok(Box::new(JournalEditor {
                id,
                journal: Arc::clone(&self.journal),
            }))
        }
    }

    impl DocumentEditor for JournalEditor {
        fn type_text(&mut self, _text: &str) -> Result<(), CollabError> {
            Ok(())
        }
        fn save_as(&mut self, _filename: &str) -> Result<(), CollabError> {
            Ok(())
        }
        fn close(&mut self) -> Result<(), CollabError> {
            self.journal.lock().unwrap().push(format!("close#{}", self.id));
            Ok(())
        }
    }

    fn state() -> SessionState {
        let (tx, _rx) = broadcast::channel(16);
        SessionState::new(tx)
    }

    fn journal_launcher() -> (JournalLauncher, Arc<Mutex<Vec<String>>>) {
        let journal = Arc::new(Mutex::new(Vec::new()));
        (
            JournalLauncher {
                journal: Arc::clone(&journal),
                counter: AtomicUsize::new(0),
            },
            journal,
        )
    }

    #[test]
    fn test_acquire_twice_releases_first_before_second() {
        let mut session = state();
        let (launcher, journal) = journal_launcher();

        session
            .acquire_editor(&launcher, EditorKind::Notepad, None)
            .unwrap();
        session
            .acquire_editor(&launcher, EditorKind::Notepad, None)
            .unwrap();

        let journal = journal.lock().unwrap();
        assert_eq!(journal.as_slice(), ["open#1", "close#1", "open#2"]);
    }

    #[test]
    fn test_editor_kind_follows_acquisition() {
        let mut session = state();
        let (launcher, _journal) = journal_launcher();

        assert_eq!(session.editor_kind(), None);
        session
            .acquire_editor(&launcher, EditorKind::Word, None)
            .unwrap();
        assert_eq!(session.editor_kind(), Some(EditorKind::Word));

        session
            .acquire_editor(&launcher, EditorKind::Notepad, None)
            .unwrap();
        assert_eq!(session.editor_kind(), Some(EditorKind::Notepad));

        session.release_editor().unwrap();
        assert_eq!(session.editor_kind(), None);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut session = state();
        let (launcher, journal) = journal_launcher();

        session
            .acquire_editor(&launcher, EditorKind::Word, None)
            .unwrap();
        assert!(session.release_editor().unwrap());
        assert!(!session.release_editor().unwrap());
        assert!(!session.release_editor().unwrap());

        assert_eq!(journal.lock().unwrap().as_slice(), ["open#1", "close#1"]);
    }

    #[test]
    fn test_mode_transition_emits_event() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut session = SessionState::new(tx);

        session.set_mode(SessionMode::Notepad);
        let event = rx.try_recv().unwrap();
        assert!(matches!(
            event,
            SessionEvent::ModeChanged {
                from: SessionMode::Idle,
                to: SessionMode::Notepad,
            }
        ));

        // Setting the same mode again is not a transition
        session.set_mode(SessionMode::Notepad);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_process_registry() {
        let mut session = state();
        session.track_process("chrome", Some(ProcessHandle(42)));
        session.track_process("settings", None);

        assert_eq!(session.tracked_handle("chrome"), Some(Some(ProcessHandle(42))));
        assert_eq!(session.tracked_handle("settings"), Some(None));
        assert_eq!(session.tracked_names(), vec!["chrome", "settings"]);

        assert!(session.untrack_process("chrome"));
        assert!(!session.untrack_process("chrome"));
        assert_eq!(session.tracked_names(), vec!["settings"]);
    }
}
