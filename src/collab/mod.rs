//! Collaborator interfaces
//!
//! The assistant core calls external capabilities (OS process control, a
//! document editor, a browser automation driver) through the narrow traits
//! defined here; it never implements them itself. Local adapters good enough
//! to run the binary end to end live in the submodules.

mod browser;
mod editor;
mod process;

pub use browser::UnconfiguredBrowser;
pub use editor::FileEditorLauncher;
pub use process::ShellProcessControl;

use std::path::Path;

/// Errors crossing a collaborator boundary.
///
/// Every variant is recoverable: handlers speak the message and the dispatch
/// loop continues.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("could not open {what}: {cause}")]
    Acquisition { what: String, cause: String },

    #[error("{0}")]
    Operation(String),
}

/// Opaque reference to an OS process the assistant spawned itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle(pub u32);

/// OS process control: open named applications, terminate them, list them
pub trait ProcessControl: Send + Sync {
    /// Open a named application. `Ok(None)` means the application was opened
    /// through an OS URI and is not independently trackable.
    fn open_app(&self, name: &str) -> Result<Option<ProcessHandle>, CollabError>;

    /// Terminate a previously opened process. Returns false if the process
    /// is unknown or already gone.
    fn terminate(&self, handle: ProcessHandle) -> bool;

    /// Names of processes this collaborator knows to be running
    fn running_process_names(&self) -> Vec<String>;
}

/// Which document application a session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    Notepad,
    Word,
}

impl EditorKind {
    /// Default filename extension for documents of this kind
    pub fn extension(&self) -> &'static str {
        match self {
            EditorKind::Notepad => "txt",
            EditorKind::Word => "docx",
        }
    }
}

impl std::fmt::Display for EditorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorKind::Notepad => write!(f, "Notepad"),
            EditorKind::Word => write!(f, "Word"),
        }
    }
}

/// A live document-editor instance, exclusively owned by the session
pub trait DocumentEditor: Send {
    /// Type text verbatim at the current position
    fn type_text(&mut self, text: &str) -> Result<(), CollabError>;

    /// Save the active document under the given filename
    fn save_as(&mut self, filename: &str) -> Result<(), CollabError>;

    /// Close the editor instance
    fn close(&mut self) -> Result<(), CollabError>;
}

/// Factory for document-editor instances
pub trait EditorLauncher: Send + Sync {
    /// Open an editor, optionally loading an existing document
    fn open(
        &self,
        kind: EditorKind,
        path: Option<&Path>,
    ) -> Result<Box<dyn DocumentEditor>, CollabError>;
}

/// Which browser a session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
}

impl BrowserKind {
    /// Pick a browser kind out of a free-form utterance fragment
    pub fn from_utterance(text: &str) -> Option<Self> {
        if text.contains("chrome") {
            Some(BrowserKind::Chrome)
        } else if text.contains("firefox") {
            Some(BrowserKind::Firefox)
        } else if text.contains("edge") {
            Some(BrowserKind::Edge)
        } else {
            None
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserKind::Chrome => write!(f, "Chrome"),
            BrowserKind::Firefox => write!(f, "Firefox"),
            BrowserKind::Edge => write!(f, "Edge"),
        }
    }
}

/// A live browser-automation session, exclusively owned by the session
pub trait BrowserSession: Send {
    fn navigate(&mut self, url: &str) -> Result<(), CollabError>;

    /// Click the first element whose text contains the fragment.
    /// `Ok(false)` means no such element was found.
    fn find_and_click(&mut self, fragment: &str) -> Result<bool, CollabError>;

    /// Scroll the page vertically; negative pixels scroll up
    fn scroll_by(&mut self, pixels: i64) -> Result<(), CollabError>;

    fn back(&mut self) -> Result<(), CollabError>;

    /// Extract the visible text of the current page
    fn visible_text(&mut self) -> Result<String, CollabError>;

    /// Send a bare key press to the page (video seeking uses `j`/`l`)
    fn press_key(&mut self, key: char) -> Result<(), CollabError>;

    fn quit(&mut self) -> Result<(), CollabError>;
}

/// Factory for browser sessions
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, kind: BrowserKind) -> Result<Box<dyn BrowserSession>, CollabError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_kind_from_utterance() {
        assert_eq!(
            BrowserKind::from_utterance("chrome please"),
            Some(BrowserKind::Chrome)
        );
        assert_eq!(BrowserKind::from_utterance("firefox"), Some(BrowserKind::Firefox));
        assert_eq!(BrowserKind::from_utterance("safari"), None);
    }

    #[test]
    fn test_editor_kind_extension() {
        assert_eq!(EditorKind::Notepad.extension(), "txt");
        assert_eq!(EditorKind::Word.extension(), "docx");
    }
}
