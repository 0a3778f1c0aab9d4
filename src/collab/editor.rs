//! File-backed document editor
//!
//! A headless stand-in for a GUI editor: dictated text accumulates in a
//! buffer that is flushed to disk on every write, "save as" re-targets the
//! buffer to a named file, and close persists whatever is left in the
//! scratch document.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{CollabError, DocumentEditor, EditorKind, EditorLauncher};

/// Launcher producing [`FileEditor`] instances under a data directory
pub struct FileEditorLauncher {
    data_dir: PathBuf,
}

impl FileEditorLauncher {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl EditorLauncher for FileEditorLauncher {
    fn open(
        &self,
        kind: EditorKind,
        path: Option<&Path>,
    ) -> Result<Box<dyn DocumentEditor>, CollabError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| CollabError::Acquisition {
            what: format!("{kind} data directory"),
            cause: e.to_string(),
        })?;

        let target = match path {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => self.data_dir.join(p),
            None => self.data_dir.join(format!("scratch.{}", kind.extension())),
        };

        // Opening a named document that does not exist is an acquisition
        // failure; the caller decides whether to fall back to a new one.
        let buffer = match path {
            Some(_) => std::fs::read_to_string(&target).map_err(|e| CollabError::Acquisition {
                what: target.display().to_string(),
                cause: e.to_string(),
            })?,
            None => String::new(),
        };

        info!(kind = %kind, path = %target.display(), "opened editor");
        Ok(Box::new(FileEditor { target, buffer }))
    }
}

struct FileEditor {
    target: PathBuf,
    buffer: String,
}

impl FileEditor {
    fn flush(&self) -> Result<(), CollabError> {
        std::fs::write(&self.target, &self.buffer)
            .map_err(|e| CollabError::Operation(format!("could not write document: {e}")))
    }
}

impl DocumentEditor for FileEditor {
    fn type_text(&mut self, text: &str) -> Result<(), CollabError> {
        self.buffer.push_str(text);
        self.flush()?;
        debug!(chars = text.len(), "typed text into document");
        Ok(())
    }

    fn save_as(&mut self, filename: &str) -> Result<(), CollabError> {
        let new_target = match self.target.parent() {
            Some(dir) => dir.join(filename),
            None => PathBuf::from(filename),
        };
        let old_target = std::mem::replace(&mut self.target, new_target);
        self.flush()?;
        if old_target != self.target && old_target.exists() {
            let _ = std::fs::remove_file(&old_target);
        }
        info!(path = %self.target.display(), "document saved");
        Ok(())
    }

    fn close(&mut self) -> Result<(), CollabError> {
        if !self.buffer.is_empty() {
            self.flush()?;
        }
        debug!(path = %self.target.display(), "editor closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aural-editor-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_type_and_save_as() {
        let dir = temp_dir("save");
        let launcher = FileEditorLauncher::new(&dir);
        let mut editor = launcher.open(EditorKind::Notepad, None).unwrap();

        editor.type_text("hello\n").unwrap();
        editor.type_text("world\n").unwrap();
        editor.save_as("greeting.txt").unwrap();

        let saved = std::fs::read_to_string(dir.join("greeting.txt")).unwrap();
        assert_eq!(saved, "hello\nworld\n");
        assert!(!dir.join("scratch.txt").exists());
    }

    #[test]
    fn test_open_missing_document_fails() {
        let dir = temp_dir("missing");
        let launcher = FileEditorLauncher::new(&dir);
        let result = launcher.open(EditorKind::Word, Some(Path::new("nope.docx")));
        assert!(matches!(result, Err(CollabError::Acquisition { .. })));
    }

    #[test]
    fn test_open_existing_document_loads_content() {
        let dir = temp_dir("existing");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("notes.txt"), "prior content\n").unwrap();

        let launcher = FileEditorLauncher::new(&dir);
        let mut editor = launcher
            .open(EditorKind::Notepad, Some(Path::new("notes.txt")))
            .unwrap();
        editor.type_text("appended\n").unwrap();
        editor.close().unwrap();

        let content = std::fs::read_to_string(dir.join("notes.txt")).unwrap();
        assert_eq!(content, "prior content\nappended\n");
    }
}
