//! Spawn-based process control
//!
//! Opens applications by name with `std::process::Command` and keeps the
//! child handles so they can be terminated later. Names carrying a URI
//! scheme are handed to the platform opener and reported as untrackable.

use std::collections::HashMap;
use std::process::{Child, Command};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::{CollabError, ProcessControl, ProcessHandle};

#[cfg(target_os = "macos")]
const URI_OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const URI_OPENER: &str = "xdg-open";

/// Process control backed by direct child-process spawning
#[derive(Default)]
pub struct ShellProcessControl {
    children: Mutex<HashMap<u32, (String, Child)>>,
}

impl ShellProcessControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u32, (String, Child)>> {
        self.children
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ProcessControl for ShellProcessControl {
    fn open_app(&self, name: &str) -> Result<Option<ProcessHandle>, CollabError> {
        // URI schemes go through the platform opener; the opener exits
        // immediately, so there is no process worth tracking.
        if name.contains("://") || name.ends_with(':') {
            Command::new(URI_OPENER)
                .arg(name)
                .spawn()
                .map_err(|e| CollabError::Acquisition {
                    what: name.to_string(),
                    cause: e.to_string(),
                })?;
            debug!(uri = name, "opened via platform opener");
            return Ok(None);
        }

        // Application names arrive as speech: "vs code" becomes "vs-code"
        let program = name.replace(' ', "-");
        let child = Command::new(&program)
            .spawn()
            .map_err(|e| CollabError::Acquisition {
                what: name.to_string(),
                cause: e.to_string(),
            })?;

        let pid = child.id();
        self.lock().insert(pid, (name.to_string(), child));
        debug!(app = name, pid, "spawned application");
        Ok(Some(ProcessHandle(pid)))
    }

    fn terminate(&self, handle: ProcessHandle) -> bool {
        let mut children = self.lock();
        match children.remove(&handle.0) {
            Some((name, mut child)) => {
                let killed = child.kill().is_ok();
                if killed {
                    let _ = child.wait();
                    debug!(app = %name, pid = handle.0, "terminated application");
                } else {
                    warn!(app = %name, pid = handle.0, "kill failed, process likely gone");
                }
                killed
            }
            None => false,
        }
    }

    fn running_process_names(&self) -> Vec<String> {
        let mut children = self.lock();
        // Drop entries whose process has already exited on its own
        children.retain(|_, (_, child)| matches!(child.try_wait(), Ok(None)));
        let mut names: Vec<String> = children.values().map(|(name, _)| name.clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_executable_is_acquisition_error() {
        let procs = ShellProcessControl::new();
        let err = procs.open_app("definitely-not-a-real-binary-aural").unwrap_err();
        assert!(matches!(err, CollabError::Acquisition { .. }));
        assert!(procs.running_process_names().is_empty());
    }

    #[test]
    fn test_terminate_unknown_handle() {
        let procs = ShellProcessControl::new();
        assert!(!procs.terminate(ProcessHandle(999_999)));
    }

    #[test]
    fn test_spawn_track_and_terminate() {
        let procs = ShellProcessControl::new();
        let handle = procs.open_app("sleep-test").err();
        // "sleep-test" does not exist; use a real short-lived process instead
        assert!(handle.is_some());

        let handle = {
            let child = Command::new("sleep").arg("30").spawn().unwrap();
            let pid = child.id();
            procs.lock().insert(pid, ("sleep".to_string(), child));
            ProcessHandle(pid)
        };
        assert_eq!(procs.running_process_names(), vec!["sleep".to_string()]);
        assert!(procs.terminate(handle));
        assert!(procs.running_process_names().is_empty());
    }
}
