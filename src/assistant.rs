//! The assistant: listen → route → dispatch
//!
//! One foreground loop owns all session mutation. A handler, including the
//! blocking dictation sub-loop, runs to completion before the next listen,
//! so command semantics are strictly sequential. Background tasks created
//! here (reminders, the stopwatch monitor) only ever call the output
//! serializer.

use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::collab::{BrowserKind, BrowserLauncher, EditorKind, EditorLauncher, ProcessControl};
use crate::config::Config;
use crate::events::SessionEvent;
use crate::router::{self, normalize_filename, query_encode, Command, Routed};
use crate::session::{SessionMode, SessionState};
use crate::speech::{SpeechInput, Voice};
use crate::tasks::{format_fire_time, parse_reminder_time, TaskSupervisor};

const YOUTUBE_URL: &str = "https://www.youtube.com/";

pub struct Assistant {
    config: Config,
    session: SessionState,
    voice: Arc<Voice>,
    input: Arc<dyn SpeechInput>,
    procs: Arc<dyn ProcessControl>,
    editors: Arc<dyn EditorLauncher>,
    browsers: Arc<dyn BrowserLauncher>,
    tasks: TaskSupervisor,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Assistant {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        voice: Arc<Voice>,
        input: Arc<dyn SpeechInput>,
        procs: Arc<dyn ProcessControl>,
        editors: Arc<dyn EditorLauncher>,
        browsers: Arc<dyn BrowserLauncher>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            config,
            session: SessionState::new(event_tx.clone()),
            voice,
            input,
            procs,
            editors,
            browsers,
            tasks: TaskSupervisor::new(),
            event_tx,
        }
    }

    /// Run the dispatch loop until a shutdown command
    pub async fn run(&mut self) {
        self.voice
            .speak("Hello! I'm your voice assistant. How can I help you today?");

        loop {
            let utterance = self.listen(None);
            if utterance.is_empty() {
                continue;
            }
            match router::route(&utterance, self.session.mode()) {
                Routed::Command(command) => {
                    debug!(?command, "dispatching");
                    if self.dispatch(command).await.is_break() {
                        break;
                    }
                }
                Routed::MissingArgument { clarification } => {
                    self.voice.speak(clarification);
                }
                Routed::Unrecognized => {
                    debug!(%utterance, "unrecognized command");
                    self.voice
                        .speak("I'm sorry, I didn't understand that command.");
                }
            }
        }
    }

    /// One bounded listen, optionally preceded by a spoken prompt.
    /// Returns the normalized (lowercased, trimmed) utterance; empty on
    /// timeout or recognition failure.
    fn listen(&self, prompt: Option<&str>) -> String {
        if let Some(prompt) = prompt {
            self.voice.speak(prompt);
        }
        self.input
            .listen(self.config.listen_timeout, self.config.phrase_limit)
            .to_lowercase()
            .trim()
            .to_string()
    }

    /// Execute one routed command
    async fn dispatch(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Shutdown => return self.shutdown_session().await,
            Command::OpenApp { name } => self.open_app(&name),
            Command::CloseApp { name } => self.close_app(&name),
            Command::ListTrackedApps => self.list_tracked_apps(),
            Command::ListRunningApps => self.list_running_apps(),
            Command::OpenNotepad => self.open_editor(EditorKind::Notepad, None),
            Command::OpenWord => self.open_editor(EditorKind::Word, None),
            Command::OpenNotepadFile => self.open_editor_file(EditorKind::Notepad),
            Command::OpenWordFile => self.open_editor_file(EditorKind::Word),
            Command::OpenNotes => self.open_notes(),
            Command::DictateToNotepad => self.dictate(EditorKind::Notepad),
            Command::DictateToWord => self.dictate(EditorKind::Word),
            Command::WriteText => self.write_text(),
            Command::SaveDocument => self.save_document(),
            Command::CloseNotepad => self.close_editor(EditorKind::Notepad),
            Command::CloseWord => self.close_editor(EditorKind::Word),
            Command::SetReminder => self.set_reminder(),
            Command::OpenBrowser { kind } => self.open_browser(kind),
            Command::SearchFor { topic } => self.search_for(&topic),
            Command::OpenYoutube => self.youtube_page("", "Opening YouTube."),
            Command::SearchYoutube { query } => self.search_youtube(&query),
            Command::YoutubeHistory => {
                self.youtube_page("feed/history", "Opening your YouTube history.")
            }
            Command::YoutubeSubscriptions => {
                self.youtube_page("feed/subscriptions", "Opening your YouTube subscriptions.")
            }
            Command::YoutubeHome => self.youtube_page("", "Going to YouTube Home."),
            Command::PlayPauseVideo => self.tap_video_key(' ', "Toggling play or pause."),
            Command::NextVideo => self.tap_video_key('N', "Skipping to the next video."),
            Command::PreviousVideo => {
                self.tap_video_key('P', "Going back to the previous video.")
            }
            Command::ScrollDown => self.scroll(self.config.scroll_step_px),
            Command::ScrollUp => self.scroll(-self.config.scroll_step_px),
            Command::ClickLink { text } => self.click_link(&text),
            Command::GoBack => self.go_back(),
            Command::ReadPage => self.read_page(),
            Command::SeekForward { seconds } => self.seek(seconds, true),
            Command::SeekBackward { seconds } => self.seek(seconds, false),
            Command::CloseBrowser => self.close_browser(),
            Command::StartStopwatch => self.start_stopwatch(),
            Command::StopStopwatch => self.stop_stopwatch().await,
            Command::QueryStopwatch => self.tasks.stopwatch.query(&self.voice),
        }
        ControlFlow::Continue(())
    }

    /// Release everything and end the loop
    async fn shutdown_session(&mut self) -> ControlFlow<()> {
        info!("shutdown requested");
        let _ = self.event_tx.send(SessionEvent::ShutdownRequested);
        self.voice.speak("Goodbye!");
        self.release_all().await;
        ControlFlow::Break(())
    }

    /// Best-effort release of handles and background tasks. Idempotent;
    /// also used on the signal path.
    pub async fn release_all(&mut self) {
        if let Err(e) = self.session.release_browser() {
            self.voice.speak(&format!("Error while closing the browser: {e}"));
        }
        if let Err(e) = self.session.release_editor() {
            self.voice.speak(&format!("Error while closing the editor: {e}"));
        }
        self.tasks.shutdown().await;
    }

    // --- Application launcher ---

    fn open_app(&mut self, name: &str) {
        match self.procs.open_app(name) {
            Ok(handle) => {
                self.session.track_process(name, handle);
                self.voice.speak(&format!("Opening {name}."));
            }
            Err(e) => {
                self.session.untrack_process(name);
                self.voice.speak(&format!("Sorry, I couldn't open {name}. {e}"));
            }
        }
    }

    fn close_app(&mut self, name: &str) {
        match self.session.tracked_handle(name) {
            Some(Some(handle)) => {
                if self.procs.terminate(handle) {
                    self.voice.speak(&format!("Closing {name}."));
                } else {
                    self.voice
                        .speak(&format!("{name} process not found. It may already be closed."));
                }
                self.session.untrack_process(name);
            }
            Some(None) => {
                // URI-opened: nothing to terminate, acknowledge and forget
                self.voice.speak(&format!(
                    "{name} was opened through the system and cannot be closed directly."
                ));
                self.session.untrack_process(name);
            }
            None => {
                self.voice
                    .speak(&format!("Could not find a running process for {name} to close."));
            }
        }
    }

    fn list_tracked_apps(&mut self) {
        let names = self.session.tracked_names();
        if names.is_empty() {
            self.voice
                .speak("No applications are currently open that I launched.");
            return;
        }
        self.voice.speak("The following applications are open:");
        for name in names {
            self.voice.speak(&name);
        }
    }

    fn list_running_apps(&mut self) {
        let names = self.procs.running_process_names();
        if names.is_empty() {
            self.voice.speak("No tracked applications are running.");
            return;
        }
        self.voice.speak("The following applications are running:");
        for name in names.iter().take(20) {
            self.voice.speak(name);
        }
        if names.len() > 20 {
            self.voice.speak("and more.");
        }
    }

    // --- Document editing ---

    fn resting_mode(kind: EditorKind) -> SessionMode {
        match kind {
            EditorKind::Notepad => SessionMode::Notepad,
            EditorKind::Word => SessionMode::Word,
        }
    }

    fn open_editor(&mut self, kind: EditorKind, path: Option<&Path>) {
        match self.session.acquire_editor(self.editors.as_ref(), kind, path) {
            Ok(()) => {
                self.session.set_mode(Self::resting_mode(kind));
                match path {
                    Some(p) => self.voice.speak(&format!("Opened {}.", p.display())),
                    None => self.voice.speak(&format!("Opening {kind}.")),
                }
            }
            Err(e) => {
                self.voice.speak(&format!("Sorry, I couldn't open {kind}. {e}"));
            }
        }
    }

    fn open_editor_file(&mut self, kind: EditorKind) {
        let spoken = self.listen(Some("Tell me the file name you want to open."));
        if spoken.is_empty() {
            self.voice.speak("No file name provided.");
            return;
        }
        let filename = normalize_filename(&spoken, kind.extension());
        self.open_editor(kind, Some(Path::new(&filename)));
    }

    fn open_notes(&mut self) {
        match self.procs.open_app("notes") {
            Ok(handle) => {
                self.session.track_process("notes", handle);
                self.session.set_mode(SessionMode::Notes);
                self.voice.speak("Opening Notes.");
            }
            Err(e) => {
                self.voice.speak(&format!("Sorry, I couldn't open Notes. {e}"));
            }
        }
    }

    /// Blocking dictation sub-loop. Owns input handling until the sentinel
    /// phrase "stop writing"; no other command is processed while it runs.
    fn dictate(&mut self, kind: EditorKind) {
        // A live editor of another kind must not receive this dictation
        if self.session.editor_kind() != Some(kind) {
            if let Err(e) = self.session.acquire_editor(self.editors.as_ref(), kind, None) {
                self.voice
                    .speak(&format!("Could not open {kind} to start the writing session. {e}"));
                return;
            }
        }
        let interactive = match kind {
            EditorKind::Notepad => SessionMode::InteractiveNotepad,
            EditorKind::Word => SessionMode::InteractiveWord,
        };
        self.session.set_mode(interactive);
        self.voice
            .speak("Starting the writing session. What should I write? Say 'stop writing' to end.");

        loop {
            let text = self.listen(None);
            if text.is_empty() {
                self.voice.speak("Didn't catch that. Say 'stop writing' to end.");
                continue;
            }
            if text.contains("stop writing") {
                self.voice.speak("Ending the writing session.");
                break;
            }
            let result = self
                .session
                .editor()
                .map(|editor| editor.type_text(&format!("{text}\n")));
            match result {
                Some(Ok(())) => {}
                Some(Err(e)) => self.voice.speak(&format!("Error writing text: {e}")),
                None => {
                    self.voice.speak("The editor is no longer open.");
                    break;
                }
            }
        }
        self.session.set_mode(Self::resting_mode(kind));
    }

    fn write_text(&mut self) {
        let text = self.listen(Some("What should I write?"));
        if text.is_empty() {
            self.voice.speak("No text provided to write.");
            return;
        }
        let result = self.session.editor().map(|editor| editor.type_text(&text));
        match result {
            Some(Ok(())) => self.voice.speak("Written successfully."),
            Some(Err(e)) => self.voice.speak(&format!("Error writing text: {e}")),
            None => self.voice.speak("No active writing application recognized."),
        }
    }

    fn save_document(&mut self) {
        let spoken = self.listen(Some("What name should I save the file as?"));
        if spoken.is_empty() {
            self.voice.speak("No file name provided.");
            return;
        }
        let extension = match self.session.mode() {
            SessionMode::Word | SessionMode::InteractiveWord => "docx",
            _ => "txt",
        };
        let filename = normalize_filename(&spoken, extension);
        let result = self.session.editor().map(|editor| editor.save_as(&filename));
        match result {
            Some(Ok(())) => self.voice.speak(&format!("File saved as {filename}.")),
            Some(Err(e)) => self.voice.speak(&format!("Error saving the document: {e}")),
            None => self.voice.speak("Nothing to save in the current mode."),
        }
    }

    fn close_editor(&mut self, kind: EditorKind) {
        match self.session.release_editor() {
            Ok(true) => self.voice.speak(&format!("{kind} closed.")),
            Ok(false) => self.voice.speak(&format!("{kind} is not open.")),
            Err(e) => self.voice.speak(&format!("Error closing {kind}: {e}")),
        }
        self.session.set_mode(SessionMode::Idle);
    }

    // --- Reminders ---

    fn set_reminder(&mut self) {
        let time_input = self.listen(Some("When should I remind you?"));
        if time_input.is_empty() {
            self.voice.speak("No time provided for the reminder.");
            return;
        }
        let now = Local::now().naive_local();
        let fire_at = match parse_reminder_time(&time_input, now) {
            Ok(fire_at) => fire_at,
            Err(e) => {
                self.voice.speak(&format!("Sorry, I couldn't understand the time. {e}"));
                return;
            }
        };
        let message = self.listen(Some("What do you want me to remind you?"));
        if message.is_empty() {
            self.voice.speak("No message provided for the reminder.");
            return;
        }
        self.voice
            .speak(&format!("Setting your reminder for {}", format_fire_time(fire_at)));
        let _ = self.event_tx.send(SessionEvent::ReminderScheduled { fire_at });
        self.tasks
            .add_reminder(fire_at, message, Arc::clone(&self.voice));
    }

    // --- Browser ---

    fn open_browser(&mut self, kind: BrowserKind) {
        if self.session.browser_open() {
            self.voice
                .speak("A browser is already open. Closing the current one.");
        }
        match self.session.acquire_browser(self.browsers.as_ref(), kind) {
            Ok(()) => {
                self.session.set_mode(SessionMode::BrowserOpen);
                self.voice.speak(&format!("Opening {kind}."));
            }
            Err(e) => {
                self.voice.speak(&format!("Failed to open the browser. {e}"));
            }
        }
    }

    fn close_browser(&mut self) {
        let released = match self.session.release_browser() {
            Ok(true) => {
                self.voice.speak("Browser closed.");
                true
            }
            Ok(false) => {
                self.voice.speak("No browser is currently open.");
                false
            }
            Err(e) => {
                self.voice.speak(&format!("Error closing the browser: {e}"));
                true
            }
        };
        if released && self.session.mode() == SessionMode::BrowserOpen {
            self.session.set_mode(SessionMode::Idle);
        }
    }

    fn search_for(&mut self, topic: &str) {
        self.voice.speak(&format!("Searching for {topic} on Google."));
        let url = format!("https://www.google.com/search?q={}", query_encode(topic));
        let result = self.session.browser().map(|b| b.navigate(&url));
        match result {
            Some(Ok(())) => {}
            Some(Err(e)) => self.voice.speak(&format!("An error occurred during search: {e}")),
            None => self.voice.speak("No browser is currently open."),
        }
    }

    /// Navigate to a YouTube page; an empty path is the home page
    fn youtube_page(&mut self, path: &str, announcement: &str) {
        self.voice.speak(announcement);
        let url = format!("{YOUTUBE_URL}{path}");
        let result = self.session.browser().map(|b| b.navigate(&url));
        match result {
            Some(Ok(())) => {}
            Some(Err(e)) => self.voice.speak(&format!("Could not open the page: {e}")),
            None => self.voice.speak("No browser is currently open."),
        }
    }

    /// Player control taps: space toggles play/pause, shifted `N`/`P` move
    /// through the playlist
    fn tap_video_key(&mut self, key: char, announcement: &str) {
        self.voice.speak(announcement);
        let result = self.session.browser().map(|b| b.press_key(key));
        match result {
            Some(Ok(())) => {}
            Some(Err(e)) => self.voice.speak(&format!("Could not control the video: {e}")),
            None => self.voice.speak("No browser is currently open."),
        }
    }

    fn search_youtube(&mut self, query: &str) {
        self.voice.speak(&format!("Searching YouTube for {query}."));
        let url = format!("{YOUTUBE_URL}results?search_query={}", query_encode(query));
        let navigated = self.session.browser().map(|b| b.navigate(&url));
        match navigated {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                self.voice.speak(&format!("An error occurred during the search: {e}"));
                return;
            }
            None => {
                self.voice.speak("No browser is currently open.");
                return;
            }
        }
        self.voice.speak("Attempting to open the first video.");
        let clicked = self.session.browser().map(|b| b.find_and_click(query));
        match clicked {
            Some(Ok(true)) => self.voice.speak("Playing the first video."),
            Some(Ok(false)) => self.voice.speak("Could not find a matching video."),
            Some(Err(e)) => self.voice.speak(&format!("Could not open the video: {e}")),
            None => {}
        }
    }

    fn scroll(&mut self, pixels: i64) {
        if pixels >= 0 {
            self.voice.speak("Scrolling down.");
        } else {
            self.voice.speak("Scrolling up.");
        }
        let result = self.session.browser().map(|b| b.scroll_by(pixels));
        match result {
            Some(Ok(())) => {}
            Some(Err(e)) => self.voice.speak(&format!("An error occurred while scrolling: {e}")),
            None => self.voice.speak("No browser is currently open."),
        }
    }

    fn click_link(&mut self, text: &str) {
        self.voice
            .speak(&format!("Trying to click on a link containing '{text}'."));
        let result = self.session.browser().map(|b| b.find_and_click(text));
        match result {
            Some(Ok(true)) => self.voice.speak("Clicked the link."),
            Some(Ok(false)) => self.voice.speak(&format!("Link containing '{text}' not found.")),
            Some(Err(e)) => self.voice.speak(&format!("An error occurred while clicking: {e}")),
            None => self.voice.speak("No browser is currently open."),
        }
    }

    fn go_back(&mut self) {
        self.voice.speak("Going back.");
        let result = self.session.browser().map(|b| b.back());
        match result {
            Some(Ok(())) => {}
            Some(Err(e)) => self.voice.speak(&format!("An error occurred while going back: {e}")),
            None => self.voice.speak("No browser is currently open."),
        }
    }

    fn read_page(&mut self) {
        let result = self.session.browser().map(|b| b.visible_text());
        match result {
            Some(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    self.voice.speak("The page has no visible text.");
                } else {
                    self.voice.speak(text);
                }
            }
            Some(Err(e)) => self.voice.speak(&format!("An error occurred while reading: {e}")),
            None => self.voice.speak("No browser is currently open."),
        }
    }

    /// Seek the active video: one key press per ten seconds, `l` forward
    /// and `j` backward, the way the player maps its shortcuts
    fn seek(&mut self, seconds: u64, forward: bool) {
        if forward {
            self.voice.speak(&format!("Forwarding {seconds} seconds."));
        } else {
            self.voice.speak(&format!("Rewinding {seconds} seconds."));
        }
        let key = if forward { 'l' } else { 'j' };
        let presses = seconds / 10;
        for _ in 0..presses {
            let result = self.session.browser().map(|b| b.press_key(key));
            match result {
                Some(Ok(())) => {}
                Some(Err(e)) => {
                    self.voice.speak(&format!("An error occurred while seeking: {e}"));
                    return;
                }
                None => {
                    self.voice.speak("No browser is currently open.");
                    return;
                }
            }
        }
    }

    // --- Stopwatch ---

    fn start_stopwatch(&mut self) {
        if self.tasks.stopwatch.start(&self.voice) {
            let _ = self.event_tx.send(SessionEvent::StopwatchStarted);
            self.session.set_mode(SessionMode::StopwatchRunning);
        }
    }

    async fn stop_stopwatch(&mut self) {
        if let Some(elapsed_secs) = self.tasks.stopwatch.stop(&self.voice).await {
            let _ = self
                .event_tx
                .send(SessionEvent::StopwatchStopped { elapsed_secs });
            if self.session.mode() == SessionMode::StopwatchRunning {
                self.session.set_mode(SessionMode::Idle);
            }
        }
    }
}
