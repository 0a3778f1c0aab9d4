//! Ordered intent rule table
//!
//! Routing is a pure function of the table, the utterance, and the current
//! session mode: the first rule whose trigger phrase is contained in the
//! utterance, whose negative phrases are all absent, and whose mode gate
//! admits the current mode wins. Table order is significant — specific
//! phrases sit above the generic "open <app>"/"close <app>" catch-alls.

use crate::collab::BrowserKind;
use crate::session::SessionMode;

use super::args::extract_seconds;

/// A fully routed handler invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Shutdown,
    OpenApp { name: String },
    CloseApp { name: String },
    ListTrackedApps,
    ListRunningApps,
    OpenNotepad,
    OpenNotepadFile,
    OpenWord,
    OpenWordFile,
    OpenNotes,
    DictateToNotepad,
    DictateToWord,
    WriteText,
    SaveDocument,
    CloseNotepad,
    CloseWord,
    SetReminder,
    OpenBrowser { kind: BrowserKind },
    SearchFor { topic: String },
    OpenYoutube,
    SearchYoutube { query: String },
    YoutubeHistory,
    YoutubeSubscriptions,
    YoutubeHome,
    PlayPauseVideo,
    NextVideo,
    PreviousVideo,
    ScrollDown,
    ScrollUp,
    ClickLink { text: String },
    GoBack,
    ReadPage,
    SeekForward { seconds: u64 },
    SeekBackward { seconds: u64 },
    CloseBrowser,
    StartStopwatch,
    StopStopwatch,
    QueryStopwatch,
}

/// Routing outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// A rule matched and its arguments were extracted
    Command(Command),
    /// A rule matched but its required free-text argument was empty;
    /// the clarification is spoken and nothing else happens
    MissingArgument { clarification: &'static str },
    /// No rule matched
    Unrecognized,
}

/// One entry of the rule table
struct Rule {
    /// Any contained trigger phrase activates the rule
    triggers: &'static [&'static str],
    /// Phrases whose presence disqualifies the rule
    excludes: &'static [&'static str],
    /// Modes the rule is valid in; empty means any mode
    gate: &'static [SessionMode],
    /// Build the command from (remainder after trigger removal, utterance)
    build: fn(&str, &str) -> Routed,
}

const DOCUMENT_MODES: &[SessionMode] = &[
    SessionMode::Notepad,
    SessionMode::Word,
    SessionMode::InteractiveNotepad,
    SessionMode::InteractiveWord,
];
const NOTEPAD_MODES: &[SessionMode] = &[SessionMode::Notepad, SessionMode::InteractiveNotepad];
const WORD_MODES: &[SessionMode] = &[SessionMode::Word, SessionMode::InteractiveWord];
const BROWSER_MODES: &[SessionMode] = &[SessionMode::BrowserOpen];
const ANY: &[SessionMode] = &[];
const NONE: &[&str] = &[];

fn command(c: Command) -> Routed {
    Routed::Command(c)
}

/// The table. Order is a total, significant ordering: stopwatch phrases
/// precede the bare "stop" shutdown trigger, "go backward" precedes
/// "go back", file-opening phrases precede their plain counterparts, and
/// the generic app catch-alls come last.
static RULES: &[Rule] = &[
    Rule {
        triggers: &["start stopwatch", "start the stopwatch"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::StartStopwatch),
    },
    Rule {
        triggers: &["stop stopwatch", "stop the stopwatch"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::StopStopwatch),
    },
    Rule {
        triggers: &["tell me the time", "what is the time", "what time is it"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::QueryStopwatch),
    },
    Rule {
        triggers: &["exit", "quit", "goodbye", "shut down", "stop"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::Shutdown),
    },
    Rule {
        triggers: &["set a reminder", "set reminder", "remind me"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::SetReminder),
    },
    Rule {
        triggers: &["write text in notepad"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::DictateToNotepad),
    },
    Rule {
        triggers: &["write text in word"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::DictateToWord),
    },
    Rule {
        triggers: &["write text"],
        excludes: NONE,
        gate: DOCUMENT_MODES,
        build: |_, _| command(Command::WriteText),
    },
    Rule {
        triggers: &["save document", "save the document"],
        excludes: NONE,
        gate: DOCUMENT_MODES,
        build: |_, _| command(Command::SaveDocument),
    },
    Rule {
        triggers: &["open text file"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::OpenNotepadFile),
    },
    Rule {
        triggers: &["open word file"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::OpenWordFile),
    },
    Rule {
        triggers: &["open notepad"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::OpenNotepad),
    },
    Rule {
        triggers: &["open word"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::OpenWord),
    },
    Rule {
        triggers: &["open notes"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::OpenNotes),
    },
    Rule {
        triggers: &["close notepad"],
        excludes: NONE,
        gate: NOTEPAD_MODES,
        build: |_, _| command(Command::CloseNotepad),
    },
    Rule {
        triggers: &["close word"],
        excludes: NONE,
        gate: WORD_MODES,
        build: |_, _| command(Command::CloseWord),
    },
    Rule {
        triggers: &["search youtube for"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |remainder, _| {
            if remainder.is_empty() {
                Routed::MissingArgument {
                    clarification: "Please specify what to search for on YouTube.",
                }
            } else {
                command(Command::SearchYoutube {
                    query: remainder.to_string(),
                })
            }
        },
    },
    // The feed pages must precede the plain "open youtube" trigger
    Rule {
        triggers: &["open youtube history"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::YoutubeHistory),
    },
    Rule {
        triggers: &["open youtube subscriptions"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::YoutubeSubscriptions),
    },
    Rule {
        triggers: &["go youtube home", "youtube home"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::YoutubeHome),
    },
    Rule {
        triggers: &["open youtube"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::OpenYoutube),
    },
    Rule {
        triggers: &["open browser"],
        excludes: NONE,
        gate: ANY,
        build: |remainder, _| {
            if remainder.is_empty() {
                return Routed::MissingArgument {
                    clarification: "Please specify which browser to open.",
                };
            }
            match BrowserKind::from_utterance(remainder) {
                Some(kind) => command(Command::OpenBrowser { kind }),
                None => Routed::MissingArgument {
                    clarification: "Browser not supported. Please say Chrome, Firefox, or Edge.",
                },
            }
        },
    },
    Rule {
        triggers: &["close browser"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::CloseBrowser),
    },
    Rule {
        triggers: &["search for"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |remainder, _| {
            if remainder.is_empty() {
                Routed::MissingArgument {
                    clarification: "Please specify what you want to search for.",
                }
            } else {
                command(Command::SearchFor {
                    topic: remainder.to_string(),
                })
            }
        },
    },
    Rule {
        triggers: &["scroll down"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::ScrollDown),
    },
    Rule {
        triggers: &["scroll up"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::ScrollUp),
    },
    Rule {
        triggers: &["read links", "read the page"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::ReadPage),
    },
    Rule {
        triggers: &["go forward", "forward video"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, utterance| {
            command(Command::SeekForward {
                seconds: extract_seconds(utterance),
            })
        },
    },
    // "go backward" must precede "go back": the shorter phrase is contained
    // in the longer one
    Rule {
        triggers: &["go backward", "rewind video"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, utterance| {
            command(Command::SeekBackward {
                seconds: extract_seconds(utterance),
            })
        },
    },
    Rule {
        triggers: &["go back"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::GoBack),
    },
    Rule {
        triggers: &["next video"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::NextVideo),
    },
    Rule {
        triggers: &["previous video"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::PreviousVideo),
    },
    Rule {
        triggers: &["click"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |remainder, _| {
            if remainder.is_empty() {
                Routed::MissingArgument {
                    clarification: "Please specify the text of the link to click.",
                }
            } else {
                command(Command::ClickLink {
                    text: remainder.to_string(),
                })
            }
        },
    },
    // After "click" so "click play button" stays a click
    Rule {
        triggers: &["play video", "pause video", "play", "pause"],
        excludes: NONE,
        gate: BROWSER_MODES,
        build: |_, _| command(Command::PlayPauseVideo),
    },
    Rule {
        triggers: &["list open apps"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::ListTrackedApps),
    },
    Rule {
        triggers: &["track open apps", "list running apps"],
        excludes: NONE,
        gate: ANY,
        build: |_, _| command(Command::ListRunningApps),
    },
    // Generic catch-alls, disambiguated by negative phrases
    Rule {
        triggers: &["open "],
        excludes: &["browser", "notepad", "word", "notes", "youtube", "file"],
        gate: ANY,
        build: |remainder, _| {
            if remainder.is_empty() {
                Routed::MissingArgument {
                    clarification: "Please specify which application to open.",
                }
            } else {
                command(Command::OpenApp {
                    name: remainder.to_string(),
                })
            }
        },
    },
    Rule {
        triggers: &["close "],
        excludes: &["browser", "notepad", "word"],
        gate: ANY,
        build: |remainder, _| {
            if remainder.is_empty() {
                Routed::MissingArgument {
                    clarification: "Please specify which application to close.",
                }
            } else {
                command(Command::CloseApp {
                    name: remainder.to_string(),
                })
            }
        },
    },
];

/// Route a normalized utterance against the current mode.
///
/// First matching rule in table order wins. Rules whose gate excludes the
/// current mode are skipped for this dispatch.
pub fn route(utterance: &str, mode: SessionMode) -> Routed {
    for rule in RULES {
        if !rule.gate.is_empty() && !rule.gate.contains(&mode) {
            continue;
        }
        if rule.excludes.iter().any(|e| utterance.contains(e)) {
            continue;
        }
        for trigger in rule.triggers {
            if utterance.contains(trigger) {
                let remainder = utterance.replacen(trigger, "", 1);
                return (rule.build)(remainder.trim(), utterance);
            }
        }
    }
    Routed::Unrecognized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_utterance_is_unrecognized() {
        assert_eq!(route("sing me a song", SessionMode::Idle), Routed::Unrecognized);
        assert_eq!(route("", SessionMode::Idle), Routed::Unrecognized);
    }

    #[test]
    fn test_earlier_rule_wins_on_double_match() {
        // "open word file" also contains "open word"; the file rule is
        // earlier in the table and must win
        assert_eq!(
            route("open word file", SessionMode::Idle),
            Routed::Command(Command::OpenWordFile)
        );
        // "go backward" also contains "go back"
        assert_eq!(
            route("go backward", SessionMode::BrowserOpen),
            Routed::Command(Command::SeekBackward { seconds: 10 })
        );
    }

    #[test]
    fn test_stopwatch_phrases_not_swallowed_by_stop() {
        assert_eq!(
            route("stop the stopwatch", SessionMode::StopwatchRunning),
            Routed::Command(Command::StopStopwatch)
        );
        assert_eq!(route("stop", SessionMode::Idle), Routed::Command(Command::Shutdown));
    }

    #[test]
    fn test_shutdown_phrases() {
        for phrase in ["exit", "quit now", "goodbye", "shut down please"] {
            assert_eq!(
                route(phrase, SessionMode::Idle),
                Routed::Command(Command::Shutdown),
                "phrase: {phrase}"
            );
        }
    }

    #[test]
    fn test_mode_gate_skips_rule() {
        assert_eq!(route("scroll down", SessionMode::Idle), Routed::Unrecognized);
        assert_eq!(
            route("scroll down", SessionMode::BrowserOpen),
            Routed::Command(Command::ScrollDown)
        );
        assert_eq!(route("write text", SessionMode::Idle), Routed::Unrecognized);
        assert_eq!(
            route("write text", SessionMode::Word),
            Routed::Command(Command::WriteText)
        );
    }

    #[test]
    fn test_open_catch_all_with_negative_phrases() {
        assert_eq!(
            route("open spotify", SessionMode::Idle),
            Routed::Command(Command::OpenApp {
                name: "spotify".to_string()
            })
        );
        // "notepad" is a negative phrase of the catch-all and routes to the
        // dedicated rule instead
        assert_eq!(
            route("open notepad", SessionMode::Idle),
            Routed::Command(Command::OpenNotepad)
        );
    }

    #[test]
    fn test_missing_argument_yields_clarification() {
        let routed = route("open browser", SessionMode::Idle);
        assert!(matches!(routed, Routed::MissingArgument { .. }));

        let routed = route("click", SessionMode::BrowserOpen);
        assert!(matches!(routed, Routed::MissingArgument { .. }));
    }

    #[test]
    fn test_unsupported_browser_is_clarified() {
        let routed = route("open browser safari", SessionMode::Idle);
        assert!(matches!(routed, Routed::MissingArgument { .. }));
        assert_eq!(
            route("open browser chrome", SessionMode::Idle),
            Routed::Command(Command::OpenBrowser {
                kind: BrowserKind::Chrome
            })
        );
    }

    #[test]
    fn test_seek_argument_extraction() {
        assert_eq!(
            route("go forward 2 minutes", SessionMode::BrowserOpen),
            Routed::Command(Command::SeekForward { seconds: 120 })
        );
        assert_eq!(
            route("go forward 15", SessionMode::BrowserOpen),
            Routed::Command(Command::SeekForward { seconds: 15 })
        );
        assert_eq!(
            route("go forward", SessionMode::BrowserOpen),
            Routed::Command(Command::SeekForward { seconds: 10 })
        );
    }

    #[test]
    fn test_click_extracts_link_text() {
        assert_eq!(
            route("click sign in", SessionMode::BrowserOpen),
            Routed::Command(Command::ClickLink {
                text: "sign in".to_string()
            })
        );
    }

    #[test]
    fn test_youtube_feed_pages_precede_plain_open() {
        assert_eq!(
            route("open youtube history", SessionMode::BrowserOpen),
            Routed::Command(Command::YoutubeHistory)
        );
        assert_eq!(
            route("open youtube subscriptions", SessionMode::BrowserOpen),
            Routed::Command(Command::YoutubeSubscriptions)
        );
        assert_eq!(
            route("go youtube home", SessionMode::BrowserOpen),
            Routed::Command(Command::YoutubeHome)
        );
        assert_eq!(
            route("open youtube", SessionMode::BrowserOpen),
            Routed::Command(Command::OpenYoutube)
        );
    }

    #[test]
    fn test_video_control_phrases() {
        assert_eq!(
            route("next video", SessionMode::BrowserOpen),
            Routed::Command(Command::NextVideo)
        );
        assert_eq!(
            route("previous video", SessionMode::BrowserOpen),
            Routed::Command(Command::PreviousVideo)
        );
        assert_eq!(
            route("pause video", SessionMode::BrowserOpen),
            Routed::Command(Command::PlayPauseVideo)
        );
        // "click play button" is a click, not a play/pause toggle
        assert_eq!(
            route("click play button", SessionMode::BrowserOpen),
            Routed::Command(Command::ClickLink {
                text: "play button".to_string()
            })
        );
        // A search query containing "play" stays a search
        assert_eq!(
            route("search youtube for coldplay", SessionMode::BrowserOpen),
            Routed::Command(Command::SearchYoutube {
                query: "coldplay".to_string()
            })
        );
    }

    #[test]
    fn test_dictation_rules_route_in_any_mode() {
        assert_eq!(
            route("write text in notepad", SessionMode::Idle),
            Routed::Command(Command::DictateToNotepad)
        );
        assert_eq!(
            route("write text in word", SessionMode::Notes),
            Routed::Command(Command::DictateToWord)
        );
    }

    #[test]
    fn test_routing_is_pure() {
        // Same inputs, same outcome, no hidden state
        for _ in 0..3 {
            assert_eq!(
                route("open notepad", SessionMode::Idle),
                Routed::Command(Command::OpenNotepad)
            );
        }
    }
}
