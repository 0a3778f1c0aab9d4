//! Argument extraction helpers
//!
//! Free-text arguments are whatever is left of the utterance once the
//! trigger phrase is removed; numeric arguments are scanned out of the
//! token stream with a fixed default.

/// Seconds assumed when a seek command carries no usable number
pub const DEFAULT_SEEK_SECS: u64 = 10;

/// Extract a duration in seconds from a command.
///
/// The first purely numeric token is the magnitude. A following token
/// containing "minute" multiplies by 60, one containing "second" keeps the
/// value as-is, and a trailing bare number is taken as seconds. A number
/// followed by some other word is skipped and scanning continues. No usable
/// number yields [`DEFAULT_SEEK_SECS`].
pub fn extract_seconds(utterance: &str) -> u64 {
    let words: Vec<&str> = utterance.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        let Ok(n) = word.parse::<u64>() else {
            continue;
        };
        match words.get(i + 1) {
            Some(next) if next.contains("minute") => return n * 60,
            Some(next) if next.contains("second") => return n,
            Some(next) if !next.chars().all(|c| c.is_alphabetic()) => return n,
            Some(_) => {}
            None => return n,
        }
    }
    DEFAULT_SEEK_SECS
}

/// Turn a spoken filename into one safe to pass to the editor: spaces
/// become underscores and the mode's extension is appended when missing.
pub fn normalize_filename(spoken: &str, extension: &str) -> String {
    let base = spoken.trim().replace(' ', "_");
    let suffix = format!(".{extension}");
    if base.ends_with(&suffix) {
        base
    } else {
        format!("{base}{suffix}")
    }
}

/// Encode a free-text query for use in a search URL
pub fn query_encode(topic: &str) -> String {
    topic.trim().replace(' ', "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_multiply() {
        assert_eq!(extract_seconds("go forward 2 minutes"), 120);
        assert_eq!(extract_seconds("go backward 1 minute"), 60);
    }

    #[test]
    fn test_explicit_seconds() {
        assert_eq!(extract_seconds("go forward 45 seconds"), 45);
    }

    #[test]
    fn test_trailing_bare_number_is_seconds() {
        assert_eq!(extract_seconds("go forward 15"), 15);
    }

    #[test]
    fn test_default_when_no_number() {
        assert_eq!(extract_seconds("go forward"), DEFAULT_SEEK_SECS);
    }

    #[test]
    fn test_number_followed_by_plain_word_is_skipped() {
        // Scanning continues past "10 please" and falls to the default
        assert_eq!(extract_seconds("go forward 10 please"), DEFAULT_SEEK_SECS);
    }

    #[test]
    fn test_first_numeric_token_wins() {
        assert_eq!(extract_seconds("go forward 10 20"), 10);
    }

    #[test]
    fn test_normalize_filename() {
        assert_eq!(normalize_filename("meeting notes", "txt"), "meeting_notes.txt");
        assert_eq!(normalize_filename("report.docx", "docx"), "report.docx");
        assert_eq!(normalize_filename("  draft ", "txt"), "draft.txt");
    }

    #[test]
    fn test_query_encode() {
        assert_eq!(query_encode("rust async book"), "rust+async+book");
    }
}
