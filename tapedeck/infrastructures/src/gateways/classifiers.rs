use ::use_cases::gateways::LineClassifier;
use ::use_cases::models::descriptors::LineKind;
use ::use_cases::models::events::DiagnosticLevel;

use crate::utils::aliases::Fallible;
use crate::utils::aliases::MaybeOwnedString;

macro_rules! lazy_regex {
    ($pattern:expr) => {
        ::once_cell::sync::Lazy::new(|| ::regex::Regex::new($pattern).unwrap())
    };
}

/// What yt-dlp prints when it opens the file for a new track.
pub const TRACK_STARTED_PREFIX: &str = "[download] Destination:";

#[derive(Debug, Clone, ::derive_new::new)]
pub struct PrefixLineClassifier {
    #[new(into)]
    track_started_prefix: MaybeOwnedString,
}

impl Default for PrefixLineClassifier {
    fn default() -> Self {
        Self::new(TRACK_STARTED_PREFIX)
    }
}

impl LineClassifier for PrefixLineClassifier {
    fn classify(&self, line: &str) -> LineKind {
        if line.starts_with(&*self.track_started_prefix) {
            LineKind::TrackStarted
        } else {
            classify_diagnostic(line)
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegexLineClassifier {
    track_started: ::regex::Regex,
}

impl RegexLineClassifier {
    pub fn new(pattern: &str) -> Fallible<Self> {
        let track_started = ::regex::Regex::new(pattern)?;

        Ok(Self { track_started })
    }
}

impl LineClassifier for RegexLineClassifier {
    fn classify(&self, line: &str) -> LineKind {
        if self.track_started.is_match(line) {
            LineKind::TrackStarted
        } else {
            classify_diagnostic(line)
        }
    }
}

fn classify_diagnostic(line: &str) -> LineKind {
    static REGEX: ::once_cell::sync::Lazy<::regex::Regex> = lazy_regex!(r"^(?P<level>WARNING|ERROR):");

    match REGEX.captures(line).map(|captures| captures["level"].to_owned()).as_deref() {
        Some("WARNING") => LineKind::Diagnostic(DiagnosticLevel::Warning),
        Some("ERROR") => LineKind::Diagnostic(DiagnosticLevel::Error),
        _ => LineKind::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_lines_start_tracks() {
        let classifier = PrefixLineClassifier::default();

        assert_eq!(classifier.classify("[download] Destination: downloads/Song.webm"), LineKind::TrackStarted);
        assert_eq!(classifier.classify("[ExtractAudio] Destination: downloads/Song.mp3"), LineKind::Plain);
        assert_eq!(classifier.classify("  [download] Destination: indented"), LineKind::Plain);
        assert_eq!(classifier.classify("[download]  42.0% of 3.21MiB"), LineKind::Plain);
    }

    #[test]
    fn diagnostics_are_recognized_by_level() {
        let classifier = PrefixLineClassifier::default();

        assert_eq!(
            classifier.classify("ERROR: [youtube] abc: Video unavailable"),
            LineKind::Diagnostic(DiagnosticLevel::Error)
        );
        assert_eq!(
            classifier.classify("WARNING: [youtube] Falling back to generic n function search"),
            LineKind::Diagnostic(DiagnosticLevel::Warning)
        );
        assert_eq!(classifier.classify("info: ERROR: not at start"), LineKind::Plain);
    }

    #[test]
    fn custom_prefix_replaces_the_default() {
        let classifier = PrefixLineClassifier::new("[video-started]");

        assert_eq!(classifier.classify("[video-started]abc"), LineKind::TrackStarted);
        assert_eq!(classifier.classify("[download] Destination: x.webm"), LineKind::Plain);
    }

    #[test]
    fn regex_rule_matches_anywhere() {
        let classifier = RegexLineClassifier::new(r"\[(download|ExtractAudio)\] Destination:").unwrap();

        assert_eq!(classifier.classify("[ExtractAudio] Destination: a.mp3"), LineKind::TrackStarted);
        assert_eq!(classifier.classify("ERROR: boom"), LineKind::Diagnostic(DiagnosticLevel::Error));
        assert!(RegexLineClassifier::new("(unclosed").is_err());
    }
}
