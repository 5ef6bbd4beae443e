pub mod events {
    use ::domain::DownloadSession;
    use ::domain::Playlist;
    use ::domain::PlaylistUrl;

    use crate::models::descriptors::ExitOutcome;
    use crate::models::descriptors::LineKind;
    use crate::utils::aliases::MaybeOwnedPath;
    use crate::utils::aliases::MaybeOwnedString;

    #[derive(Debug, Clone)]
    pub struct PlaylistAnalysisStartedEvent {
        pub url: PlaylistUrl,
    }

    #[derive(Debug, Clone)]
    pub struct PlaylistAnalyzedEvent {
        pub playlist: Playlist,
    }

    /// Emitted by a [`crate::gateways::PlaylistDownloader`], in output order.
    #[derive(Debug, Clone)]
    pub enum TrackDownloadEvent {
        LineEmitted(LineEmittedEvent),
        TrackStarted(TrackStartedEvent),
        Finished(DownloadFinishedEvent),
        Failed(DownloadFailedEvent),
    }

    #[derive(Debug, Clone, ::bon::Builder)]
    #[builder(on(MaybeOwnedString, into))]
    pub struct LineEmittedEvent {
        pub index: u64,
        pub line: MaybeOwnedString,
        pub kind: LineKind,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TrackStartedEvent {
        pub completed_tracks: u64,
    }

    #[derive(Debug, Clone, ::bon::Builder)]
    #[builder(on(MaybeOwnedPath, into))]
    pub struct DownloadFinishedEvent {
        pub completed_tracks: u64,
        pub exit: ExitOutcome,
        pub directory: MaybeOwnedPath,
    }

    #[derive(Debug, Clone)]
    pub struct DownloadFailedEvent {
        pub message: MaybeOwnedString,
    }

    #[derive(Debug, Clone)]
    pub struct DownloadStartedEvent {
        pub session: DownloadSession,
        pub started_at: ::std::time::SystemTime,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct DownloadProgressUpdatedEvent {
        pub fraction: f64,
    }

    #[derive(Debug, Clone)]
    pub struct DownloadCompletedEvent {
        pub completed_tracks: u64,
        pub expected_tracks: u64,
        pub directory: MaybeOwnedPath,
    }

    #[derive(Debug, Clone)]
    pub struct ToolCheckedEvent {
        pub version: MaybeOwnedString,
    }

    #[derive(Debug, Clone)]
    pub struct DiagnosticEvent {
        pub level: DiagnosticLevel,
        pub message: MaybeOwnedString,
    }

    impl DiagnosticEvent {
        pub fn warning(message: impl Into<MaybeOwnedString>) -> Self {
            Self { level: DiagnosticLevel::Warning, message: message.into() }
        }

        pub fn error(message: impl Into<MaybeOwnedString>) -> Self {
            Self { level: DiagnosticLevel::Error, message: message.into() }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DiagnosticLevel {
        Warning,
        Error,
    }
}

pub mod descriptors {
    use ::domain::PlaylistEntry;

    use crate::models::events::DiagnosticLevel;
    use crate::utils::aliases::MaybeOwnedString;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LineKind {
        TrackStarted,
        Diagnostic(DiagnosticLevel),
        Plain,
    }

    #[derive(Debug, Clone, ::bon::Builder)]
    #[builder(on(MaybeOwnedString, into))]
    pub struct PlaylistInspection {
        pub entries: Vec<PlaylistEntry>,
        #[builder(default)]
        pub diagnostics: MaybeOwnedString,
        pub exit: ExitOutcome,
    }

    /// `code` is `None` when the process was terminated by a signal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExitOutcome {
        pub code: Option<i32>,
    }

    impl ExitOutcome {
        pub fn is_success(&self) -> bool {
            self.code == Some(0)
        }
    }

    impl From<::std::process::ExitStatus> for ExitOutcome {
        fn from(status: ::std::process::ExitStatus) -> Self {
            Self { code: status.code() }
        }
    }

    impl ::std::fmt::Display for ExitOutcome {
        fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
            match self.code {
                Some(code) => write!(formatter, "exit code {}", code),
                None => write!(formatter, "a signal"),
            }
        }
    }
}
