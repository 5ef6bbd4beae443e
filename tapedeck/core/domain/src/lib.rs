pub(crate) mod utils;

pub use crate::utils::aliases::MaybeOwnedString;
pub use crate::utils::aliases::MaybeOwnedVec;

/// Substrings that mark a URL as belonging to a supported video host.
pub const RECOGNIZED_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistUrl(MaybeOwnedString);

impl PlaylistUrl {
    pub fn parse<Url>(url: Url) -> Result<Self, UrlValidationError>
    where
        Url: AsRef<str>,
    {
        let url = url.as_ref().trim();

        if url.is_empty() {
            return Err(UrlValidationError::Empty);
        }

        if !RECOGNIZED_HOSTS.iter().any(|host| url.contains(host)) {
            return Err(UrlValidationError::UnrecognizedHost(url.to_owned()));
        }

        Ok(Self(url.to_owned().into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ::std::ops::Deref for PlaylistUrl {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ::std::fmt::Display for PlaylistUrl {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ::thiserror::Error)]
pub enum UrlValidationError {
    #[error("Please enter a valid playlist URL.")]
    Empty,

    #[error("`{0}` is not a recognized playlist URL (expected one of: {hosts})", hosts = RECOGNIZED_HOSTS.join(", "))]
    UnrecognizedHost(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AudioQuality {
    Kbps128,
    #[default]
    Kbps192,
    Kbps320,
}

impl AudioQuality {
    pub const ALL: [Self; 3] = [Self::Kbps128, Self::Kbps192, Self::Kbps320];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kbps128 => "128K",
            Self::Kbps192 => "192K",
            Self::Kbps320 => "320K",
        }
    }
}

impl ::std::fmt::Display for AudioQuality {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

impl ::std::str::FromStr for AudioQuality {
    type Err = AudioQualityParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let trimmed = string.trim();
        let normalized = trimmed
            .strip_suffix(['K', 'k'])
            .unwrap_or(trimmed);

        match normalized {
            "128" => Ok(Self::Kbps128),
            "192" => Ok(Self::Kbps192),
            "320" => Ok(Self::Kbps320),
            _ => Err(AudioQualityParseError(string.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ::thiserror::Error)]
#[error("`{0}` is not a supported audio quality (expected 128K, 192K or 320K)")]
pub struct AudioQualityParseError(String);

#[derive(Debug, Clone, ::bon::Builder)]
#[builder(on(_, into))]
pub struct PlaylistEntry {
    pub id: Option<EntryId>,
    pub url: Option<MaybeOwnedString>,

    pub metadata: EntryMetadata,

    #[builder(default)]
    pub attributes: MaybeOwnedVec<EntryAttribute>,
}

pub type EntryId = MaybeOwnedString;

#[derive(Debug, Clone, Default, ::bon::Builder)]
#[builder(on(_, into))]
pub struct EntryMetadata {
    pub title: Option<MaybeOwnedString>,
    pub uploader: Option<MaybeOwnedString>,
    pub duration: Option<::std::time::Duration>,
}

/// Any field of the tool's record that is not modelled above, kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAttribute {
    pub key: MaybeOwnedString,
    pub value: MaybeOwnedString,
}

#[derive(Debug, Clone, ::bon::Builder)]
#[builder(on(_, into))]
pub struct Playlist {
    pub url: PlaylistUrl,
    pub entries: MaybeOwnedVec<PlaylistEntry>,
}

impl Playlist {
    pub fn total_tracks(&self) -> u64 {
        self.entries.len() as u64
    }
}

#[derive(Debug, Clone, ::bon::Builder)]
pub struct DownloadSession {
    pub url: PlaylistUrl,
    pub quality: AudioQuality,
    pub expected_tracks: u64,

    #[builder(skip)]
    completed_tracks: u64,
}

impl DownloadSession {
    pub fn completed_tracks(&self) -> u64 {
        self.completed_tracks
    }

    pub fn record_track_started(&mut self, completed_tracks: u64) {
        self.completed_tracks = self.completed_tracks.max(completed_tracks);
    }

    /// Fraction of the expected output seen so far, in `[0, 1]`.
    ///
    /// The tool's verbosity per track is unknown in advance, so the expected line count is
    /// `expected_tracks * lines_per_track`.
    pub fn progress(&self, line_index: u64, lines_per_track: u64) -> f64 {
        let expected_lines = self.expected_tracks.saturating_mul(lines_per_track);

        if expected_lines == 0 {
            return 0.0;
        }

        (line_index as f64 / expected_lines as f64).clamp(0.0, 1.0)
    }
}
