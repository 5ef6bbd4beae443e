use ::async_trait::async_trait;
use ::use_cases::boundaries::Activate;
use ::use_cases::boundaries::Update;
use ::use_cases::models::descriptors::LineKind;
use ::use_cases::models::events::DiagnosticEvent;
use ::use_cases::models::events::DiagnosticLevel;
use ::use_cases::models::events::DownloadCompletedEvent;
use ::use_cases::models::events::DownloadProgressUpdatedEvent;
use ::use_cases::models::events::DownloadStartedEvent;
use ::use_cases::models::events::LineEmittedEvent;
use ::use_cases::models::events::PlaylistAnalysisStartedEvent;
use ::use_cases::models::events::PlaylistAnalyzedEvent;
use ::use_cases::models::events::ToolCheckedEvent;
use ::use_cases::models::events::TrackStartedEvent;

use crate::utils::aliases::Fallible;
use crate::utils::extensions::OptionExt;
use crate::utils::text::truncate;

macro_rules! lazy_progress_style {
    ($template:expr) => {
        ::once_cell::sync::Lazy::new(|| ::indicatif::ProgressStyle::with_template($template).unwrap())
    };
}

macro_rules! lazy_color {
    ($color:expr) => {
        ::once_cell::sync::Lazy::new(|| {
            use ::colored::Colorize as _;

            $color
        })
    };
}

pub const DEFAULT_PREVIEW_LIMIT: usize = 5;
pub const DEFAULT_LOG_WIDTH: usize = 80;

/// Resolution of the overall progress bar.
const PROGRESS_BAR_LENGTH: u64 = 1000;

/// Terminal rendering of every use case. Drawing is hidden until activated.
#[derive(::bon::Builder)]
pub struct AggregateView {
    #[builder(default = DEFAULT_PREVIEW_LIMIT)]
    preview_limit: usize,

    #[builder(default = DEFAULT_LOG_WIDTH)]
    log_width: usize,

    #[builder(skip = ::indicatif::MultiProgress::with_draw_target(::indicatif::ProgressDrawTarget::hidden()))]
    progress_bars: ::indicatif::MultiProgress,

    #[builder(skip)]
    spinner: ::tokio::sync::Mutex<Option<::indicatif::ProgressBar>>,

    #[builder(skip)]
    download_progress_bars: ::tokio::sync::Mutex<Option<DownloadProgressBars>>,
}

struct DownloadProgressBars {
    progress: ::indicatif::ProgressBar,
    status: ::indicatif::ProgressBar,
    counter: ::indicatif::ProgressBar,
}

impl AggregateView {
    fn remove(&self, progress_bar: ::indicatif::ProgressBar) {
        progress_bar.finish_and_clear();
        self.progress_bars.remove(&progress_bar);
    }
}

#[async_trait]
impl Activate for AggregateView {
    async fn activate(self: ::std::sync::Arc<Self>) -> Fallible<()> {
        self.progress_bars.set_draw_target(::indicatif::ProgressDrawTarget::stderr());

        Ok(())
    }

    async fn deactivate(self: ::std::sync::Arc<Self>) -> Fallible<()> {
        if let Some(spinner) = self.spinner.lock().await.take() {
            self.remove(spinner);
        }

        if let Some(DownloadProgressBars { progress, status, counter }) = self.download_progress_bars.lock().await.take() {
            self.remove(progress);
            self.remove(status);
            self.remove(counter);
        }

        self.progress_bars.set_draw_target(::indicatif::ProgressDrawTarget::hidden());

        Ok(())
    }
}

#[async_trait]
impl Update<PlaylistAnalysisStartedEvent> for AggregateView {
    async fn update(self: ::std::sync::Arc<Self>, event: &PlaylistAnalysisStartedEvent) -> Fallible<()> {
        static SPINNER_STYLE: ::once_cell::sync::Lazy<::indicatif::ProgressStyle> =
            lazy_progress_style!("{spinner} {msg}");

        let spinner = self.progress_bars
            .add(::indicatif::ProgressBar::new_spinner().with_style(SPINNER_STYLE.clone()));

        spinner.set_message(format!("Analyzing {}", event.url));
        spinner.enable_steady_tick(::std::time::Duration::from_millis(100));

        if let Some(previous) = self.spinner.lock().await.replace(spinner) {
            self.remove(previous);
        }

        Ok(())
    }
}

#[async_trait]
impl Update<PlaylistAnalyzedEvent> for AggregateView {
    async fn update(self: ::std::sync::Arc<Self>, event: &PlaylistAnalyzedEvent) -> Fallible<()> {
        use ::colored::Colorize as _;

        if let Some(spinner) = self.spinner.lock().await.take() {
            self.remove(spinner);
        }

        let PlaylistAnalyzedEvent { playlist } = event;

        // Failed analyses are explained by their diagnostic.
        if playlist.entries.is_empty() {
            return Ok(());
        }

        self.progress_bars
            .println(format!("✅ Found {} songs in the playlist.", playlist.total_tracks()).green().to_string())?;

        for entry in playlist.entries.iter().take(self.preview_limit) {
            let title = entry.metadata.title
                .as_deref()
                .map_or_else(|| NULL.clone(), |title| title.white().bold());
            let uploader = entry.metadata.uploader
                .as_deref()
                .map_or_else(|| NULL.clone(), |uploader| uploader.normal());

            self.progress_bars.println(format!("   {} - {}", title, uploader))?;
        }

        if let Some(remaining) = playlist.entries.len().checked_sub(self.preview_limit).filter(|&remaining| remaining > 0) {
            self.progress_bars.println(format!("   … and {} more", remaining).color(GRAY).to_string())?;
        }

        Ok(())
    }
}

#[async_trait]
impl Update<DownloadStartedEvent> for AggregateView {
    async fn update(self: ::std::sync::Arc<Self>, event: &DownloadStartedEvent) -> Fallible<()> {
        use ::colored::Colorize as _;

        static PROGRESS_BAR_STYLE: ::once_cell::sync::Lazy<::indicatif::ProgressStyle> =
            lazy_progress_style!("{bar:50} {percent:>3}%");
        static LINE_STYLE: ::once_cell::sync::Lazy<::indicatif::ProgressStyle> =
            lazy_progress_style!("{msg}");

        const TIMESTAMP: &[::time::format_description::BorrowedFormatItem<'_>] =
            ::time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");

        let DownloadStartedEvent { session, started_at } = event;

        let started_at = ::time::OffsetDateTime::from(*started_at).format(TIMESTAMP)?;

        self.progress_bars.println(
            format!(
                "📥 Starting download of {} songs at {} ({} MP3)",
                session.expected_tracks, started_at, session.quality,
            )
            .cyan()
            .to_string(),
        )?;

        let progress = self.progress_bars
            .add(::indicatif::ProgressBar::new(PROGRESS_BAR_LENGTH).with_style(PROGRESS_BAR_STYLE.clone()));
        let status = self.progress_bars
            .add(::indicatif::ProgressBar::no_length().with_style(LINE_STYLE.clone()));
        let counter = self.progress_bars
            .add(::indicatif::ProgressBar::no_length().with_style(LINE_STYLE.clone()));

        counter.set_message("🎵 Waiting for the first song");

        let bars = DownloadProgressBars { progress, status, counter };

        if let Some(DownloadProgressBars { progress, status, counter }) =
            self.download_progress_bars.lock().await.replace(bars)
        {
            self.remove(progress);
            self.remove(status);
            self.remove(counter);
        }

        Ok(())
    }
}

#[async_trait]
impl Update<LineEmittedEvent> for AggregateView {
    async fn update(self: ::std::sync::Arc<Self>, event: &LineEmittedEvent) -> Fallible<()> {
        use ::colored::Colorize as _;

        let download_progress_bars = self.download_progress_bars.lock().await;
        let DownloadProgressBars { status, .. } = download_progress_bars.as_ref().ok()?;

        let line = truncate(&event.line, self.log_width);
        let line = match event.kind {
            LineKind::TrackStarted => line.white().bold(),
            LineKind::Diagnostic(DiagnosticLevel::Warning) => line.yellow(),
            LineKind::Diagnostic(DiagnosticLevel::Error) => line.red(),
            LineKind::Plain => line.color(GRAY),
        };

        status.set_message(line.to_string());

        Ok(())
    }
}

#[async_trait]
impl Update<TrackStartedEvent> for AggregateView {
    async fn update(self: ::std::sync::Arc<Self>, event: &TrackStartedEvent) -> Fallible<()> {
        let download_progress_bars = self.download_progress_bars.lock().await;
        let DownloadProgressBars { counter, .. } = download_progress_bars.as_ref().ok()?;

        counter.set_message(format!("🎵 Downloaded song {}", event.completed_tracks));

        Ok(())
    }
}

#[async_trait]
impl Update<DownloadProgressUpdatedEvent> for AggregateView {
    async fn update(self: ::std::sync::Arc<Self>, event: &DownloadProgressUpdatedEvent) -> Fallible<()> {
        let download_progress_bars = self.download_progress_bars.lock().await;
        let DownloadProgressBars { progress, .. } = download_progress_bars.as_ref().ok()?;

        progress.set_position((event.fraction.clamp(0.0, 1.0) * PROGRESS_BAR_LENGTH as f64).round() as u64);

        Ok(())
    }
}

#[async_trait]
impl Update<DownloadCompletedEvent> for AggregateView {
    async fn update(self: ::std::sync::Arc<Self>, event: &DownloadCompletedEvent) -> Fallible<()> {
        use ::colored::Colorize as _;

        if let Some(DownloadProgressBars { progress, .. }) = self.download_progress_bars.lock().await.as_ref() {
            progress.set_position(PROGRESS_BAR_LENGTH);
        }

        let DownloadCompletedEvent { completed_tracks, expected_tracks, directory } = event;

        self.progress_bars.println(
            format!(
                "✅ Downloaded {} of {} songs into {}",
                completed_tracks,
                expected_tracks,
                directory.display(),
            )
            .green()
            .to_string(),
        )?;

        Ok(())
    }
}

#[async_trait]
impl Update<ToolCheckedEvent> for AggregateView {
    async fn update(self: ::std::sync::Arc<Self>, event: &ToolCheckedEvent) -> Fallible<()> {
        use ::colored::Colorize as _;

        self.progress_bars
            .println(format!("✅ yt-dlp {} is available.", event.version).green().to_string())?;

        Ok(())
    }
}

#[async_trait]
impl Update<DiagnosticEvent> for AggregateView {
    async fn update(self: ::std::sync::Arc<Self>, event: &DiagnosticEvent) -> Fallible<()> {
        use ::colored::Colorize as _;

        let DiagnosticEvent { message, level } = event;

        let message = match level {
            DiagnosticLevel::Warning => message.yellow(),
            DiagnosticLevel::Error => message.red(),
        };

        self.progress_bars.println(message.to_string())?;

        Ok(())
    }
}

static NULL: ::once_cell::sync::Lazy<::colored::ColoredString> = lazy_color!("N/A".yellow().bold());

const GRAY: ::colored::Color = ::colored::Color::TrueColor { r: 150, g: 150, b: 150 };
