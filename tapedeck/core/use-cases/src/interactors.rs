use ::async_trait::async_trait;
use ::domain::DownloadSession;
use ::domain::Playlist;
use ::domain::PlaylistUrl;
use ::futures::prelude::*;

use crate::boundaries::Accept;
use crate::boundaries::AnalyzePlaylistOutputBoundary;
use crate::boundaries::AnalyzePlaylistRequestModel;
use crate::boundaries::CheckToolOutputBoundary;
use crate::boundaries::CheckToolRequestModel;
use crate::boundaries::DownloadPlaylistOutputBoundary;
use crate::boundaries::DownloadPlaylistRequestModel;
use crate::boundaries::Update;
use crate::gateways::PlaylistDownloader;
use crate::gateways::PlaylistInspector;
use crate::gateways::SessionRepository;
use crate::gateways::ToolProbe;
use crate::models::events::DiagnosticEvent;
use crate::models::events::DownloadCompletedEvent;
use crate::models::events::DownloadProgressUpdatedEvent;
use crate::models::events::DownloadStartedEvent;
use crate::models::events::PlaylistAnalysisStartedEvent;
use crate::models::events::PlaylistAnalyzedEvent;
use crate::models::events::ToolCheckedEvent;
use crate::models::events::TrackDownloadEvent;
use crate::utils::aliases::Fallible;

/// Lines of tool output expected per track when no better estimate exists.
pub const DEFAULT_LINES_PER_TRACK: u64 = 10;

const EMPTY_PLAYLIST_MESSAGE: &str = "yt-dlp returned no playlist entries";
const MISSING_ANALYSIS_MESSAGE: &str = "Please analyze a playlist first.";

#[derive(::bon::Builder)]
pub struct AnalyzePlaylistInteractor {
    output_boundary: ::std::sync::Arc<dyn AnalyzePlaylistOutputBoundary>,

    inspector: ::std::sync::Arc<dyn PlaylistInspector>,
    sessions: ::std::sync::Arc<dyn SessionRepository>,
}

#[async_trait]
impl Accept<AnalyzePlaylistRequestModel> for AnalyzePlaylistInteractor {
    async fn accept(self: ::std::sync::Arc<Self>, request: AnalyzePlaylistRequestModel) -> Fallible<()> {
        ::std::sync::Arc::clone(&self.output_boundary).activate().await?;
        let result = ::std::sync::Arc::clone(&self).analyze(request).await;
        ::std::sync::Arc::clone(&self.output_boundary).deactivate().await?;

        result
    }
}

impl AnalyzePlaylistInteractor {
    async fn analyze(self: ::std::sync::Arc<Self>, request: AnalyzePlaylistRequestModel) -> Fallible<()> {
        let url = match PlaylistUrl::parse(&request.url) {
            Ok(url) => url,
            Err(error) => return notify(&self.output_boundary, DiagnosticEvent::error(error.to_string())).await,
        };

        notify(&self.output_boundary, PlaylistAnalysisStartedEvent { url: url.clone() }).await?;

        let inspection = match ::std::sync::Arc::clone(&self.inspector).inspect(url.clone()).await {
            Ok(inspection) => inspection,
            Err(error) => {
                ::tracing::error!(%url, "playlist inspection failed: {:#}", error);

                let message = format!("Failed to fetch playlist info: {:#}", error);
                return notify(&self.output_boundary, DiagnosticEvent::error(message)).await;
            },
        };

        ::tracing::info!(
            %url,
            entries = inspection.entries.len(),
            exit = %inspection.exit,
            "playlist inspected"
        );

        if !inspection.exit.is_success() || inspection.entries.is_empty() {
            let message = match inspection.diagnostics.trim() {
                "" => EMPTY_PLAYLIST_MESSAGE.to_owned(),
                diagnostics => diagnostics.to_owned(),
            };

            notify(&self.output_boundary, DiagnosticEvent::error(message)).await?;
        }

        let playlist = Playlist::builder()
            .url(url)
            .entries(inspection.entries)
            .build();

        ::std::sync::Arc::clone(&self.sessions).insert(playlist.clone()).await?;

        notify(&self.output_boundary, PlaylistAnalyzedEvent { playlist }).await
    }
}

#[derive(::bon::Builder)]
pub struct DownloadPlaylistInteractor {
    output_boundary: ::std::sync::Arc<dyn DownloadPlaylistOutputBoundary>,

    downloader: ::std::sync::Arc<dyn PlaylistDownloader>,
    sessions: ::std::sync::Arc<dyn SessionRepository>,

    #[builder(default = DEFAULT_LINES_PER_TRACK)]
    lines_per_track: u64,
}

#[async_trait]
impl Accept<DownloadPlaylistRequestModel> for DownloadPlaylistInteractor {
    async fn accept(self: ::std::sync::Arc<Self>, request: DownloadPlaylistRequestModel) -> Fallible<()> {
        ::std::sync::Arc::clone(&self.output_boundary).activate().await?;
        let result = ::std::sync::Arc::clone(&self).download(request).await;
        ::std::sync::Arc::clone(&self.output_boundary).deactivate().await?;

        result
    }
}

impl DownloadPlaylistInteractor {
    async fn download(self: ::std::sync::Arc<Self>, request: DownloadPlaylistRequestModel) -> Fallible<()> {
        let Some(playlist) = ::std::sync::Arc::clone(&self.sessions).get().await? else {
            return notify(&self.output_boundary, DiagnosticEvent::error(MISSING_ANALYSIS_MESSAGE)).await;
        };

        let url = match request.url.as_deref().map(PlaylistUrl::parse) {
            None => playlist.url.clone(),
            Some(Ok(url)) => {
                if url != playlist.url {
                    let message = format!(
                        "`{}` differs from the analyzed playlist `{}`; progress is estimated from the analyzed track count",
                        url, playlist.url,
                    );
                    notify(&self.output_boundary, DiagnosticEvent::warning(message)).await?;
                }

                url
            },
            Some(Err(error)) => return notify(&self.output_boundary, DiagnosticEvent::error(error.to_string())).await,
        };

        let mut session = DownloadSession::builder()
            .url(url.clone())
            .quality(request.quality)
            .expected_tracks(playlist.total_tracks())
            .build();

        ::tracing::info!(%url, quality = %request.quality, expected_tracks = session.expected_tracks, "download started");

        let event = DownloadStartedEvent {
            session: session.clone(),
            started_at: ::std::time::SystemTime::now(),
        };
        notify(&self.output_boundary, event).await?;

        let events = match ::std::sync::Arc::clone(&self.downloader).download(url, request.quality).await {
            Ok(events) => events,
            Err(error) => {
                ::tracing::error!("download could not start: {:#}", error);

                let message = format!("Failed to start download: {:#}", error);
                return notify(&self.output_boundary, DiagnosticEvent::error(message)).await;
            },
        };

        ::futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            match event {
                TrackDownloadEvent::LineEmitted(event) => {
                    let fraction = session.progress(event.index, self.lines_per_track);

                    notify(&self.output_boundary, event).await?;
                    notify(&self.output_boundary, DownloadProgressUpdatedEvent { fraction }).await?;
                },

                TrackDownloadEvent::TrackStarted(event) => {
                    session.record_track_started(event.completed_tracks);

                    notify(&self.output_boundary, event).await?;
                },

                TrackDownloadEvent::Failed(event) => {
                    ::tracing::error!(message = %event.message, "yt-dlp could not be started");

                    let message = format!("Failed to run yt-dlp: {}", event.message);
                    notify(&self.output_boundary, DiagnosticEvent::error(message)).await?;
                },

                TrackDownloadEvent::Finished(event) => {
                    session.record_track_started(event.completed_tracks);

                    ::tracing::info!(
                        completed_tracks = session.completed_tracks(),
                        exit = %event.exit,
                        "download finished"
                    );

                    if event.exit.is_success() {
                        let event = DownloadCompletedEvent {
                            completed_tracks: session.completed_tracks(),
                            expected_tracks: session.expected_tracks,
                            directory: event.directory,
                        };
                        notify(&self.output_boundary, event).await?;
                    } else {
                        let message = format!(
                            "yt-dlp exited with {} after {} of {} tracks",
                            event.exit,
                            session.completed_tracks(),
                            session.expected_tracks,
                        );
                        notify(&self.output_boundary, DiagnosticEvent::error(message)).await?;
                    }
                },
            }
        }

        Ok(())
    }
}

#[derive(::bon::Builder)]
pub struct CheckToolInteractor {
    output_boundary: ::std::sync::Arc<dyn CheckToolOutputBoundary>,

    probe: ::std::sync::Arc<dyn ToolProbe>,
}

#[async_trait]
impl Accept<CheckToolRequestModel> for CheckToolInteractor {
    async fn accept(self: ::std::sync::Arc<Self>, _: CheckToolRequestModel) -> Fallible<()> {
        ::std::sync::Arc::clone(&self.output_boundary).activate().await?;

        let result = match ::std::sync::Arc::clone(&self.probe).probe().await {
            Ok(version) => notify(&self.output_boundary, ToolCheckedEvent { version }).await,
            Err(error) => {
                let message = format!("yt-dlp is not available: {:#}", error);
                notify(&self.output_boundary, DiagnosticEvent::error(message)).await
            },
        };

        ::std::sync::Arc::clone(&self.output_boundary).deactivate().await?;

        result
    }
}

async fn notify<Boundary, Event>(boundary: &::std::sync::Arc<Boundary>, event: Event) -> Fallible<()>
where
    Boundary: Update<Event> + ?Sized,
    Event: ::core::marker::Send + ::core::marker::Sync,
{
    ::std::sync::Arc::clone(boundary).update(&event).await
}
