use ::async_trait::async_trait;
use ::domain::AudioQuality;

use crate::models::events::DiagnosticEvent;
use crate::models::events::DownloadCompletedEvent;
use crate::models::events::DownloadProgressUpdatedEvent;
use crate::models::events::DownloadStartedEvent;
use crate::models::events::LineEmittedEvent;
use crate::models::events::PlaylistAnalysisStartedEvent;
use crate::models::events::PlaylistAnalyzedEvent;
use crate::models::events::ToolCheckedEvent;
use crate::models::events::TrackStartedEvent;
use crate::utils::aliases::Fallible;

#[async_trait]
pub trait Accept<Request>: Send + Sync {
    async fn accept(self: ::std::sync::Arc<Self>, request: Request) -> Fallible<()>;
}

#[async_trait]
pub trait Activate: Send + Sync {
    async fn activate(self: ::std::sync::Arc<Self>) -> Fallible<()>;
    async fn deactivate(self: ::std::sync::Arc<Self>) -> Fallible<()>;
}

#[async_trait]
pub trait Update<Event>: Send + Sync {
    async fn update(self: ::std::sync::Arc<Self>, event: &Event) -> Fallible<()>;
}

#[derive(::bon::Builder)]
#[builder(on(_, into))]
pub struct AnalyzePlaylistRequestModel {
    pub url: String,
}

pub trait AnalyzePlaylistOutputBoundary:
    Activate
    + Update<PlaylistAnalysisStartedEvent>
    + Update<PlaylistAnalyzedEvent>
    + Update<DiagnosticEvent>
{
}

impl<Boundary> AnalyzePlaylistOutputBoundary for Boundary where
    Boundary: Activate
        + Update<PlaylistAnalysisStartedEvent>
        + Update<PlaylistAnalyzedEvent>
        + Update<DiagnosticEvent>
{
}

/// Without a `url`, the playlist from the latest analysis is downloaded.
#[derive(::bon::Builder)]
#[builder(on(_, into))]
pub struct DownloadPlaylistRequestModel {
    pub url: Option<String>,

    #[builder(default)]
    pub quality: AudioQuality,
}

pub trait DownloadPlaylistOutputBoundary:
    Activate
    + Update<DownloadStartedEvent>
    + Update<LineEmittedEvent>
    + Update<TrackStartedEvent>
    + Update<DownloadProgressUpdatedEvent>
    + Update<DownloadCompletedEvent>
    + Update<DiagnosticEvent>
{
}

impl<Boundary> DownloadPlaylistOutputBoundary for Boundary where
    Boundary: Activate
        + Update<DownloadStartedEvent>
        + Update<LineEmittedEvent>
        + Update<TrackStartedEvent>
        + Update<DownloadProgressUpdatedEvent>
        + Update<DownloadCompletedEvent>
        + Update<DiagnosticEvent>
{
}

pub struct CheckToolRequestModel;

pub trait CheckToolOutputBoundary: Activate + Update<ToolCheckedEvent> + Update<DiagnosticEvent> {}

impl<Boundary> CheckToolOutputBoundary for Boundary where
    Boundary: Activate + Update<ToolCheckedEvent> + Update<DiagnosticEvent>
{
}
