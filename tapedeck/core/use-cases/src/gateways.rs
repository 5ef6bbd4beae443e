use ::async_trait::async_trait;
use ::domain::AudioQuality;
use ::domain::Playlist;
use ::domain::PlaylistUrl;

use crate::models::descriptors::LineKind;
use crate::models::descriptors::PlaylistInspection;
use crate::models::events::TrackDownloadEvent;
use crate::utils::aliases::BoxedStream;
use crate::utils::aliases::Fallible;
use crate::utils::aliases::MaybeOwnedString;

/// Lists the entries of a playlist without downloading any media.
#[async_trait]
pub trait PlaylistInspector: Send + Sync {
    async fn inspect(self: ::std::sync::Arc<Self>, url: PlaylistUrl) -> Fallible<PlaylistInspection>;
}

/// Downloads every track of a playlist.
///
/// The returned stream is finite and cannot be restarted. It ends with exactly one of
/// [`TrackDownloadEvent::Finished`] or [`TrackDownloadEvent::Failed`].
#[async_trait]
pub trait PlaylistDownloader: Send + Sync {
    async fn download(
        self: ::std::sync::Arc<Self>, url: PlaylistUrl, quality: AudioQuality,
    ) -> Fallible<BoxedStream<TrackDownloadEvent>>;
}

pub trait LineClassifier: Send + Sync {
    fn classify(&self, line: &str) -> LineKind;
}

#[async_trait]
pub trait ToolProbe: Send + Sync {
    async fn probe(self: ::std::sync::Arc<Self>) -> Fallible<MaybeOwnedString>;
}

#[async_trait]
pub trait SessionRepository: Insert<Playlist> {
    async fn get(self: ::std::sync::Arc<Self>) -> Fallible<Option<Playlist>>;
}

#[async_trait]
pub trait Insert<Resource>: Send + Sync {
    async fn insert(self: ::std::sync::Arc<Self>, resource: Resource) -> Fallible<()>;
}
