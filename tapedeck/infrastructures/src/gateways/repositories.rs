use ::async_trait::async_trait;
use ::domain::Playlist;
use ::use_cases::gateways::Insert;
use ::use_cases::gateways::SessionRepository;

use crate::utils::aliases::Fallible;

/// Holds the most recent analysis for the lifetime of the process.
#[derive(Default)]
pub struct InMemorySessionRepository {
    playlist: ::tokio::sync::Mutex<Option<Playlist>>,
}

#[async_trait]
impl Insert<Playlist> for InMemorySessionRepository {
    async fn insert(self: ::std::sync::Arc<Self>, playlist: Playlist) -> Fallible<()> {
        *self.playlist.lock().await = Some(playlist);

        Ok(())
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn get(self: ::std::sync::Arc<Self>) -> Fallible<Option<Playlist>> {
        Ok(self.playlist.lock().await.clone())
    }
}
