use ::domain::AudioQuality;
use ::use_cases::boundaries::Accept;
use ::use_cases::boundaries::AnalyzePlaylistRequestModel;
use ::use_cases::boundaries::CheckToolRequestModel;
use ::use_cases::boundaries::DownloadPlaylistRequestModel;
use ::use_cases::gateways::SessionRepository;
use ::use_cases::interactors::AnalyzePlaylistInteractor;
use ::use_cases::interactors::CheckToolInteractor;
use ::use_cases::interactors::DownloadPlaylistInteractor;

use crate::utils::aliases::Fallible;

const ACTIONS: [&str; 4] = [
    "Analyze a playlist",
    "Download the analyzed playlist",
    "Check yt-dlp",
    "Quit",
];

/// Interactive menu. The analysis stays available to later downloads until the process exits.
#[derive(::bon::Builder)]
pub struct Session {
    analyze: ::std::sync::Arc<AnalyzePlaylistInteractor>,
    download: ::std::sync::Arc<DownloadPlaylistInteractor>,
    check: ::std::sync::Arc<CheckToolInteractor>,

    #[builder(default)]
    quality: AudioQuality,
}

impl Session {
    pub async fn run(mut self) -> Fallible<()> {
        loop {
            let action = prompt(|theme| {
                ::dialoguer::Select::with_theme(theme)
                    .with_prompt("What next?")
                    .items(&ACTIONS)
                    .default(0)
                    .interact()
            })
            .await?;

            ::tracing::debug!(action = ACTIONS[action], "session action");

            match action {
                0 => {
                    let url = prompt(|theme| {
                        ::dialoguer::Input::<String>::with_theme(theme)
                            .with_prompt("Playlist URL")
                            .allow_empty(true)
                            .interact_text()
                    })
                    .await?;

                    let request = AnalyzePlaylistRequestModel::builder().url(url).build();
                    ::std::sync::Arc::clone(&self.analyze).accept(request).await?;
                },
                1 => {
                    let current = self.quality;
                    let quality = prompt(move |theme| {
                        ::dialoguer::Select::with_theme(theme)
                            .with_prompt("Audio quality")
                            .items(&AudioQuality::ALL)
                            .default(AudioQuality::ALL.iter().position(|quality| *quality == current).unwrap_or_default())
                            .interact()
                    })
                    .await?;

                    self.quality = AudioQuality::ALL[quality];

                    let request = DownloadPlaylistRequestModel::builder().quality(self.quality).build();
                    ::std::sync::Arc::clone(&self.download).accept(request).await?;
                },
                2 => {
                    ::std::sync::Arc::clone(&self.check).accept(CheckToolRequestModel).await?;
                },
                _ => break,
            }
        }

        Ok(())
    }
}

/// Runs a blocking terminal prompt off the async runtime.
async fn prompt<Answer, Interaction>(interaction: Interaction) -> Fallible<Answer>
where
    Answer: Send + 'static,
    Interaction: FnOnce(&::dialoguer::theme::ColorfulTheme) -> ::dialoguer::Result<Answer> + Send + 'static,
{
    let answer = ::tokio::task::spawn_blocking(move || interaction(&::dialoguer::theme::ColorfulTheme::default())).await??;

    Ok(answer)
}

/// Songs found by the last analysis, zero when nothing usable was stored.
pub async fn analyzed_tracks(sessions: ::std::sync::Arc<dyn SessionRepository>) -> Fallible<u64> {
    let tracks = sessions
        .get()
        .await?
        .map_or(0, |playlist| playlist.total_tracks());

    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use ::domain::Playlist;
    use ::domain::PlaylistUrl;
    use ::infrastructures::gateways::repositories::InMemorySessionRepository;
    use ::use_cases::gateways::Insert;

    use super::*;

    #[tokio::test]
    async fn nothing_is_analyzed_before_the_first_analysis() {
        let sessions = ::std::sync::Arc::new(InMemorySessionRepository::default());

        assert_eq!(analyzed_tracks(sessions).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_analyses_have_no_tracks() {
        let sessions = ::std::sync::Arc::new(InMemorySessionRepository::default());
        let playlist = Playlist::builder()
            .url(PlaylistUrl::parse("https://www.youtube.com/playlist?list=PL1").unwrap())
            .entries(Vec::<::domain::PlaylistEntry>::new())
            .build();

        ::std::sync::Arc::clone(&sessions).insert(playlist).await.unwrap();

        assert_eq!(analyzed_tracks(sessions).await.unwrap(), 0);
    }
}
