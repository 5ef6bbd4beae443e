use ::async_trait::async_trait;
use ::domain::AudioQuality;
use ::domain::PlaylistUrl;
use ::use_cases::gateways::LineClassifier;
use ::use_cases::gateways::PlaylistDownloader;
use ::use_cases::models::descriptors::ExitOutcome;
use ::use_cases::models::descriptors::LineKind;
use ::use_cases::models::events::DownloadFailedEvent;
use ::use_cases::models::events::DownloadFinishedEvent;
use ::use_cases::models::events::LineEmittedEvent;
use ::use_cases::models::events::TrackDownloadEvent;
use ::use_cases::models::events::TrackStartedEvent;

use crate::gateways::commands::YtdlpCommand;
use crate::utils::aliases::BoxedStream;
use crate::utils::aliases::Fallible;
use crate::utils::aliases::MaybeOwnedPath;

#[derive(::bon::Builder)]
#[builder(on(MaybeOwnedPath, into))]
pub struct YtdlpDownloader {
    #[builder(default)]
    command: YtdlpCommand,

    directory: MaybeOwnedPath,
    classifier: ::std::sync::Arc<dyn LineClassifier>,
}

#[async_trait]
impl PlaylistDownloader for YtdlpDownloader {
    async fn download(
        self: ::std::sync::Arc<Self>, url: PlaylistUrl, quality: AudioQuality,
    ) -> Fallible<BoxedStream<TrackDownloadEvent>> {
        use ::anyhow::Context as _;

        ::tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("could not create `{}`", self.directory.display()))?;

        let directory = self.directory.to_string_lossy().into_owned();
        let expression = self.command.duct([
            url.as_str(),
            "--format", "bestaudio",
            "--extract-audio",
            "--audio-format", "mp3",
            "--audio-quality", quality.as_str(),
            "--add-metadata",
            "--embed-thumbnail",
            "--no-warnings",
            "--newline",
            "--color", "no_color",
            "--paths", directory.as_str(),
            "--output", "%(title)s.%(ext)s",
        ]);

        ::tracing::info!(url = %url, %quality, directory = %directory, command = %self.command, "starting yt-dlp");

        // Capacity 1: the child is only read as fast as events are consumed.
        let (events_tx, events_rx) = ::tokio::sync::mpsc::channel(1);

        let pump = ::tokio::task::spawn_blocking({
            let this = ::std::sync::Arc::clone(&self);
            let events_tx = events_tx.clone();
            move || this.pump(expression, events_tx)
        });

        ::tokio::spawn(async move {
            if let Err(error) = pump.await {
                ::tracing::error!(%error, "yt-dlp output reader stopped unexpectedly");

                let message = format!("yt-dlp output reader stopped unexpectedly: {}", error);
                let _ = events_tx.send(TrackDownloadEvent::Failed(DownloadFailedEvent { message: message.into() })).await;
            }
        });

        Ok(::std::boxed::Box::pin(::tokio_stream::wrappers::ReceiverStream::new(events_rx)))
    }
}

impl YtdlpDownloader {
    fn pump(&self, expression: ::duct::Expression, events: ::tokio::sync::mpsc::Sender<TrackDownloadEvent>) {
        use ::std::io::BufRead as _;

        let reader = match expression.stderr_to_stdout().unchecked().reader() {
            Ok(reader) => reader,
            Err(error) => {
                ::tracing::error!(%error, command = %self.command, "could not start yt-dlp");

                let message = format!("could not run `{}`: {}", self.command, error);
                let _ = events.blocking_send(TrackDownloadEvent::Failed(DownloadFailedEvent { message: message.into() }));
                return;
            },
        };

        let mut reader = ::std::io::BufReader::new(reader);
        let mut buffer = Vec::new();
        let mut index = 0;
        let mut completed_tracks = 0;

        loop {
            buffer.clear();

            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => {},
                Err(error) => {
                    ::tracing::warn!(%error, "could not read yt-dlp output");
                    break;
                },
            }

            let line = String::from_utf8_lossy(&buffer)
                .trim_end_matches(['\r', '\n'])
                .to_owned();
            let kind = self.classifier.classify(&line);

            ::tracing::trace!(index, line = %line, "yt-dlp");

            let event = LineEmittedEvent::builder()
                .index(index)
                .line(line)
                .kind(kind)
                .build();

            // Receiver gone: dropping the reader kills the child.
            if events.blocking_send(TrackDownloadEvent::LineEmitted(event)).is_err() {
                ::tracing::debug!("download stream dropped before yt-dlp finished");
                return;
            }

            if kind == LineKind::TrackStarted {
                completed_tracks += 1;

                let event = TrackStartedEvent { completed_tracks };

                if events.blocking_send(TrackDownloadEvent::TrackStarted(event)).is_err() {
                    return;
                }
            }

            index += 1;
        }

        let exit = match reader.get_ref().try_wait() {
            Ok(Some(output)) => ExitOutcome::from(output.status),
            Ok(None) => ExitOutcome { code: None },
            Err(error) => {
                ::tracing::warn!(%error, "could not collect yt-dlp exit status");
                ExitOutcome { code: None }
            },
        };

        ::tracing::info!(completed_tracks, %exit, "yt-dlp finished");

        let event = DownloadFinishedEvent::builder()
            .completed_tracks(completed_tracks)
            .exit(exit)
            .directory(self.directory.clone())
            .build();

        let _ = events.blocking_send(TrackDownloadEvent::Finished(event));
    }
}

#[cfg(test)]
mod tests {
    use ::futures::StreamExt as _;
    use ::use_cases::models::events::DiagnosticLevel;

    use super::*;
    use crate::gateways::classifiers::PrefixLineClassifier;
    use crate::gateways::commands::testing::sh;

    fn url() -> PlaylistUrl {
        PlaylistUrl::parse("https://youtube.com/playlist?list=PL42").unwrap()
    }

    async fn run(command: YtdlpCommand, directory: &::std::path::Path) -> Vec<TrackDownloadEvent> {
        let downloader = YtdlpDownloader::builder()
            .command(command)
            .directory(directory.to_path_buf())
            .classifier(::std::sync::Arc::new(PrefixLineClassifier::default()))
            .build();

        ::std::sync::Arc::new(downloader)
            .download(url(), AudioQuality::Kbps320)
            .await
            .unwrap()
            .collect()
            .await
    }

    fn lines(events: &[TrackDownloadEvent]) -> Vec<(u64, String)> {
        events
            .iter()
            .filter_map(|event| match event {
                TrackDownloadEvent::LineEmitted(event) => Some((event.index, event.line.to_string())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn counts_tracks_in_output_order() {
        let directory = ::tempfile::tempdir().unwrap();
        let script = r#"
            echo '[youtube:tab] Downloading playlist PL42'
            for i in 1 2 3; do
                echo "[download] Destination: Song $i.webm"
                echo "[download] 100% of 3.00MiB"
            done
        "#;

        let events = run(sh(script), directory.path()).await;

        let tracks = events
            .iter()
            .filter_map(|event| match event {
                TrackDownloadEvent::TrackStarted(event) => Some(event.completed_tracks),
                _ => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(tracks, [1, 2, 3]);
        assert_eq!(lines(&events).len(), 7);
        assert!(lines(&events).iter().enumerate().all(|(idx, (index, _))| *index == idx as u64));

        match events.last() {
            Some(TrackDownloadEvent::Finished(event)) => {
                assert_eq!(event.completed_tracks, 3);
                assert!(event.exit.is_success());
            },
            other => panic!("unexpected last event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn track_event_follows_its_line() {
        let directory = ::tempfile::tempdir().unwrap();

        let events = run(sh("echo '[download] Destination: a.webm'"), directory.path()).await;

        assert!(matches!(&events[0], TrackDownloadEvent::LineEmitted(event) if event.kind == LineKind::TrackStarted));
        assert!(matches!(&events[1], TrackDownloadEvent::TrackStarted(TrackStartedEvent { completed_tracks: 1 })));
        assert!(matches!(&events[2], TrackDownloadEvent::Finished(_)));
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn merges_stderr_into_the_line_stream() {
        let directory = ::tempfile::tempdir().unwrap();

        let events = run(sh("echo first; echo 'WARNING: careful' >&2; printf 'last\\r\\n'"), directory.path()).await;

        let kinds = events
            .iter()
            .filter_map(|event| match event {
                TrackDownloadEvent::LineEmitted(event) => Some(event.kind),
                _ => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(
            lines(&events),
            [(0, "first".to_owned()), (1, "WARNING: careful".to_owned()), (2, "last".to_owned())]
        );
        assert_eq!(kinds[1], LineKind::Diagnostic(DiagnosticLevel::Warning));
    }

    #[tokio::test]
    async fn reports_non_zero_exit() {
        let directory = ::tempfile::tempdir().unwrap();

        let events = run(sh("echo 'ERROR: Video unavailable'; exit 3"), directory.path()).await;

        match events.last() {
            Some(TrackDownloadEvent::Finished(event)) => assert_eq!(event.exit.code, Some(3)),
            other => panic!("unexpected last event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_program_yields_a_single_failure() {
        let directory = ::tempfile::tempdir().unwrap();
        let command = YtdlpCommand::builder().program("/nonexistent/yt-dlp").build();

        let events = run(command, directory.path()).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], TrackDownloadEvent::Failed(event) if event.message.contains("/nonexistent/yt-dlp")));
    }

    struct PanickingClassifier;

    impl LineClassifier for PanickingClassifier {
        fn classify(&self, _: &str) -> LineKind {
            panic!("classifier blew up")
        }
    }

    #[tokio::test]
    async fn reader_panic_ends_with_a_failure() {
        let directory = ::tempfile::tempdir().unwrap();

        let downloader = YtdlpDownloader::builder()
            .command(sh("echo first; echo second"))
            .directory(directory.path().to_path_buf())
            .classifier(::std::sync::Arc::new(PanickingClassifier))
            .build();

        let events = ::std::sync::Arc::new(downloader)
            .download(url(), AudioQuality::default())
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], TrackDownloadEvent::Failed(event) if event.message.contains("unexpectedly")));
    }

    #[tokio::test]
    async fn creates_the_output_directory_and_passes_it_along() {
        let root = ::tempfile::tempdir().unwrap();
        let directory = root.path().join("nested").join("music");

        let events = run(sh(r#"echo "$@""#), &directory).await;

        assert!(directory.is_dir());

        let (_, arguments) = &lines(&events)[0];

        assert!(arguments.starts_with("https://youtube.com/playlist?list=PL42 --format bestaudio"));
        assert!(arguments.contains("--audio-quality 320K"));
        assert!(arguments.contains(&format!("--paths {}", directory.display())));
    }

    #[tokio::test]
    async fn unwritable_directory_is_an_error() {
        let root = ::tempfile::tempdir().unwrap();
        let file = root.path().join("occupied");
        ::std::fs::write(&file, b"").unwrap();

        let downloader = YtdlpDownloader::builder()
            .command(sh("true"))
            .directory(file.join("music"))
            .classifier(::std::sync::Arc::new(PrefixLineClassifier::default()))
            .build();

        assert!(::std::sync::Arc::new(downloader).download(url(), AudioQuality::default()).await.is_err());
    }
}
