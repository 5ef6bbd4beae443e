use ::async_trait::async_trait;
use ::domain::EntryAttribute;
use ::domain::EntryMetadata;
use ::domain::PlaylistEntry;
use ::domain::PlaylistUrl;
use ::futures::prelude::*;
use ::use_cases::gateways::PlaylistInspector;
use ::use_cases::models::descriptors::ExitOutcome;
use ::use_cases::models::descriptors::PlaylistInspection;

use crate::gateways::commands::YtdlpCommand;
use crate::utils::aliases::Fallible;
use crate::utils::extensions::OptionExt;

/// Lists a playlist with `--flat-playlist --dump-json`: one JSON record per line on stdout.
#[derive(::bon::Builder)]
pub struct YtdlpPlaylistInspector {
    #[builder(default)]
    command: YtdlpCommand,
}

#[async_trait]
impl PlaylistInspector for YtdlpPlaylistInspector {
    async fn inspect(self: ::std::sync::Arc<Self>, url: PlaylistUrl) -> Fallible<PlaylistInspection> {
        use ::anyhow::Context as _;
        use ::tokio::io::AsyncBufReadExt as _;
        use ::tokio::io::AsyncReadExt as _;

        let mut process = self.command
            .tokio(["--flat-playlist", "--dump-json", "--no-warnings", url.as_str()])
            .stdout(::std::process::Stdio::piped())
            .stderr(::std::process::Stdio::piped())
            .spawn()
            .with_context(|| format!("could not run `{}`", self.command))?;

        let stdout = process.stdout.take().ok()?;
        let mut stderr = process.stderr.take().ok()?;

        let entries = async move {
            let lines = ::tokio::io::BufReader::new(stdout).split(b'\n');

            ::tokio_stream::wrappers::SplitStream::new(lines)
                .try_filter_map(|line| async move {
                    let entry = match String::from_utf8(line) {
                        Ok(line) => PlaylistEntry::from_line(line),
                        Err(error) => {
                            ::tracing::debug!(%error, "skipping undecodable playlist entry");
                            None
                        },
                    };

                    Ok(entry)
                })
                .try_collect::<Vec<_>>()
                .await
        };

        let diagnostics = async move {
            let mut buffer = Vec::new();
            stderr.read_to_end(&mut buffer).await?;

            Ok::<_, ::std::io::Error>(String::from_utf8_lossy(&buffer).into_owned())
        };

        let (entries, diagnostics) = ::futures::try_join!(entries, diagnostics)?;
        let exit = ExitOutcome::from(process.wait().await?);

        ::tracing::debug!(url = %url, entries = entries.len(), %exit, "inspected playlist");

        Ok(
            PlaylistInspection::builder()
                .entries(entries)
                .diagnostics(diagnostics)
                .exit(exit)
                .build()
        )
    }
}

trait FromYtdlpLine {
    fn from_line<Line>(line: Line) -> Option<Self>
    where
        Line: AsRef<str>,
        Self: Sized;
}

impl FromYtdlpLine for PlaylistEntry {
    fn from_line<Line>(line: Line) -> Option<Self>
    where
        Line: AsRef<str>,
        Self: Sized,
    {
        let line = line.as_ref().trim();

        if line.is_empty() {
            return None;
        }

        let record = match ::serde_json::from_str::<YtdlpEntryRecord>(line) {
            Ok(record) => record,
            Err(error) => {
                ::tracing::debug!(%error, line, "skipping malformed playlist entry");
                return None;
            },
        };

        Some(record.into())
    }
}

#[derive(::serde::Deserialize)]
struct YtdlpEntryRecord {
    id: Option<String>,
    url: Option<String>,
    title: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    duration: Option<f64>,

    #[serde(flatten)]
    rest: ::serde_json::Map<String, ::serde_json::Value>,
}

impl From<YtdlpEntryRecord> for PlaylistEntry {
    fn from(record: YtdlpEntryRecord) -> Self {
        let attributes = record.rest
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    ::serde_json::Value::String(value) => value,
                    ::serde_json::Value::Number(value) => value.to_string(),
                    ::serde_json::Value::Bool(value) => value.to_string(),
                    _ => return None,
                };

                Some(EntryAttribute { key: key.into(), value: value.into() })
            })
            .collect::<Vec<_>>();

        PlaylistEntry::builder()
            .maybe_id(record.id)
            .maybe_url(record.url)
            .metadata(EntryMetadata::builder()
                .maybe_title(record.title)
                .maybe_uploader(record.uploader.or(record.channel))
                .maybe_duration(record.duration.and_then(|secs| ::std::time::Duration::try_from_secs_f64(secs).ok()))
                .build())
            .attributes(attributes)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::commands::testing::sh;

    fn inspector(script: &str) -> ::std::sync::Arc<YtdlpPlaylistInspector> {
        ::std::sync::Arc::new(YtdlpPlaylistInspector::builder().command(sh(script)).build())
    }

    fn url() -> PlaylistUrl {
        PlaylistUrl::parse("https://www.youtube.com/playlist?list=PL123").unwrap()
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let script = r#"printf '{"title":"A"}\n{"title":"B"}\nnot-json\n'"#;

        let inspection = inspector(script).inspect(url()).await.unwrap();

        let titles = inspection.entries
            .iter()
            .map(|entry| entry.metadata.title.as_deref())
            .collect::<Vec<_>>();

        assert_eq!(titles, [Some("A"), Some("B")]);
        assert!(inspection.exit.is_success());
    }

    #[tokio::test]
    async fn undecodable_lines_are_skipped() {
        let script = r#"printf '{"title":"A"}\n\377\376 not utf8\n{"title":"B"}\n'"#;

        let inspection = inspector(script).inspect(url()).await.unwrap();

        let titles = inspection.entries
            .iter()
            .map(|entry| entry.metadata.title.as_deref())
            .collect::<Vec<_>>();

        assert_eq!(titles, [Some("A"), Some("B")]);
    }

    #[tokio::test]
    async fn counts_only_valid_records() {
        let script = r#"
            for i in 1 2 3 4; do
                echo "{\"id\":\"v$i\",\"title\":\"Song $i\"}"
                echo "[garbage $i]"
            done
            echo ""
        "#;

        let inspection = inspector(script).inspect(url()).await.unwrap();

        assert_eq!(inspection.entries.len(), 4);
        assert_eq!(inspection.entries[3].id.as_deref(), Some("v4"));
    }

    #[tokio::test]
    async fn maps_record_fields() {
        let script = r#"echo '{"id":"abc","url":"https://youtu.be/abc","title":"Song","channel":"Band","duration":215.5,"view_count":42,"thumbnails":[]}'"#;

        let inspection = inspector(script).inspect(url()).await.unwrap();
        let entry = &inspection.entries[0];

        assert_eq!(entry.url.as_deref(), Some("https://youtu.be/abc"));
        assert_eq!(entry.metadata.uploader.as_deref(), Some("Band"));
        assert_eq!(entry.metadata.duration, Some(::std::time::Duration::from_millis(215_500)));
        assert_eq!(
            &entry.attributes[..],
            [EntryAttribute { key: "view_count".into(), value: "42".into() }]
        );
    }

    #[tokio::test]
    async fn keeps_partial_output_of_failed_runs() {
        let script = r#"echo '{"title":"A"}'; echo 'ERROR: [youtube:tab] PL123: This playlist does not exist' >&2; exit 1"#;

        let inspection = inspector(script).inspect(url()).await.unwrap();

        assert_eq!(inspection.entries.len(), 1);
        assert_eq!(inspection.exit.code, Some(1));
        assert!(inspection.diagnostics.contains("This playlist does not exist"));
    }

    #[tokio::test]
    async fn passes_url_as_last_argument() {
        let inspection = inspector(r#"eval "last=\${$#}"; echo "{\"url\":\"$last\"}""#).inspect(url()).await.unwrap();

        assert_eq!(inspection.entries[0].url.as_deref(), Some(url().as_str()));
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let inspector = YtdlpPlaylistInspector::builder()
            .command(YtdlpCommand::builder().program("/nonexistent/yt-dlp").build())
            .build();

        assert!(::std::sync::Arc::new(inspector).inspect(url()).await.is_err());
    }
}
