pub(crate) mod session;
pub(crate) mod utils;

use ::domain::AudioQuality;
use ::infrastructures::boundaries::AggregateView;
use ::infrastructures::gateways::classifiers::PrefixLineClassifier;
use ::infrastructures::gateways::classifiers::RegexLineClassifier;
use ::infrastructures::gateways::commands::YtdlpCommand;
use ::infrastructures::gateways::downloaders::YtdlpDownloader;
use ::infrastructures::gateways::inspectors::YtdlpPlaylistInspector;
use ::infrastructures::gateways::probes::YtdlpToolProbe;
use ::infrastructures::gateways::repositories::InMemorySessionRepository;
use ::use_cases::boundaries::Accept;
use ::use_cases::boundaries::AnalyzePlaylistOutputBoundary;
use ::use_cases::boundaries::AnalyzePlaylistRequestModel;
use ::use_cases::boundaries::CheckToolOutputBoundary;
use ::use_cases::boundaries::CheckToolRequestModel;
use ::use_cases::boundaries::DownloadPlaylistOutputBoundary;
use ::use_cases::boundaries::DownloadPlaylistRequestModel;
use ::use_cases::gateways::LineClassifier;
use ::use_cases::gateways::PlaylistDownloader;
use ::use_cases::gateways::PlaylistInspector;
use ::use_cases::gateways::SessionRepository;
use ::use_cases::gateways::ToolProbe;
use ::use_cases::interactors::AnalyzePlaylistInteractor;
use ::use_cases::interactors::CheckToolInteractor;
use ::use_cases::interactors::DownloadPlaylistInteractor;

use crate::session::Session;
use crate::session::analyzed_tracks;
use crate::utils::aliases::Fallible;
use crate::utils::aliases::MaybeOwnedString;
use crate::utils::extensions::ArgMatchesExt;

#[tokio::main]
async fn main() -> Fallible<()> {
    let writer = ::tracing_appender::rolling::daily("logs", "tapedeck.log");
    let (writer, _guard) = ::tracing_appender::non_blocking(writer);

    ::tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            ::tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| ::tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .init();

    let url_arg = || {
        ::clap::Arg::new("url")
            .short('i')
            .long("url")
            .required(true)
            .value_parser(::clap::value_parser!(::std::string::String))
    };

    let quality_arg = || {
        ::clap::Arg::new("quality")
            .short('q')
            .long("quality")
            .default_value(AudioQuality::default().as_str())
            .value_parser(::clap::value_parser!(AudioQuality))
    };

    let command = ::clap::Command::new("tapedeck")
        .about("Downloads YouTube playlists as MP3 files through yt-dlp")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(::clap::Command::new("analyze").about("List the songs of a playlist").arg(url_arg()))
        .subcommand(
            ::clap::Command::new("download")
                .about("Analyze a playlist, then download every song")
                .arg(url_arg())
                .arg(quality_arg()),
        )
        .subcommand(::clap::Command::new("check").about("Check that yt-dlp can be run"))
        .subcommand(::clap::Command::new("session").about("Interactive menu").arg(quality_arg()))
        .arg(
            ::clap::Arg::new("directory")
                .short('o')
                .long("directory")
                .env("TAPEDECK_DIRECTORY")
                .default_value("downloads")
                .value_parser(::clap::value_parser!(::std::path::PathBuf)),
        )
        .arg(
            ::clap::Arg::new("ytdlp")
                .long("ytdlp")
                .env("TAPEDECK_YTDLP")
                .default_value(::infrastructures::gateways::commands::DEFAULT_PROGRAM)
                .value_parser(::clap::value_parser!(::std::string::String)),
        )
        .arg(
            ::clap::Arg::new("ytdlp-arg")
                .long("ytdlp-arg")
                .action(::clap::ArgAction::Append)
                .allow_hyphen_values(true)
                .value_parser(::clap::value_parser!(::std::string::String)),
        )
        .arg(
            ::clap::Arg::new("lines-per-track")
                .long("lines-per-track")
                .default_value("10")
                .value_parser(::clap::value_parser!(u64).range(1..)),
        )
        .arg(
            ::clap::Arg::new("track-pattern")
                .long("track-pattern")
                .value_parser(::clap::value_parser!(::std::string::String)),
        )
        .arg(
            ::clap::Arg::new("preview")
                .long("preview")
                .default_value("5")
                .value_parser(::clap::value_parser!(usize)),
        )
        .arg(
            ::clap::Arg::new("log-width")
                .long("log-width")
                .default_value("80")
                .value_parser(::clap::value_parser!(usize)),
        )
        .arg(
            ::clap::Arg::new("probe-timeout")
                .long("probe-timeout")
                .default_value("10")
                .value_parser(::clap::value_parser!(u64)),
        );

    let matches = command.get_matches();

    let view = ::std::sync::Arc::new(
        AggregateView::builder()
            .preview_limit(*matches.value::<usize>("preview")?)
            .log_width(*matches.value::<usize>("log-width")?)
            .build(),
    );

    let ytdlp = YtdlpCommand::builder()
        .program(matches.value::<::std::string::String>("ytdlp")?.to_owned())
        .leading_args(
            matches
                .get_many::<::std::string::String>("ytdlp-arg")
                .into_iter()
                .flatten()
                .map(|arg| MaybeOwnedString::from(arg.to_owned()))
                .collect::<Vec<_>>(),
        )
        .build();

    ::tracing::info!(ytdlp = %ytdlp, "starting tapedeck");

    let classifier: ::std::sync::Arc<dyn LineClassifier> = match matches.get_one::<::std::string::String>("track-pattern") {
        Some(pattern) => ::std::sync::Arc::new(RegexLineClassifier::new(pattern)?),
        None => ::std::sync::Arc::new(PrefixLineClassifier::default()),
    };

    let sessions = ::std::sync::Arc::new(InMemorySessionRepository::default());

    let inspector = ::std::sync::Arc::new(YtdlpPlaylistInspector::builder().command(ytdlp.clone()).build());

    let downloader = ::std::sync::Arc::new(
        YtdlpDownloader::builder()
            .command(ytdlp.clone())
            .directory(matches.value::<::std::path::PathBuf>("directory")?.to_owned())
            .classifier(classifier)
            .build(),
    );

    let probe = ::std::sync::Arc::new(
        YtdlpToolProbe::builder()
            .command(ytdlp)
            .timeout(::std::time::Duration::from_secs(*matches.value::<u64>("probe-timeout")?))
            .build(),
    );

    let analyze_playlist_interactor = ::std::sync::Arc::new(
        AnalyzePlaylistInteractor::builder()
            .output_boundary(::std::sync::Arc::clone(&view) as ::std::sync::Arc<dyn AnalyzePlaylistOutputBoundary>)
            .inspector(::std::sync::Arc::clone(&inspector) as ::std::sync::Arc<dyn PlaylistInspector>)
            .sessions(::std::sync::Arc::clone(&sessions) as ::std::sync::Arc<dyn SessionRepository>)
            .build(),
    );
    let download_playlist_interactor = ::std::sync::Arc::new(
        DownloadPlaylistInteractor::builder()
            .output_boundary(::std::sync::Arc::clone(&view) as ::std::sync::Arc<dyn DownloadPlaylistOutputBoundary>)
            .downloader(::std::sync::Arc::clone(&downloader) as ::std::sync::Arc<dyn PlaylistDownloader>)
            .sessions(::std::sync::Arc::clone(&sessions) as ::std::sync::Arc<dyn SessionRepository>)
            .lines_per_track(*matches.value::<u64>("lines-per-track")?)
            .build(),
    );
    let check_tool_interactor = ::std::sync::Arc::new(
        CheckToolInteractor::builder()
            .output_boundary(::std::sync::Arc::clone(&view) as ::std::sync::Arc<dyn CheckToolOutputBoundary>)
            .probe(::std::sync::Arc::clone(&probe) as ::std::sync::Arc<dyn ToolProbe>)
            .build(),
    );

    match matches.subcommand() {
        Some(("analyze", matches)) => {
            let request = AnalyzePlaylistRequestModel::builder()
                .url(matches.value::<::std::string::String>("url")?.to_owned())
                .build();
            analyze_playlist_interactor.accept(request).await?;
        },
        Some(("download", matches)) => {
            let request = AnalyzePlaylistRequestModel::builder()
                .url(matches.value::<::std::string::String>("url")?.to_owned())
                .build();
            analyze_playlist_interactor.accept(request).await?;

            // The failed analysis already explained itself.
            if analyzed_tracks(::std::sync::Arc::clone(&sessions) as ::std::sync::Arc<dyn SessionRepository>).await? == 0 {
                ::tracing::info!("nothing to download");
                return Ok(());
            }

            let request = DownloadPlaylistRequestModel::builder()
                .quality(*matches.value::<AudioQuality>("quality")?)
                .build();
            download_playlist_interactor.accept(request).await?;
        },
        Some(("check", _)) => {
            check_tool_interactor.accept(CheckToolRequestModel).await?;
        },
        Some(("session", matches)) => {
            Session::builder()
                .analyze(analyze_playlist_interactor)
                .download(download_playlist_interactor)
                .check(check_tool_interactor)
                .quality(*matches.value::<AudioQuality>("quality")?)
                .build()
                .run()
                .await?;
        },

        _ => unreachable!(),
    }

    Ok(())
}
