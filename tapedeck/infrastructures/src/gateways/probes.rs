use ::async_trait::async_trait;
use ::use_cases::gateways::ToolProbe;
use ::use_cases::models::descriptors::ExitOutcome;

use crate::gateways::commands::YtdlpCommand;
use crate::utils::aliases::Fallible;
use crate::utils::aliases::MaybeOwnedString;

pub const DEFAULT_PROBE_TIMEOUT: ::std::time::Duration = ::std::time::Duration::from_secs(10);

/// Asks yt-dlp for `--version`, giving up after `timeout`.
#[derive(::bon::Builder)]
pub struct YtdlpToolProbe {
    #[builder(default)]
    command: YtdlpCommand,

    #[builder(default = DEFAULT_PROBE_TIMEOUT)]
    timeout: ::std::time::Duration,
}

#[async_trait]
impl ToolProbe for YtdlpToolProbe {
    async fn probe(self: ::std::sync::Arc<Self>) -> Fallible<MaybeOwnedString> {
        use ::anyhow::Context as _;

        let output = ::tokio::time::timeout(self.timeout, self.command.tokio(["--version"]).output())
            .await
            .with_context(|| format!("`{} --version` did not answer within {:?}", self.command, self.timeout))?
            .with_context(|| format!("could not run `{}`", self.command))?;

        let exit = ExitOutcome::from(output.status);

        if !exit.is_success() {
            ::anyhow::bail!(
                "`{} --version` failed with {}: {}",
                self.command,
                exit,
                String::from_utf8_lossy(&output.stderr).trim(),
            );
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_owned();

        if version.is_empty() {
            ::anyhow::bail!("`{} --version` printed nothing", self.command);
        }

        ::tracing::debug!(version = %version, "found yt-dlp");

        Ok(version.into())
    }
}
