use crate::utils::aliases::MaybeOwnedString;
use crate::utils::aliases::MaybeOwnedVec;

/// How yt-dlp is launched: a program plus arguments placed before every invocation's own,
/// e.g. `python3 -m yt_dlp`.
#[derive(Debug, Clone, ::bon::Builder)]
#[builder(on(_, into))]
pub struct YtdlpCommand {
    #[builder(default = MaybeOwnedString::Borrowed(DEFAULT_PROGRAM))]
    program: MaybeOwnedString,

    #[builder(default)]
    leading_args: MaybeOwnedVec<MaybeOwnedString>,
}

pub const DEFAULT_PROGRAM: &str = "yt-dlp";

impl YtdlpCommand {
    pub fn tokio<Args>(&self, args: Args) -> ::tokio::process::Command
    where
        Args: IntoIterator,
        Args::Item: AsRef<::std::ffi::OsStr>,
    {
        let mut command = ::tokio::process::Command::new(&*self.program);

        command
            .args(self.leading_args.iter().map(|arg| &**arg))
            .args(args)
            .stdin(::std::process::Stdio::null())
            .kill_on_drop(true);

        command
    }

    pub fn duct<Args>(&self, args: Args) -> ::duct::Expression
    where
        Args: IntoIterator,
        Args::Item: AsRef<::std::ffi::OsStr>,
    {
        let args = self.leading_args
            .iter()
            .map(|arg| ::std::ffi::OsString::from(&**arg))
            .chain(args.into_iter().map(|arg| arg.as_ref().to_owned()))
            .collect::<Vec<_>>();

        ::duct::cmd(&*self.program, args).stdin_null()
    }
}

impl Default for YtdlpCommand {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ::std::fmt::Display for YtdlpCommand {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "{}", self.program)?;

        for arg in self.leading_args.iter() {
            write!(formatter, " {}", arg)?;
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Runs `script` through `sh` in place of yt-dlp; yt-dlp's own arguments land in `$@`.
    pub fn sh(script: &str) -> YtdlpCommand {
        YtdlpCommand::builder()
            .program("sh")
            .leading_args(vec![MaybeOwnedString::from("-c"), script.to_owned().into(), "sh".into()])
            .build()
    }

    #[test]
    fn displays_program_and_leading_args() {
        let command = YtdlpCommand::builder()
            .program("python3")
            .leading_args(vec![MaybeOwnedString::from("-m"), "yt_dlp".into()])
            .build();

        assert_eq!(command.to_string(), "python3 -m yt_dlp");
        assert_eq!(YtdlpCommand::default().to_string(), "yt-dlp");
    }
}
