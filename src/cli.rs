// SPDX-License-Identifier: MIT
//
// Command line.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

/// View man page sources in the terminal.
#[derive(Parser, Debug)]
#[command(name = "n-man", version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (repeat for more detail)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbosity: u8,

    /// Write logs to FILE
    #[arg(long = "log", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Man page sources to view, plain or gzip-compressed, in order
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Parse `args`, the first of which is the program name.
    ///
    /// # Errors
    ///
    /// A clap error for bad usage, and also for `--help` and `--version`,
    /// which clap reports as errors that print to stdout.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// The log level asked for on the command line, if any.
    ///
    /// `--log` alone implies `info`; otherwise each `-v` steps from `info`
    /// to `debug` to `trace`.
    #[must_use]
    pub const fn level_filter(&self) -> Option<LevelFilter> {
        match self.verbosity {
            0 if self.log_file.is_some() => Some(LevelFilter::Info),
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_args(std::iter::once("n-man").chain(args.iter().copied()))
    }

    #[test]
    fn files_in_order() {
        let cli = parse(&["ls.1", "grep.1.gz"]).unwrap();
        assert_eq!(
            cli.files,
            vec![PathBuf::from("ls.1"), PathBuf::from("grep.1.gz")]
        );
        assert_eq!(cli.verbosity, 0);
        assert_eq!(cli.log_file, None);
        assert_eq!(cli.level_filter(), None);
    }

    #[test]
    fn no_files_is_a_usage_error() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn unknown_flag_is_a_usage_error() {
        let err = parse(&["--frobnicate", "ls.1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn help_and_version_go_to_stdout() {
        for flag in ["-h", "--help"] {
            let err = parse(&[flag]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
            assert!(!err.use_stderr());
        }
        for flag in ["-V", "--version"] {
            let err = parse(&[flag]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DisplayVersion);
            assert!(!err.use_stderr());
        }
    }

    #[test]
    fn verbosity_levels() {
        let level = |args: &[&str]| parse(args).unwrap().level_filter();
        assert_eq!(level(&["-v", "a"]), Some(LevelFilter::Info));
        assert_eq!(level(&["-vv", "a"]), Some(LevelFilter::Debug));
        assert_eq!(level(&["-v", "-v", "-v", "a"]), Some(LevelFilter::Trace));
        assert_eq!(level(&["--log", "n-man.log", "a"]), Some(LevelFilter::Info));
        assert_eq!(
            level(&["--log", "n-man.log", "-vv", "a"]),
            Some(LevelFilter::Debug)
        );
    }

    #[test]
    fn command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
