//! Command-line argument parsing for the session-feed binary.

use crate::error::{FeedError, FeedResult};
use crate::startup::FeedConfig;

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Tail the feed (default)
    Run(CliArgs),
}

/// Flags that override the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub url: Option<String>,
    pub workspace: Option<String>,
    pub session: Option<String>,
}

impl CliArgs {
    /// Layer the flags over `config`.
    pub fn apply(self, mut config: FeedConfig) -> FeedConfig {
        if let Some(url) = self.url {
            config.base_url = url;
        }
        if let Some(workspace) = self.workspace {
            config.workspace = Some(workspace);
        }
        if let Some(session) = self.session {
            config.session = Some(session);
        }
        config
    }
}

/// Parse command-line arguments.
///
/// Value flags accept both `--flag value` and `--flag=value`. Unknown
/// arguments are ignored.
///
/// # Examples
///
/// ```
/// use session_feed::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["session-feed".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap(), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> FeedResult<CliCommand>
where
    I: Iterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    // Skip the program name
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };

        let slot = match flag.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--url" => &mut parsed.url,
            "--workspace" => &mut parsed.workspace,
            "--session" => &mut parsed.session,
            _ => continue,
        };

        let value = match inline {
            Some(value) => value,
            None => args
                .next()
                .ok_or_else(|| FeedError::config(flag.as_str(), "missing value"))?,
        };
        *slot = Some(value);
    }

    Ok(CliCommand::Run(parsed))
}
