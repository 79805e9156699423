use std::path::PathBuf;

use clap::Parser;
use issuebot_runtime::IssueBotRuntimeConfig;

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "issuebot",
    about = "Label, answer, and close new GitHub issues and pull requests from a workflow event",
    version
)]
/// Command-line and environment configuration for one bot invocation.
pub(crate) struct Cli {
    #[arg(
        long = "github-repo",
        env = "GITHUB_REPOSITORY",
        help = "GitHub repository in owner/repo format"
    )]
    pub(crate) github_repo: String,

    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token used for API access"
    )]
    pub(crate) github_token: String,

    #[arg(
        long = "github-event-path",
        env = "GITHUB_EVENT_PATH",
        help = "Path to the JSON event payload written by the workflow runner"
    )]
    pub(crate) github_event_path: PathBuf,

    #[arg(
        long = "github-api-base",
        env = "GITHUB_API_URL",
        default_value = "https://api.github.com",
        help = "GitHub API base URL"
    )]
    pub(crate) github_api_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "ISSUEBOT_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Timeout in milliseconds for each GitHub API request"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "ISSUEBOT_RETRY_MAX_ATTEMPTS",
        default_value_t = 1,
        value_parser = parse_positive_usize,
        help = "Attempts per GitHub API call for rate limits and server errors (1 disables retries)"
    )]
    pub(crate) retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "ISSUEBOT_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        value_parser = parse_positive_u64,
        help = "Base delay in milliseconds for exponential retry back-off"
    )]
    pub(crate) retry_base_delay_ms: u64,

    #[arg(
        long = "scripts-dir",
        env = "ISSUEBOT_SCRIPTS_DIR",
        help = "Directory whose script file names become keywords for the 'scripts' label"
    )]
    pub(crate) scripts_dir: Option<PathBuf>,

    #[arg(
        long = "script-extension",
        env = "ISSUEBOT_SCRIPT_EXTENSION",
        default_value = ".py",
        requires = "scripts_dir",
        help = "File name suffix selecting script files inside --scripts-dir"
    )]
    pub(crate) script_extension: String,
}

impl Cli {
    pub(crate) fn runtime_config(self) -> IssueBotRuntimeConfig {
        IssueBotRuntimeConfig {
            repo_slug: self.github_repo,
            api_base: self.github_api_base,
            token: self.github_token,
            event_path: self.github_event_path,
            request_timeout_ms: self.request_timeout_ms,
            retry_max_attempts: self.retry_max_attempts,
            retry_base_delay_ms: self.retry_base_delay_ms,
            scripts_dir: self.scripts_dir,
            script_extension: self.script_extension,
        }
    }
}
