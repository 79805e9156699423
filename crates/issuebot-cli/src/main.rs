mod cli_args;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli_args::Cli;

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let report = issuebot_runtime::run_issue_bot(cli.runtime_config()).await?;
    info!(
        event = report.event_kind.as_str(),
        number = report.issue_number,
        pull_request = report.is_pull_request,
        added_labels = ?report.added_labels,
        dispatch = ?report.dispatch,
        "issue bot finished"
    );
    Ok(())
}
