//! Driftwatch CLI
//!
//! Command-line interface for reconciling released versions against deployed
//! versions, plus a few repository maintenance actions.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "driftwatch")]
#[command(about = "Release vs. deployment drift reports for GitLab projects", long_about = None)]
struct Cli {
    /// Source-control host URL
    #[arg(long, env = "GITLAB_HOST")]
    gitlab_host: Option<String>,

    /// Private access token
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    gitlab_token: Option<String>,

    /// Group ids whose projects are processed (space- or comma-separated)
    #[arg(long, env = "GROUP_IDS")]
    group_ids: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the report tables
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "driftwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::new(cli.gitlab_host, cli.gitlab_token, cli.group_ids)?;

    handle_command(cli.command, &config).await
}
