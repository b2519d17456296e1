//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod branches;
mod merged;
mod renovate;
mod versions;

pub use renovate::RenovateArgs;
pub use versions::VersionsArgs;

use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use driftwatch_client::{ClientError, GitLabClient};
use driftwatch_core::domain::project::Project;
use driftwatch_engine::repository::{HttpSourceControlRepository, SourceControlRepository};
use driftwatch_engine::retry::RetryPolicy;

use crate::config::Config;

/// Timeout of a single request issued by the maintenance commands
const MAINTENANCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Write a report of latest tags, deploy-job statuses and deployed versions
    Versions(VersionsArgs),
    /// Delete branches already merged into the default branch
    Merged {
        /// Only list the projects that would be cleaned up
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebase open merge requests created by Renovate
    Renovate(RenovateArgs),
    /// List branches by last commit date, oldest first
    Branches,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Versions(args) => versions::handle_versions_command(args, config).await,
        Commands::Merged { dry_run } => merged::handle_merged_command(dry_run, config).await,
        Commands::Renovate(args) => renovate::handle_renovate_command(args, config).await,
        Commands::Branches => branches::handle_branches_command(config).await,
    }
}

/// Enumerate the projects of the configured groups
///
/// Groups that fail to list are skipped with a warning.
async fn enumerate_projects(config: &Config) -> Result<(GitLabClient, Vec<Project>)> {
    let client = config.gitlab_client(MAINTENANCE_TIMEOUT)?;
    let repo = HttpSourceControlRepository::new(
        client.clone(),
        config.group_ids.clone(),
        RetryPolicy::new(1, MAINTENANCE_TIMEOUT),
    );

    let projects = repo.list_projects().await?;
    Ok((client, projects))
}

/// Describes a failed per-project call
///
/// A 404 on a project endpoint means the project was deleted or moved after
/// it was listed.
fn describe_project_failure(error: &ClientError) -> String {
    if error.is_not_found() {
        "project no longer exists".to_string()
    } else {
        error.to_string()
    }
}
