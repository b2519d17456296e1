//! Merged-branch cleanup command handler

use anyhow::Result;
use colored::*;
use tracing::{error, info};

use super::{describe_project_failure, enumerate_projects};
use crate::config::Config;

/// Handle the merged command
///
/// Failures on one project are logged and counted; the rest still run.
pub async fn handle_merged_command(dry_run: bool, config: &Config) -> Result<()> {
    let (client, projects) = enumerate_projects(config).await?;

    if projects.is_empty() {
        println!("{}", "No projects found.".yellow());
        return Ok(());
    }

    if dry_run {
        println!("{}", "Dry run, nothing will be deleted:".bold());
        for project in &projects {
            println!(
                "  {} {} {}",
                "▸".cyan(),
                project.name.bold(),
                format!("(#{})", project.id).dimmed()
            );
        }
        return Ok(());
    }

    let mut failed = 0usize;
    for project in &projects {
        match client.delete_merged_branches(project.id).await {
            Ok(status) => {
                info!("Deleted merged branches of {} ({})", project.name, status);
                println!(
                    "  {} {} {}",
                    "✓".green(),
                    project.name.bold(),
                    status.to_string().dimmed()
                );
            }
            Err(e) => {
                failed += 1;
                let reason = describe_project_failure(&e);
                error!("Failed to delete merged branches of {}: {}", project.name, reason);
                println!("  {} {} {}", "✗".red(), project.name.bold(), reason.red());
            }
        }
    }

    println!();
    println!(
        "{} project(s) cleaned up, {} failed",
        (projects.len() - failed).to_string().green(),
        failed.to_string().red()
    );

    Ok(())
}
