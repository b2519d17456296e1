//! Stale-branch listing command handler

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::*;
use driftwatch_core::domain::project::Branch;
use tracing::error;

use super::{describe_project_failure, enumerate_projects};
use crate::config::Config;

/// A branch together with the project it belongs to
struct BranchRow {
    project: String,
    branch: String,
    authored: Option<DateTime<Utc>>,
    merged: bool,
}

/// Handle the branches command
///
/// Read-only. Prints every branch ordered by the authored date of its head
/// commit, oldest first.
pub async fn handle_branches_command(config: &Config) -> Result<()> {
    let (client, projects) = enumerate_projects(config).await?;

    let mut rows = Vec::new();
    for project in &projects {
        match client.list_branches(project.id).await {
            Ok(branches) => rows.extend(
                branches
                    .into_iter()
                    .map(|branch| BranchRow::new(&project.name, branch)),
            ),
            Err(e) => error!(
                "Failed to list branches of {}: {}",
                project.name,
                describe_project_failure(&e)
            ),
        }
    }

    if rows.is_empty() {
        println!("{}", "No branches found.".yellow());
        return Ok(());
    }

    sort_oldest_first(&mut rows);

    println!(
        "{}",
        format!("{:<12} {:<28} {}", "AUTHORED", "PROJECT", "BRANCH").bold()
    );
    for row in &rows {
        let date = row
            .authored
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let branch = if row.merged {
            format!("{} {}", row.branch, "(merged)".dimmed())
        } else {
            row.branch.clone()
        };
        println!(
            "{} {} {}",
            format!("{:<12}", date).dimmed(),
            format!("{:<28}", row.project).bold(),
            branch
        );
    }

    Ok(())
}

impl BranchRow {
    fn new(project: &str, branch: Branch) -> Self {
        Self {
            project: project.to_string(),
            authored: branch.commit.authored_date.or(branch.commit.committed_date),
            merged: branch.merged,
            branch: branch.name,
        }
    }
}

/// Oldest first; branches without a date go last
fn sort_oldest_first(rows: &mut [BranchRow]) {
    rows.sort_by_key(|row| (row.authored.is_none(), row.authored));
}
