//! Renovate rebase command handler
//!
//! Rebases every open merge request whose title carries the Renovate
//! commit prefix.

use anyhow::{Result, bail};
use clap::Args;
use colored::*;
use driftwatch_core::domain::project::MergeRequest;
use tracing::{error, info};

use super::{describe_project_failure, enumerate_projects};
use crate::config::Config;

/// Arguments of the renovate command
#[derive(Args, Debug)]
pub struct RenovateArgs {
    /// Title prefix of the merge requests to rebase
    #[arg(long, env = "RENOVATE_COMMIT_PREFIX")]
    prefix: String,
}

/// Handle the renovate command
pub async fn handle_renovate_command(args: RenovateArgs, config: &Config) -> Result<()> {
    if args.prefix.trim().is_empty() {
        bail!("Renovate commit prefix cannot be empty");
    }

    let (client, projects) = enumerate_projects(config).await?;

    let mut rebased = 0usize;
    let mut failed = 0usize;

    for project in &projects {
        let merge_requests = match client.list_open_merge_requests(project.id).await {
            Ok(mrs) => mrs,
            Err(e) => {
                failed += 1;
                error!(
                    "Failed to list merge requests of {}: {}",
                    project.name,
                    describe_project_failure(&e)
                );
                continue;
            }
        };

        for mr in select_renovate(&merge_requests, &args.prefix) {
            match client.rebase_merge_request(project.id, mr.iid).await {
                Ok(status) => {
                    rebased += 1;
                    info!("Rebase requested for {}!{}", project.name, mr.iid);
                    println!(
                        "  {} {}!{} {} {} {}",
                        "▸".cyan(),
                        project.name.bold(),
                        mr.iid,
                        mr.title,
                        branch_flow(mr).dimmed(),
                        status.to_string().dimmed()
                    );
                }
                Err(e) => {
                    failed += 1;
                    error!("Failed to rebase {}!{}: {}", project.name, mr.iid, e);
                    println!(
                        "  {} {}!{} {}",
                        "✗".red(),
                        project.name.bold(),
                        mr.iid,
                        e.to_string().red()
                    );
                }
            }
        }
    }

    println!();
    println!(
        "{} rebase(s) requested, {} failure(s)",
        rebased.to_string().green(),
        failed.to_string().red()
    );

    Ok(())
}

/// Merge requests whose title starts with the prefix
fn select_renovate<'a>(
    merge_requests: &'a [MergeRequest],
    prefix: &'a str,
) -> impl Iterator<Item = &'a MergeRequest> {
    merge_requests
        .iter()
        .filter(move |mr| mr.title.starts_with(prefix))
}

/// `source -> target` of a merge request
fn branch_flow(mr: &MergeRequest) -> String {
    format!("{} -> {}", mr.source_branch, mr.target_branch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mr(iid: u64, title: &str) -> MergeRequest {
        MergeRequest {
            id: iid + 1000,
            iid,
            project_id: 1,
            title: title.to_string(),
            source_branch: format!("branch-{}", iid),
            target_branch: "main".to_string(),
        }
    }

    #[test]
    fn test_branch_flow() {
        assert_eq!(branch_flow(&mr(7, "chore(deps): bump")), "branch-7 -> main");
    }

    #[test]
    fn test_select_renovate_matches_prefix_only() {
        let mrs = vec![
            mr(1, "chore(deps): update rust crate serde"),
            mr(2, "feat: new endpoint"),
            mr(3, "chore(deps): update tokio"),
            mr(4, "Draft: chore(deps): pin"),
        ];

        let iids: Vec<u64> = select_renovate(&mrs, "chore(deps):").map(|m| m.iid).collect();
        assert_eq!(iids, vec![1, 3]);
    }
}
