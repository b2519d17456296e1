//! Versions command handler
//!
//! Runs a reconciliation and writes the JSON report.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use driftwatch_client::DEFAULT_CLOUD_RUN_URL;
use driftwatch_core::correlate::DeployJobs;
use driftwatch_core::domain::status::{DriftState, UNKNOWN_STATUS, VersionStatus};
use driftwatch_core::normalize::{DEFAULT_RULE, NormalizationRule};
use driftwatch_core::report;
use driftwatch_engine::repository::{HttpComputeRepository, HttpSourceControlRepository};
use driftwatch_engine::retry::RetryPolicy;
use driftwatch_engine::{EngineConfig, VersionRun};
use tracing::info;

use crate::config::{Config, EnvironmentSettings};

/// Arguments of the versions command
#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Name of the dev deploy job
    #[arg(long, env = "DEPLOY_DEV_JOB")]
    dev_job: String,

    /// Name of the stage deploy job
    #[arg(long, env = "DEPLOY_STAGE_JOB")]
    stage_job: String,

    /// Compute environment reported as the stage version
    #[arg(long, default_value = "stage")]
    stage_env: String,

    /// Compute environment reported as the prod version
    #[arg(long, default_value = "prod")]
    prod_env: String,

    /// Region of the compute services
    #[arg(long, env = "CLOUD_RUN_REGION", default_value = "europe-west1")]
    region: String,

    /// Image naming-convention rule (comma-separated require:/strip: steps)
    #[arg(long, env = "IMAGE_RULE", default_value = DEFAULT_RULE)]
    image_rule: NormalizationRule,

    /// Maximum number of concurrent upstream tasks
    #[arg(long, env = "DRIFTWATCH_CONCURRENCY", default_value = "8")]
    concurrency: usize,

    /// Timeout of a single upstream call, in seconds
    #[arg(long, env = "DRIFTWATCH_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    /// Deadline of one project or environment, in seconds
    #[arg(long, env = "DRIFTWATCH_DEADLINE_SECS", default_value = "120")]
    deadline_secs: u64,

    /// Retries for transient upstream failures
    #[arg(long, env = "DRIFTWATCH_RETRIES", default_value = "2")]
    retries: u32,

    /// Cloud Run Admin API endpoint
    #[arg(long, env = "CLOUD_RUN_API_URL", default_value = DEFAULT_CLOUD_RUN_URL)]
    cloud_run_url: String,

    /// Path of the JSON report
    #[arg(short, long, default_value = "versions.json")]
    output: PathBuf,
}

impl VersionsArgs {
    fn engine_config(&self) -> Result<EngineConfig> {
        let config = EngineConfig {
            concurrency: self.concurrency,
            call_timeout: Duration::from_secs(self.timeout_secs),
            task_deadline: Duration::from_secs(self.deadline_secs),
            retries: self.retries,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Handle the versions command
///
/// Configuration problems are returned as errors before any upstream call.
/// Once the run starts it always writes the report.
pub async fn handle_versions_command(args: VersionsArgs, config: &Config) -> Result<()> {
    let engine_config = args.engine_config()?;
    let stage = EnvironmentSettings::from_env(&args.stage_env, &args.region)?;
    let prod = EnvironmentSettings::from_env(&args.prod_env, &args.region)?;

    let retry = RetryPolicy::from(&engine_config);
    let source = HttpSourceControlRepository::new(
        config.gitlab_client(engine_config.call_timeout)?,
        config.group_ids.clone(),
        retry.clone(),
    );
    let compute = HttpComputeRepository::new(retry)
        .with_environment(
            &args.stage_env,
            stage.cloud_run_client(&args.cloud_run_url, engine_config.call_timeout)?,
        )
        .with_environment(
            &args.prod_env,
            prod.cloud_run_client(&args.cloud_run_url, engine_config.call_timeout)?,
        );

    info!("Image rule: {}", args.image_rule);

    let run = VersionRun::new(
        Arc::new(source),
        Arc::new(compute),
        DeployJobs::new(args.dev_job, args.stage_job),
        args.image_rule,
        &engine_config,
        stage.target,
        prod.target,
    );

    let statuses = run.execute().await;

    print_versions(&statuses);

    report::write_report(&args.output, &statuses)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    println!();
    println!(
        "{}",
        format!(
            "✓ Wrote {} record(s) to {}",
            statuses.len(),
            args.output.display()
        )
        .green()
        .bold()
    );

    Ok(())
}

/// Print the reconciled records as a table
fn print_versions(statuses: &[VersionStatus]) {
    if statuses.is_empty() {
        println!("{}", "No projects found.".yellow());
        return;
    }

    println!(
        "{}",
        format!(
            "{:<10} {:<10} {:<16} {:<28} {:<16} {:<16}",
            "DEV", "STAGE", "VERSION", "APP", "STAGE IMAGE", "PROD IMAGE"
        )
        .bold()
    );

    for status in statuses {
        print_version_row(status);
    }

    let drifted = statuses.iter().filter(|s| s.drift().any()).count();
    println!();
    if drifted > 0 {
        println!(
            "{}",
            format!("{} project(s) deployed behind their latest tag", drifted).yellow()
        );
    } else {
        println!("{}", "No drift detected.".green());
    }
}

fn print_version_row(status: &VersionStatus) {
    let tag = &status.gitlab_tag;
    let drift = status.drift();

    println!(
        "{} {} {} {} {} {}",
        pad(colorize_job_status(&tag.dev_status), &tag.dev_status, 10),
        pad(colorize_job_status(&tag.stage_status), &tag.stage_status, 10),
        format!("{:<16}", dash_if_empty(&tag.latest_version)).cyan(),
        format!("{:<28}", status.name).bold(),
        colorize_version(&status.stage_version, drift.stage, 16),
        colorize_version(&status.prod_version, drift.prod, 16),
    );

    if !tag.link.is_empty() {
        println!("{:>22}{}", "", tag.link.dimmed());
    }
    if !status.unresolved.is_empty() {
        println!(
            "{:>22}{}",
            "",
            format!("unresolved: {}", status.unresolved.join(", ")).red()
        );
    }
}

/// Colorize a deploy-job status for display
fn colorize_job_status(status: &str) -> ColoredString {
    match status {
        "success" => status.green(),
        "failed" | "canceled" => status.red(),
        "" => "-".dimmed(),
        UNKNOWN_STATUS => status.yellow(),
        _ => status.normal(),
    }
}

fn colorize_version(version: &str, drift: DriftState, width: usize) -> ColoredString {
    let text = format!("{:<width$}", dash_if_empty(version), width = width);
    match drift {
        DriftState::Current => text.green(),
        DriftState::Behind => text.red(),
        DriftState::Unknown => text.normal(),
    }
}

/// Left-align a colored value, padding by the width of its plain text
fn pad(colored: ColoredString, plain: &str, width: usize) -> String {
    let visible = if plain.is_empty() { 1 } else { plain.chars().count() };
    format!("{}{}", colored, " ".repeat(width.saturating_sub(visible)))
}

fn dash_if_empty(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
