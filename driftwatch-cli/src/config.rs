//! Configuration module
//!
//! Settings shared by every command, resolved once at startup and passed
//! down explicitly. Invalid settings abort before any network call.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use driftwatch_client::{CloudRunClient, GitLabClient};
use driftwatch_engine::EnvironmentTarget;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the source-control host
    pub gitlab_host: String,
    /// Private access token
    pub gitlab_token: String,
    /// Groups whose projects are processed
    pub group_ids: Vec<String>,
}

impl Config {
    /// Builds and validates the configuration
    pub fn new(
        gitlab_host: Option<String>,
        gitlab_token: Option<String>,
        group_ids: Option<String>,
    ) -> Result<Self> {
        let config = Self {
            gitlab_host: gitlab_host.unwrap_or_default().trim().to_string(),
            gitlab_token: gitlab_token.unwrap_or_default().trim().to_string(),
            group_ids: parse_group_ids(group_ids.as_deref().unwrap_or_default()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.gitlab_host.is_empty() {
            bail!("GITLAB_HOST is not set");
        }

        if !self.gitlab_host.starts_with("http://") && !self.gitlab_host.starts_with("https://") {
            bail!("GITLAB_HOST must start with http:// or https://");
        }

        if self.gitlab_token.is_empty() {
            bail!("GITLAB_TOKEN is not set");
        }

        if self.group_ids.is_empty() {
            bail!("GROUP_IDS is not set");
        }

        Ok(())
    }

    /// Creates the source-control client
    pub fn gitlab_client(&self, timeout: Duration) -> Result<GitLabClient> {
        Ok(GitLabClient::with_client(
            &self.gitlab_host,
            &self.gitlab_token,
            http_client(timeout)?,
        ))
    }
}

/// Connection settings of one compute environment
#[derive(Debug, Clone)]
pub struct EnvironmentSettings {
    pub target: EnvironmentTarget,
    pub access_token: String,
}

impl EnvironmentSettings {
    /// Resolves settings of `environment` from the process environment
    ///
    /// Reads `PROJECT_ID_<ENV>` and `GCP_ACCESS_TOKEN_<ENV>`.
    pub fn from_env(environment: &str, region: &str) -> Result<Self> {
        Self::from_lookup(environment, region, |key| std::env::var(key).ok())
    }

    /// Resolves settings of `environment` through `lookup`
    pub fn from_lookup(
        environment: &str,
        region: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let suffix = environment.to_uppercase();
        let require = |prefix: &str| {
            let key = format!("{}_{}", prefix, suffix);
            lookup(&key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} is not set", key))
        };

        Ok(Self {
            target: EnvironmentTarget::new(environment, require("PROJECT_ID")?, region),
            access_token: require("GCP_ACCESS_TOKEN")?,
        })
    }

    /// Creates the compute client of this environment
    pub fn cloud_run_client(&self, base_url: &str, timeout: Duration) -> Result<CloudRunClient> {
        Ok(CloudRunClient::with_client(
            base_url,
            &self.access_token,
            http_client(timeout)?,
        ))
    }
}

/// Splits a group list on whitespace and commas
pub fn parse_group_ids(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}
