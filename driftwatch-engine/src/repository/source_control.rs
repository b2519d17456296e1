//! Source-control repository
//!
//! Handles communication with the source-control host for reconciliation:
//! - Enumerating projects of the configured groups
//! - Fetching tags, tag pipelines and pipeline jobs

use anyhow::Result;
use async_trait::async_trait;
use driftwatch_client::GitLabClient;
use driftwatch_core::domain::pipeline::{Job, Pipeline};
use driftwatch_core::domain::project::Project;
use driftwatch_core::domain::tag::Tag;
use tracing::{info, warn};

use crate::retry::RetryPolicy;

/// Repository trait for source-control reads
#[async_trait]
pub trait SourceControlRepository: Send + Sync {
    /// Lists the projects of every configured group, in group order
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Lists the tags of a project, newest version first
    async fn list_tags(&self, project_id: u64) -> Result<Vec<Tag>>;

    /// Lists the tag-triggered pipelines of a project
    async fn list_tag_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>>;

    /// Lists the jobs of one pipeline
    async fn list_pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>>;
}

/// HTTP implementation of SourceControlRepository
pub struct HttpSourceControlRepository {
    client: GitLabClient,
    group_ids: Vec<String>,
    retry: RetryPolicy,
}

impl HttpSourceControlRepository {
    /// Creates a new HTTP source-control repository
    ///
    /// # Arguments
    /// * `client` - Configured host client
    /// * `group_ids` - Groups whose projects are reconciled
    /// * `retry` - Timeout and retry policy applied to every call
    pub fn new(client: GitLabClient, group_ids: Vec<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            group_ids,
            retry,
        }
    }
}

#[async_trait]
impl SourceControlRepository for HttpSourceControlRepository {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let mut projects = Vec::new();

        for group_id in &self.group_ids {
            info!("Retrieving projects in group {}", group_id);
            let listed = self
                .retry
                .call(&format!("list projects of group {}", group_id), || {
                    self.client.list_group_projects(group_id)
                })
                .await;

            match listed {
                Ok(mut group_projects) => projects.append(&mut group_projects),
                Err(e) => warn!("Skipping group {}: {:#}", group_id, e),
            }
        }

        Ok(projects)
    }

    async fn list_tags(&self, project_id: u64) -> Result<Vec<Tag>> {
        self.retry
            .call(&format!("list tags of project {}", project_id), || {
                self.client.list_tags(project_id)
            })
            .await
    }

    async fn list_tag_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>> {
        self.retry
            .call(&format!("list pipelines of project {}", project_id), || {
                self.client.list_tag_pipelines(project_id)
            })
            .await
    }

    async fn list_pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>> {
        self.retry
            .call(
                &format!("list jobs of pipeline {} in project {}", pipeline_id, project_id),
                || self.client.list_pipeline_jobs(project_id, pipeline_id),
            )
            .await
    }
}
