//! Pipeline-related API endpoints

use crate::error::Result;
use crate::{GitLabClient, PER_PAGE};
use driftwatch_core::domain::pipeline::{Job, Pipeline};
use tracing::debug;

impl GitLabClient {
    // =============================================================================
    // Pipelines
    // =============================================================================

    /// List tag-triggered pipelines of a project, newest first
    ///
    /// Only the newest page is fetched; the latest tag's pipeline is
    /// expected among it.
    pub async fn list_tag_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>> {
        let pipelines: Vec<Pipeline> = self
            .get_json(
                &format!("/projects/{}/pipelines", project_id),
                &[
                    ("scope", "tags".to_string()),
                    ("order_by", "id".to_string()),
                    ("sort", "desc".to_string()),
                    ("per_page", PER_PAGE.to_string()),
                ],
            )
            .await?;

        if pipelines.len() >= PER_PAGE as usize {
            debug!(
                "Project {} has more than {} tag pipelines; older ones were not read",
                project_id, PER_PAGE
            );
        }
        Ok(pipelines)
    }

    /// List every job of a pipeline
    pub async fn list_pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>> {
        self.get_all(
            &format!("/projects/{}/pipelines/{}/jobs", project_id, pipeline_id),
            &[],
        )
        .await
    }
}
