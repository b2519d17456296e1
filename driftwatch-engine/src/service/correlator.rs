//! Tag-pipeline-job correlator
//!
//! Determines the latest tag of a project and the deploy-job outcomes of
//! the pipeline that built it.

use std::sync::Arc;

use anyhow::Result;
use driftwatch_core::correlate::{self, DeployJobs};
use driftwatch_core::domain::project::Project;
use driftwatch_core::domain::status::TagStatus;
use tracing::debug;

use crate::repository::SourceControlRepository;

/// Correlates tags, pipelines and deploy jobs of a project
pub struct Correlator {
    repo: Arc<dyn SourceControlRepository>,
    deploy_jobs: DeployJobs,
}

impl Correlator {
    pub fn new(repo: Arc<dyn SourceControlRepository>, deploy_jobs: DeployJobs) -> Self {
        Self { repo, deploy_jobs }
    }

    /// Correlates one project
    ///
    /// # Returns
    /// `None` when the project has no tags. Otherwise the latest tag with the
    /// link and deploy-job statuses of its most recent pipeline; statuses
    /// stay unknown and the link empty when no pipeline ran for the tag.
    pub async fn correlate(&self, project: &Project) -> Result<Option<TagStatus>> {
        let tags = self.repo.list_tags(project.id).await?;
        let Some(latest) = correlate::latest_tag(&tags) else {
            debug!("Project {} has no tags", project.name);
            return Ok(None);
        };

        let mut status = TagStatus::for_tag(latest.name.clone());

        let mut pipelines = self.repo.list_tag_pipelines(project.id).await?;
        correlate::order_pipelines(&mut pipelines);

        let Some(pipeline) = correlate::select_pipeline(&pipelines, &latest.name) else {
            debug!("No pipeline found for {} of {}", latest.name, project.name);
            return Ok(Some(status));
        };

        status.link = pipeline.link.clone();

        let jobs = self.repo.list_pipeline_jobs(project.id, pipeline.id).await?;
        correlate::apply_jobs(&mut status, &jobs, &self.deploy_jobs);

        debug!(
            "{}: {} dev={} stage={}",
            project.name, status.latest_version, status.dev_status, status.stage_status
        );
        Ok(Some(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSourceControl, job, pipeline};
    use driftwatch_core::domain::status::UNKNOWN_STATUS;
    use driftwatch_core::domain::tag::Tag;

    fn correlator(fake: FakeSourceControl) -> Correlator {
        Correlator::new(Arc::new(fake), DeployJobs::new("deploy-dev", "deploy-stage"))
    }

    #[tokio::test]
    async fn test_project_without_tags_is_absent() {
        let fake = FakeSourceControl::default().with_project(1, "B", vec![]);
        let result = correlator(fake).correlate(&Project::new(1, "B")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_tag_without_pipeline_is_unknown() {
        let fake = FakeSourceControl::default()
            .with_project(1, "A", vec![Tag::new("v1.0.0")])
            .with_pipelines(1, vec![pipeline(10, "v0.9.0", None)]);

        let status = correlator(fake)
            .correlate(&Project::new(1, "A"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(status.latest_version, "v1.0.0");
        assert_eq!(status.dev_status, UNKNOWN_STATUS);
        assert_eq!(status.stage_status, UNKNOWN_STATUS);
        assert!(status.link.is_empty());
    }

    #[tokio::test]
    async fn test_most_recent_matching_pipeline_is_used() {
        let fake = FakeSourceControl::default()
            .with_project(1, "A", vec![Tag::new("v1.0.0"), Tag::new("v0.9.0")])
            .with_pipelines(
                1,
                vec![
                    pipeline(10, "v1.0.0", Some(100)),
                    pipeline(11, "v1.0.0", Some(200)),
                ],
            )
            .with_jobs(1, 10, vec![job(1, "deploy-dev", "failed")])
            .with_jobs(
                1,
                11,
                vec![
                    job(2, "deploy-dev", "success"),
                    job(3, "deploy-stage", "failed"),
                ],
            );

        let status = correlator(fake)
            .correlate(&Project::new(1, "A"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(status.dev_status, "success");
        assert_eq!(status.stage_status, "failed");
        assert!(status.link.ends_with("/pipelines/11"));
    }

    #[tokio::test]
    async fn test_duplicate_job_names_last_wins() {
        let fake = FakeSourceControl::default()
            .with_project(1, "A", vec![Tag::new("v1.0.0")])
            .with_pipelines(1, vec![pipeline(10, "v1.0.0", None)])
            .with_jobs(
                1,
                10,
                vec![
                    job(1, "deploy-dev", "success"),
                    job(2, "deploy-dev", "canceled"),
                ],
            );

        let status = correlator(fake)
            .correlate(&Project::new(1, "A"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(status.dev_status, "canceled");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_an_error() {
        let fake = FakeSourceControl::default().with_failing_tags(1, "malformed response");
        let result = correlator(fake).correlate(&Project::new(1, "A")).await;
        assert!(result.is_err());
    }
}
