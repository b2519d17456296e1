//! Reconciliation run
//!
//! Fans correlation and image resolution out over the worker pool, waits
//! for every task, then joins the results. Failures stay scoped to the
//! project or environment that produced them.

use std::sync::Arc;

use driftwatch_core::collision;
use driftwatch_core::correlate::DeployJobs;
use driftwatch_core::domain::project::Project;
use driftwatch_core::domain::status::VersionStatus;
use driftwatch_core::normalize::NormalizationRule;
use driftwatch_core::reconcile::{self, EnvironmentImages, TagOutcome, TagStatusMap};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::{EngineConfig, EnvironmentTarget};
use crate::repository::{ComputeRepository, SourceControlRepository};
use crate::retry;
use crate::scheduler::WorkerPool;
use crate::service::{Correlator, ImageResolver};

/// One reconciliation run over all projects and both compute environments
pub struct VersionRun {
    source: Arc<dyn SourceControlRepository>,
    correlator: Arc<Correlator>,
    resolver: Arc<ImageResolver>,
    pool: WorkerPool,
    stage: EnvironmentTarget,
    prod: EnvironmentTarget,
}

impl VersionRun {
    /// Creates a new run
    ///
    /// # Arguments
    /// * `source` - Source-control repository
    /// * `compute` - Compute repository
    /// * `deploy_jobs` - Names of the dev and stage deploy jobs
    /// * `rule` - Image naming-convention rule
    /// * `config` - Concurrency and deadline settings
    /// * `stage` - Environment reported as the stage version
    /// * `prod` - Environment reported as the prod version
    pub fn new(
        source: Arc<dyn SourceControlRepository>,
        compute: Arc<dyn ComputeRepository>,
        deploy_jobs: DeployJobs,
        rule: NormalizationRule,
        config: &EngineConfig,
        stage: EnvironmentTarget,
        prod: EnvironmentTarget,
    ) -> Self {
        Self {
            correlator: Arc::new(Correlator::new(Arc::clone(&source), deploy_jobs)),
            resolver: Arc::new(ImageResolver::new(compute, rule)),
            source,
            pool: WorkerPool::new(config.concurrency, config.task_deadline),
            stage,
            prod,
        }
    }

    /// Executes the run
    ///
    /// Always completes. Projects or environments that could not be read
    /// appear with empty or unknown fields and are listed as unresolved.
    ///
    /// # Returns
    /// One record per project, in project enumeration order
    pub async fn execute(&self) -> Vec<VersionStatus> {
        let projects = match self.source.list_projects().await {
            Ok(projects) => projects,
            Err(e) => {
                error!("Failed to enumerate projects: {:#}", e);
                Vec::new()
            }
        };

        info!("Reconciling {} project(s)", projects.len());

        let (tags, environments) =
            tokio::join!(self.correlate_all(&projects), self.resolve_environments());
        let [stage, prod] = environments;

        let statuses = reconcile::reconcile(&projects, &tags, &stage, &prod);

        let unresolved = statuses.iter().filter(|s| !s.unresolved.is_empty()).count();
        if unresolved > 0 {
            warn!("{} project(s) have unresolved sources", unresolved);
        }
        info!("Reconciled {} project(s)", statuses.len());

        statuses
    }

    /// Correlates every project; projects without tags are left out
    async fn correlate_all(&self, projects: &[Project]) -> TagStatusMap {
        let correlator = Arc::clone(&self.correlator);
        let results = self
            .pool
            .run_all(projects.to_vec(), move |project| {
                let correlator = Arc::clone(&correlator);
                let span = info_span!("correlate", project = %project.name);
                async move { correlator.correlate(&project).await }.instrument(span)
            })
            .await;

        let mut tags = TagStatusMap::new();
        for (project, result) in projects.iter().zip(results) {
            let outcome = match result {
                Ok(Some(status)) => TagOutcome::Resolved(status),
                Ok(None) => continue,
                Err(e) => {
                    let kind = if retry::is_permanent(&e) {
                        "rejected or malformed response"
                    } else {
                        "upstream unavailable"
                    };
                    warn!("Project {} unresolved ({}): {:#}", project.name, kind, e);
                    TagOutcome::Unresolved(format!("{:#}", e))
                }
            };

            if collision::last_write_wins(&mut tags, project.name.clone(), outcome).is_some() {
                debug!("Project name {} appears more than once", project.name);
            }
        }

        tags
    }

    /// Resolves stage and prod images
    async fn resolve_environments(&self) -> [EnvironmentImages; 2] {
        let resolver = Arc::clone(&self.resolver);
        let targets = vec![self.stage.clone(), self.prod.clone()];

        let mut results = self
            .pool
            .run_all(targets, move |target| {
                let resolver = Arc::clone(&resolver);
                let span = info_span!("resolve", environment = %target.name);
                async move { resolver.resolve(&target).await }.instrument(span)
            })
            .await
            .into_iter();

        [&self.stage, &self.prod].map(|target| match results.next() {
            Some(Ok(versions)) => EnvironmentImages::resolved(target.name.clone(), versions),
            Some(Err(e)) => {
                warn!("Environment {} unresolved: {:#}", target.name, e);
                EnvironmentImages::unresolved(target.name.clone())
            }
            None => EnvironmentImages::unresolved(target.name.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::{FakeCompute, FakeSourceControl, job, pipeline};
    use driftwatch_core::domain::service::DeployedService;
    use driftwatch_core::domain::status::{TagStatus, UNKNOWN_STATUS};
    use driftwatch_core::domain::tag::Tag;

    fn targets() -> (EnvironmentTarget, EnvironmentTarget) {
        (
            EnvironmentTarget::new("stage", "acct-stage", "europe-west1"),
            EnvironmentTarget::new("prod", "acct-prod", "europe-west1"),
        )
    }

    fn run(source: FakeSourceControl, compute: FakeCompute, config: &EngineConfig) -> VersionRun {
        let (stage, prod) = targets();
        VersionRun::new(
            Arc::new(source),
            Arc::new(compute),
            DeployJobs::new("deploy-dev", "deploy-stage"),
            "require:dsm-rsp,strip:dsm-rsp-".parse().unwrap(),
            config,
            stage,
            prod,
        )
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let source = FakeSourceControl::default()
            .with_project(1, "A", vec![Tag::new("v1.0.0")])
            .with_project(2, "B", vec![])
            .with_pipelines(1, vec![pipeline(10, "v1.0.0", Some(100))])
            .with_jobs(
                1,
                10,
                vec![
                    job(1, "deploy-dev", "success"),
                    job(2, "deploy-stage", "failed"),
                ],
            );
        let compute = FakeCompute::default()
            .with_services(
                "stage",
                vec![DeployedService::new("a", "eu.gcr.io/acct-stage/dsm-rsp-A:v1.0.0")],
            )
            .with_services(
                "prod",
                vec![DeployedService::new("a", "eu.gcr.io/acct-prod/dsm-rsp-A:v0.9.0")],
            );

        let statuses = run(source, compute, &EngineConfig::default()).execute().await;

        assert_eq!(statuses.len(), 2);
        let a = &statuses[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.gitlab_tag.latest_version, "v1.0.0");
        assert_eq!(a.gitlab_tag.dev_status, "success");
        assert_eq!(a.gitlab_tag.stage_status, "failed");
        assert!(a.gitlab_tag.link.ends_with("/pipelines/10"));
        assert_eq!(a.stage_version, "v1.0.0");
        assert_eq!(a.prod_version, "v0.9.0");

        let b = &statuses[1];
        assert_eq!(b.name, "B");
        assert_eq!(b.gitlab_tag, TagStatus::default());
        assert!(b.stage_version.is_empty());
        assert!(b.prod_version.is_empty());
        assert!(b.unresolved.is_empty());
    }

    #[tokio::test]
    async fn test_failing_project_does_not_abort_run() {
        let source = FakeSourceControl::default()
            .with_project(1, "A", vec![Tag::new("v1.0.0")])
            .with_project(2, "B", vec![Tag::new("v2.0.0")])
            .with_failing_tags(1, "expected value at line 1 column 1");
        let compute = FakeCompute::default()
            .with_services("stage", vec![])
            .with_services("prod", vec![]);

        let statuses = run(source, compute, &EngineConfig::default()).execute().await;

        assert_eq!(statuses[0].unresolved, vec!["gitlab"]);
        assert_eq!(statuses[0].gitlab_tag.dev_status, UNKNOWN_STATUS);
        assert_eq!(statuses[1].gitlab_tag.latest_version, "v2.0.0");
        assert!(statuses[1].unresolved.is_empty());
    }

    #[tokio::test]
    async fn test_hung_project_degrades_after_deadline() {
        let source = FakeSourceControl::default()
            .with_project(1, "slow", vec![Tag::new("v1.0.0")])
            .with_project(2, "fast", vec![Tag::new("v1.0.0")])
            .with_slow_tags(1, Duration::from_secs(30));
        let compute = FakeCompute::default()
            .with_services("stage", vec![])
            .with_services("prod", vec![]);
        let config = EngineConfig {
            call_timeout: Duration::from_millis(20),
            task_deadline: Duration::from_millis(50),
            ..EngineConfig::default()
        };

        let statuses = run(source, compute, &config).execute().await;

        assert_eq!(statuses[0].unresolved, vec!["gitlab"]);
        assert_eq!(statuses[1].gitlab_tag.latest_version, "v1.0.0");
    }

    #[tokio::test]
    async fn test_unreachable_environment_is_marked() {
        let source = FakeSourceControl::default().with_project(1, "A", vec![]);
        let compute = FakeCompute::default().with_services(
            "stage",
            vec![DeployedService::new("a", "eu.gcr.io/acct-stage/dsm-rsp-A:v1.0.0")],
        );

        let statuses = run(source, compute, &EngineConfig::default()).execute().await;

        assert_eq!(statuses[0].stage_version, "v1.0.0");
        assert!(statuses[0].prod_version.is_empty());
        assert_eq!(statuses[0].unresolved, vec!["prod"]);
    }
}
