//! Tag, pipeline and deploy-job correlation
//!
//! Pure helpers used by the correlator service once the tags, pipelines and
//! jobs of a project have been fetched.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::collision;
use crate::domain::pipeline::{Job, Pipeline};
use crate::domain::status::{TagStatus, UNKNOWN_STATUS};
use crate::domain::tag::Tag;

/// Names of the deploy jobs whose statuses are reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployJobs {
    pub dev: String,
    pub stage: String,
}

impl DeployJobs {
    pub fn new(dev: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            dev: dev.into(),
            stage: stage.into(),
        }
    }
}

/// Latest tag of a project
///
/// Tags are expected ordered by version, descending, so the first one wins.
pub fn latest_tag(tags: &[Tag]) -> Option<&Tag> {
    tags.first()
}

/// Orders pipelines most recent first
///
/// The sort is stable: pipelines with equal or missing creation time keep
/// server order, and pipelines without a timestamp go last.
pub fn order_pipelines(pipelines: &mut [Pipeline]) {
    pipelines.sort_by_key(|p| (p.created_at.is_none(), Reverse(p.created_at)));
}

/// First pipeline whose ref equals the tag name
pub fn select_pipeline<'a>(pipelines: &'a [Pipeline], tag: &str) -> Option<&'a Pipeline> {
    pipelines.iter().find(|p| p.git_ref == tag)
}

/// Copies deploy-job statuses from `jobs` into `status`
///
/// Jobs are scanned in response order; a later job with the same configured
/// name overwrites an earlier one. Roles with no matching job keep the
/// unknown sentinel.
pub fn apply_jobs(status: &mut TagStatus, jobs: &[Job], deploy_jobs: &DeployJobs) {
    let mut dev = None;
    let mut stage = None;

    for job in jobs {
        if job.name == deploy_jobs.dev {
            collision::overwrite(&mut dev, job.status.clone());
        }
        if job.name == deploy_jobs.stage {
            collision::overwrite(&mut stage, job.status.clone());
        }
    }

    status.dev_status = dev.unwrap_or_else(|| UNKNOWN_STATUS.to_string());
    status.stage_status = stage.unwrap_or_else(|| UNKNOWN_STATUS.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn pipeline(id: u64, git_ref: &str, created: Option<i64>) -> Pipeline {
        Pipeline {
            id,
            git_ref: git_ref.to_string(),
            link: format!("https://gitlab.example.com/p/-/pipelines/{}", id),
            status: None,
            created_at: created.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
        }
    }

    fn job(id: u64, name: &str, status: &str) -> Job {
        Job {
            id,
            name: name.to_string(),
            status: status.to_string(),
            stage: "deploy".to_string(),
        }
    }

    #[test]
    fn test_latest_tag_is_first() {
        let tags = vec![Tag::new("v2.0.0"), Tag::new("v1.0.0")];
        assert_eq!(latest_tag(&tags).unwrap().name, "v2.0.0");
        assert!(latest_tag(&[]).is_none());
    }

    #[test]
    fn test_order_pipelines_most_recent_first() {
        let mut pipelines = vec![
            pipeline(1, "v1.0.0", Some(100)),
            pipeline(2, "v1.0.0", None),
            pipeline(3, "v1.0.0", Some(300)),
            pipeline(4, "v1.0.0", Some(200)),
        ];
        order_pipelines(&mut pipelines);

        let ids: Vec<u64> = pipelines.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_order_pipelines_stable_for_ties() {
        let mut pipelines = vec![
            pipeline(7, "v1.0.0", Some(100)),
            pipeline(5, "v1.0.0", Some(100)),
        ];
        order_pipelines(&mut pipelines);
        assert_eq!(pipelines[0].id, 7);
    }

    #[test]
    fn test_select_pipeline_exact_ref() {
        let pipelines = vec![
            pipeline(1, "v1.0.0-rc1", None),
            pipeline(2, "v1.0.0", None),
            pipeline(3, "v1.0.0", None),
        ];
        assert_eq!(select_pipeline(&pipelines, "v1.0.0").unwrap().id, 2);
        assert!(select_pipeline(&pipelines, "v2.0.0").is_none());
    }

    #[test]
    fn test_apply_jobs_sets_roles() {
        let mut status = TagStatus::for_tag("v1.0.0");
        let jobs = vec![
            job(1, "build", "success"),
            job(2, "deploy-dev", "success"),
            job(3, "deploy-stage", "failed"),
        ];
        apply_jobs(&mut status, &jobs, &DeployJobs::new("deploy-dev", "deploy-stage"));

        assert_eq!(status.dev_status, "success");
        assert_eq!(status.stage_status, "failed");
    }

    #[test]
    fn test_apply_jobs_last_write_wins() {
        let mut status = TagStatus::for_tag("v1.0.0");
        let jobs = vec![
            job(1, "deploy-dev", "failed"),
            job(2, "deploy-dev", "success"),
        ];
        apply_jobs(&mut status, &jobs, &DeployJobs::new("deploy-dev", "deploy-stage"));

        assert_eq!(status.dev_status, "success");
        assert_eq!(status.stage_status, UNKNOWN_STATUS);
    }

    #[test]
    fn test_apply_jobs_same_name_for_both_roles() {
        let mut status = TagStatus::for_tag("v1.0.0");
        let jobs = vec![job(1, "deploy", "manual")];
        apply_jobs(&mut status, &jobs, &DeployJobs::new("deploy", "deploy"));

        assert_eq!(status.dev_status, "manual");
        assert_eq!(status.stage_status, "manual");
    }
}
