//! Version reconciliation
//!
//! Joins correlation results and deployed image versions into one
//! `VersionStatus` per project. The join key is the raw project name,
//! compared case-sensitively. This step performs no I/O.

use std::collections::HashMap;

use crate::domain::project::Project;
use crate::domain::status::{TagStatus, VersionStatus};

/// Source name recorded when a project's release state could not be fetched
pub const GITLAB_SOURCE: &str = "gitlab";

/// Outcome of correlating one project with at least one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// Latest tag and deploy-job statuses were determined
    Resolved(TagStatus),
    /// Fetching or decoding failed; the reason is kept for logs
    Unresolved(String),
}

/// Tag outcomes keyed by project name
///
/// Projects without tags are absent.
pub type TagStatusMap = HashMap<String, TagOutcome>;

/// Deployed versions of one compute environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentImages {
    /// Environment name (e.g. "stage")
    pub environment: String,
    /// Normalized service name to image version
    pub versions: HashMap<String, String>,
    /// Set when the environment could not be listed
    pub unresolved: bool,
}

impl EnvironmentImages {
    pub fn resolved(environment: impl Into<String>, versions: HashMap<String, String>) -> Self {
        Self {
            environment: environment.into(),
            versions,
            unresolved: false,
        }
    }

    pub fn unresolved(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            versions: HashMap::new(),
            unresolved: true,
        }
    }

    fn version_of(&self, name: &str) -> String {
        self.versions.get(name).cloned().unwrap_or_default()
    }
}

/// Produces one record per project, in project enumeration order
///
/// # Arguments
/// * `projects` - Enumerated projects, including those without tags
/// * `tags` - Correlation outcomes keyed by project name
/// * `stage` - Images deployed in the stage environment
/// * `prod` - Images deployed in the prod environment
pub fn reconcile(
    projects: &[Project],
    tags: &TagStatusMap,
    stage: &EnvironmentImages,
    prod: &EnvironmentImages,
) -> Vec<VersionStatus> {
    projects
        .iter()
        .map(|project| {
            let mut status = VersionStatus::new(project.name.clone());

            match tags.get(&project.name) {
                Some(TagOutcome::Resolved(tag)) => status.gitlab_tag = tag.clone(),
                Some(TagOutcome::Unresolved(_)) => {
                    status.gitlab_tag = TagStatus::unresolved();
                    status.unresolved.push(GITLAB_SOURCE.to_string());
                }
                None => {}
            }

            status.stage_version = stage.version_of(&project.name);
            status.prod_version = prod.version_of(&project.name);

            for env in [stage, prod] {
                if env.unresolved {
                    status.unresolved.push(env.environment.clone());
                }
            }

            status
        })
        .collect()
}
