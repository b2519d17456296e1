//! Reconciled status types
//!
//! `VersionStatus` is the output unit of a run, one per project. Its JSON
//! shape is the persisted artifact format.

use serde::{Deserialize, Serialize};

/// Sentinel for a deploy job whose status could not be determined
pub const UNKNOWN_STATUS: &str = "unknown";

/// Release state of a project as seen by the source-control host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStatus {
    /// Name of the latest tag
    pub latest_version: String,
    /// Status of the dev deploy job in the tag's pipeline
    pub dev_status: String,
    /// Status of the stage deploy job in the tag's pipeline
    pub stage_status: String,
    /// Link to the tag's pipeline
    pub link: String,
}

impl TagStatus {
    /// Status for a tag whose pipeline and jobs are not yet known
    pub fn for_tag(name: impl Into<String>) -> Self {
        Self {
            latest_version: name.into(),
            dev_status: UNKNOWN_STATUS.to_string(),
            stage_status: UNKNOWN_STATUS.to_string(),
            link: String::new(),
        }
    }

    /// Status for a project whose release state could not be fetched
    pub fn unresolved() -> Self {
        Self::for_tag(String::new())
    }
}

/// Reconciled record for one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionStatus {
    pub name: String,
    pub prod_version: String,
    pub stage_version: String,
    pub gitlab_tag: TagStatus,
    /// Sources that failed for this project (`gitlab` or an environment name)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl VersionStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Compares deployed images against the latest tag
    pub fn drift(&self) -> Drift {
        let latest = self.gitlab_tag.latest_version.as_str();
        Drift {
            stage: Self::drift_of(latest, &self.stage_version),
            prod: Self::drift_of(latest, &self.prod_version),
        }
    }

    fn drift_of(latest: &str, deployed: &str) -> DriftState {
        if latest.is_empty() || deployed.is_empty() {
            DriftState::Unknown
        } else if latest == deployed {
            DriftState::Current
        } else {
            DriftState::Behind
        }
    }
}

/// Drift of each compute environment relative to the latest tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drift {
    pub stage: DriftState,
    pub prod: DriftState,
}

impl Drift {
    pub fn any(&self) -> bool {
        self.stage == DriftState::Behind || self.prod == DriftState::Behind
    }
}

/// Relation between a deployed version and the latest tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftState {
    /// Deployed version equals the latest tag
    Current,
    /// Deployed version differs from the latest tag
    Behind,
    /// Either side is missing
    Unknown,
}

impl std::fmt::Display for DriftState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriftState::Current => write!(f, "current"),
            DriftState::Behind => write!(f, "behind"),
            DriftState::Unknown => write!(f, "unknown"),
        }
    }
}
