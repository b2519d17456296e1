//! Project domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source-control project
///
/// `name` is the join key used during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

impl Project {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A repository branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub merged: bool,
    pub commit: Commit,
}

/// Commit metadata attached to a branch head
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub authored_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub committed_date: Option<DateTime<Utc>>,
}

/// An open merge request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    #[serde(default)]
    pub source_branch: String,
    #[serde(default)]
    pub target_branch: String,
}
