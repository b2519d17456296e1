//! Project-related API endpoints

use crate::GitLabClient;
use crate::error::Result;
use driftwatch_core::domain::project::Project;

impl GitLabClient {
    // =============================================================================
    // Project Enumeration
    // =============================================================================

    /// List all projects of a group
    ///
    /// # Arguments
    /// * `group_id` - Numeric id or URL-encoded path of the group
    ///
    /// # Returns
    /// Every project of the group, across all pages
    pub async fn list_group_projects(&self, group_id: &str) -> Result<Vec<Project>> {
        self.get_all(&format!("/groups/{}/projects", group_id), &[])
            .await
    }
}
