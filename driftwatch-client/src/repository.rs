//! Repository-related API endpoints (tags and branches)

use crate::error::Result;
use crate::{GitLabClient, PER_PAGE, handle_empty_response};
use driftwatch_core::domain::project::Branch;
use driftwatch_core::domain::tag::Tag;

impl GitLabClient {
    // =============================================================================
    // Tags
    // =============================================================================

    /// List the tags of a project, newest version first
    ///
    /// Only the first page is fetched; callers need the head of the list.
    pub async fn list_tags(&self, project_id: u64) -> Result<Vec<Tag>> {
        self.get_json(
            &format!("/projects/{}/repository/tags", project_id),
            &[
                ("order_by", "version".to_string()),
                ("sort", "desc".to_string()),
                ("per_page", PER_PAGE.to_string()),
            ],
        )
        .await
    }

    // =============================================================================
    // Branches
    // =============================================================================

    /// List all branches of a project
    pub async fn list_branches(&self, project_id: u64) -> Result<Vec<Branch>> {
        self.get_all(&format!("/projects/{}/repository/branches", project_id), &[])
            .await
    }

    /// Delete every branch already merged into the default branch
    ///
    /// The host performs the deletion asynchronously and answers 202.
    ///
    /// # Returns
    /// The HTTP status code of the accepted request
    pub async fn delete_merged_branches(&self, project_id: u64) -> Result<u16> {
        let response = self
            .delete(&format!("/projects/{}/repository/merged_branches", project_id))?
            .send()
            .await?;

        handle_empty_response(response).await
    }
}
