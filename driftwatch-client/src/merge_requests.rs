//! Merge-request-related API endpoints

use crate::error::Result;
use crate::{GitLabClient, handle_empty_response};
use driftwatch_core::domain::project::MergeRequest;

impl GitLabClient {
    /// List the open merge requests of a project
    pub async fn list_open_merge_requests(&self, project_id: u64) -> Result<Vec<MergeRequest>> {
        self.get_all(
            &format!("/projects/{}/merge_requests", project_id),
            &[("state", "opened".to_string())],
        )
        .await
    }

    /// Ask the host to rebase a merge request onto its target branch
    ///
    /// # Returns
    /// The HTTP status code of the accepted request
    pub async fn rebase_merge_request(&self, project_id: u64, iid: u64) -> Result<u16> {
        let response = self
            .put(&format!("/projects/{}/merge_requests/{}/rebase", project_id, iid))?
            .send()
            .await?;

        handle_empty_response(response).await
    }
}
