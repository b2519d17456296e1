//! Cloud Run Admin API client

use reqwest::Client;
use tracing::debug;

use crate::error::Result;
use crate::handle_response;
use driftwatch_core::dto::cloud_run::ListServicesResponse;

/// Default Cloud Run Admin API endpoint
pub const DEFAULT_CLOUD_RUN_URL: &str = "https://run.googleapis.com";

/// HTTP client for the Cloud Run Admin API (v2)
///
/// Authenticates with a bearer access token scoped to one compute project.
#[derive(Debug, Clone)]
pub struct CloudRunClient {
    base_url: String,
    token: String,
    client: Client,
}

impl CloudRunClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - API endpoint, usually [`DEFAULT_CLOUD_RUN_URL`]
    /// * `token` - OAuth2 access token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new client with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of services of a project and region
    ///
    /// # Arguments
    /// * `project_id` - Compute project identifier
    /// * `region` - Region (e.g., "europe-west1")
    /// * `page_token` - Token returned by the previous page, if any
    pub async fn list_services_page(
        &self,
        project_id: &str,
        region: &str,
        page_token: Option<&str>,
    ) -> Result<ListServicesResponse> {
        let url = format!(
            "{}/v2/projects/{}/locations/{}/services",
            self.base_url, project_id, region
        );

        let mut request = self.client.get(&url).bearer_auth(&self.token);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        debug!("Listing services of {} in {}", project_id, region);
        let response = request.send().await?;

        handle_response(response).await
    }
}
