//! Driftwatch HTTP Clients
//!
//! Typed clients for the two upstream systems read during reconciliation:
//! - [`GitLabClient`]: the source-control host REST API (`/api/v4`)
//! - [`CloudRunClient`]: the Cloud Run Admin API (`/v2`)
//!
//! # Example
//!
//! ```no_run
//! use driftwatch_client::GitLabClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GitLabClient::new("https://gitlab.example.com", "glpat-token");
//!
//!     for project in client.list_group_projects("42").await? {
//!         println!("{} {}", project.id, project.name);
//!     }
//!     Ok(())
//! }
//! ```

mod cloud_run;
pub mod error;
mod merge_requests;
mod pipelines;
mod projects;
mod repository;

// Re-export commonly used types
pub use cloud_run::{CloudRunClient, DEFAULT_CLOUD_RUN_URL};
pub use error::{ClientError, Result};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Header carrying the private access token
const TOKEN_HEADER: &str = "private-token";

/// Header carrying the next page number of a paginated listing
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Page size requested from paginated endpoints
pub(crate) const PER_PAGE: u32 = 100;

/// Upper bound on pages followed for one listing
const MAX_PAGES: u32 = 50;

/// HTTP client for the source-control host REST API
///
/// Every request carries the private access token header and a JSON
/// content type. Endpoints are grouped by resource:
/// - Projects: group listing
/// - Repository: tags, branches, merged-branch cleanup
/// - Pipelines: tag pipelines and their jobs
/// - Merge requests: listing and rebase
#[derive(Debug, Clone)]
pub struct GitLabClient {
    /// Base URL of the host (e.g., "https://gitlab.example.com")
    base_url: String,
    /// Private access token
    token: String,
    /// HTTP client instance
    client: Client,
}

impl GitLabClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The host URL, without the `/api/v4` suffix
    /// * `token` - Private access token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    /// Get the base URL of the host
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Request Helpers
    // =============================================================================

    /// Build the full URL of an API path
    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&self.token)
            .map_err(|_| ClientError::InvalidRequest("token is not a valid header value".into()))?;
        headers.insert(TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn get(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.client.get(self.api_url(path)).headers(self.headers()?))
    }

    fn put(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.client.put(self.api_url(path)).headers(self.headers()?))
    }

    fn delete(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.client.delete(self.api_url(path)).headers(self.headers()?))
    }

    /// GET a single page and deserialize it
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.get(path)?.query(query).send().await?;
        handle_response(response).await
    }

    /// GET every page of a listing, following the next-page header
    async fn get_all<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        self.get_pages(path, query, MAX_PAGES).await
    }

    /// GET up to `max_pages` pages of a listing
    async fn get_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        max_pages: u32,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("per_page", PER_PAGE.to_string()));
            page_query.push(("page", page.to_string()));

            let response = self.get(path)?.query(&page_query).send().await?;
            let next = next_page(&response);
            let mut batch: Vec<T> = handle_response(response).await?;
            items.append(&mut batch);

            match next {
                Some(n) if n > page && n > max_pages => {
                    warn!(
                        "Stopped listing {} after {} page(s); later pages were not read",
                        path, max_pages
                    );
                    break;
                }
                Some(n) if n > page => page = n,
                _ => break,
            }
        }

        debug!("Fetched {} item(s) from {}", items.len(), path);
        Ok(items)
    }
}

// =============================================================================
// Response Handlers
// =============================================================================

/// Handle an API response and deserialize JSON
///
/// Non-2xx statuses become `ApiError`; a body that does not decode into `T`
/// becomes `ParseError`.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Handle an API response whose body is not needed
pub(crate) async fn handle_empty_response(response: Response) -> Result<u16> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    Ok(status.as_u16())
}

fn next_page(response: &Response) -> Option<u32> {
    response
        .headers()
        .get(NEXT_PAGE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}


#[cfg(test)]
mod tests {
    use super::test_server::{Canned, serve};
    use super::*;
    use driftwatch_core::domain::project::Project;

    #[test]
    fn test_client_creation() {
        let client = GitLabClient::new("https://gitlab.example.com", "token");
        assert_eq!(client.base_url(), "https://gitlab.example.com");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = GitLabClient::new("https://gitlab.example.com/", "token");
        assert_eq!(client.base_url(), "https://gitlab.example.com");
        assert_eq!(
            client.api_url("/projects/1/repository/tags"),
            "https://gitlab.example.com/api/v4/projects/1/repository/tags"
        );
    }

    #[tokio::test]
    async fn test_get_all_follows_next_page() {
        let (url, server) = serve(vec![
            Canned::json(r#"[{"id": 1, "name": "a"}]"#).with_header("X-Next-Page", "2"),
            Canned::json(r#"[{"id": 2, "name": "b"}]"#).with_header("X-Next-Page", ""),
        ]);
        let client = GitLabClient::new(url, "secret");

        let projects: Vec<Project> = client.get_all("/groups/7/projects", &[]).await.unwrap();
        let seen = server.join().unwrap();

        assert_eq!(projects, vec![Project::new(1, "a"), Project::new(2, "b")]);
        assert_eq!(seen.len(), 2);
        assert!(seen[0].url.contains("page=1"));
        assert!(seen[1].url.contains("page=2"));
        assert!(seen.iter().all(|s| s.token.as_deref() == Some("secret")));
    }

    #[tokio::test]
    async fn test_get_pages_stops_at_cap() {
        let (url, server) = serve(vec![
            Canned::json(r#"[{"id": 1, "name": "a"}]"#).with_header("X-Next-Page", "2"),
        ]);
        let client = GitLabClient::new(url, "secret");

        let projects: Vec<Project> = client
            .get_pages("/groups/7/projects", &[], 1)
            .await
            .unwrap();
        let seen = server.join().unwrap();

        assert_eq!(projects, vec![Project::new(1, "a")]);
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let (url, server) = serve(vec![Canned::status(500, "boom")]);
        let client = GitLabClient::new(url, "secret");

        let err = client
            .get_json::<Vec<Project>>("/projects/1/repository/tags", &[])
            .await
            .unwrap_err();
        server.join().unwrap();

        assert!(err.is_server_error());
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let (url, server) = serve(vec![Canned::json(r#"{"message": "not a list"}"#)]);
        let client = GitLabClient::new(url, "secret");

        let err = client
            .get_json::<Vec<Project>>("/projects/1/repository/tags", &[])
            .await
            .unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, ClientError::ParseError(_)));
        assert!(!err.is_transient());
    }
}
