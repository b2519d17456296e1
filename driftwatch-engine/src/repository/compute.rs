//! Compute repository
//!
//! Lists the services running in a compute environment.

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use driftwatch_client::CloudRunClient;
use driftwatch_core::domain::service::DeployedService;
use tracing::{debug, warn};

use crate::config::EnvironmentTarget;
use crate::retry::RetryPolicy;

/// Upper bound on pages followed for one environment
const MAX_PAGES: usize = 50;

/// Repository trait for compute-platform reads
#[async_trait]
pub trait ComputeRepository: Send + Sync {
    /// Lists the running services of an environment
    ///
    /// Malformed entries are skipped. A failure after the first page keeps
    /// the services already listed.
    async fn list_services(&self, target: &EnvironmentTarget) -> Result<Vec<DeployedService>>;
}

/// Cloud Run implementation of ComputeRepository
///
/// Holds one client per environment since each environment has its own
/// credentials.
pub struct HttpComputeRepository {
    clients: HashMap<String, CloudRunClient>,
    retry: RetryPolicy,
}

impl HttpComputeRepository {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            clients: HashMap::new(),
            retry,
        }
    }

    /// Registers the client used for an environment
    pub fn with_environment(mut self, environment: impl Into<String>, client: CloudRunClient) -> Self {
        self.clients.insert(environment.into(), client);
        self
    }
}

#[async_trait]
impl ComputeRepository for HttpComputeRepository {
    async fn list_services(&self, target: &EnvironmentTarget) -> Result<Vec<DeployedService>> {
        let client = self
            .clients
            .get(&target.name)
            .ok_or_else(|| anyhow!("no compute client configured for environment {}", target.name))?;

        let mut services = Vec::new();
        let mut page_token: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let what = format!("list services of {} (page {})", target.name, page_number);
            let page = self
                .retry
                .call(&what, || {
                    client.list_services_page(&target.project_id, &target.region, page_token.as_deref())
                })
                .await;

            let page = match page {
                Ok(page) => page,
                Err(e) if page_number == 1 => return Err(e),
                Err(e) => {
                    warn!(
                        "Keeping {} service(s) listed before failure in {}: {:#}",
                        services.len(),
                        target.name,
                        e
                    );
                    break;
                }
            };

            services.extend(page.decode_services().into_iter().map(DeployedService::from));

            match page.next_page() {
                Some(token) => page_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!("Listed {} service(s) in {}", services.len(), target.name);
        Ok(services)
    }
}
