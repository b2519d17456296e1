//! Deployed-image resolver
//!
//! Lists the services of an environment and extracts the normalized
//! `service-name -> image-version` mapping.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use driftwatch_core::normalize::NormalizationRule;
use tracing::info;

use crate::config::EnvironmentTarget;
use crate::repository::ComputeRepository;

/// Resolves deployed image versions per environment
pub struct ImageResolver {
    repo: Arc<dyn ComputeRepository>,
    rule: NormalizationRule,
}

impl ImageResolver {
    pub fn new(repo: Arc<dyn ComputeRepository>, rule: NormalizationRule) -> Self {
        Self { repo, rule }
    }

    /// Resolves the deployed versions of one environment
    ///
    /// The environment's project identifier is the account segment stripped
    /// from image references.
    pub async fn resolve(&self, target: &EnvironmentTarget) -> Result<HashMap<String, String>> {
        let services = self.repo.list_services(target).await?;
        let versions = self.rule.resolve_versions(&services, &target.project_id);

        info!(
            "{}: {} of {} service(s) follow the naming convention",
            target.name,
            versions.len(),
            services.len()
        );
        Ok(versions)
    }
}
