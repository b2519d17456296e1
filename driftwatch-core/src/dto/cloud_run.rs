//! Cloud Run Admin API (v2) DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::service::DeployedService;

/// One page of `GET /v2/projects/{project}/locations/{region}/services`
///
/// Services are kept as raw JSON so a single malformed entry can be skipped
/// without discarding the rest of the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListServicesResponse {
    #[serde(default)]
    pub services: Vec<Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ListServicesResponse {
    /// Decodes every well-formed service entry, skipping the rest
    pub fn decode_services(&self) -> Vec<Service> {
        self.services
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| match Service::deserialize(raw) {
                Ok(service) => Some(service),
                Err(e) => {
                    warn!("Skipping malformed service entry {}: {}", index, e);
                    None
                }
            })
            .collect()
    }

    /// Token for the next page, if the listing continues
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// A Cloud Run service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub template: Option<RevisionTemplate>,
}

/// Template from which new revisions are created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionTemplate {
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub image: String,
}

impl From<Service> for DeployedService {
    fn from(service: Service) -> Self {
        let image = service
            .template
            .and_then(|t| t.containers.into_iter().next())
            .map(|c| c.image);

        DeployedService {
            name: service.name,
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_skips_malformed_entries() {
        let page: ListServicesResponse = serde_json::from_value(json!({
            "services": [
                {
                    "name": "projects/p/locations/r/services/billing",
                    "template": { "containers": [
                        { "image": "europe-docker.pkg.dev/acct123/dsm-rsp-billing:1.4.2" },
                        { "image": "sidecar:1" }
                    ]}
                },
                { "template": "not-an-object" },
                { "name": "projects/p/locations/r/services/empty" }
            ],
            "nextPageToken": "abc"
        }))
        .unwrap();

        let services: Vec<DeployedService> = page
            .decode_services()
            .into_iter()
            .map(DeployedService::from)
            .collect();

        assert_eq!(services.len(), 2);
        assert_eq!(
            services[0].image.as_deref(),
            Some("europe-docker.pkg.dev/acct123/dsm-rsp-billing:1.4.2")
        );
        assert_eq!(services[1].image, None);
        assert_eq!(page.next_page(), Some("abc"));
    }

    #[test]
    fn test_empty_page_token_ends_listing() {
        let page: ListServicesResponse =
            serde_json::from_value(json!({ "nextPageToken": "" })).unwrap();
        assert!(page.services.is_empty());
        assert_eq!(page.next_page(), None);
    }
}
