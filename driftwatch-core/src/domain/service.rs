//! Compute service domain types

use serde::{Deserialize, Serialize};

/// A running compute service
///
/// Only the image of the first container is kept; multi-container
/// revisions are not inspected further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedService {
    pub name: String,
    pub image: Option<String>,
}

impl DeployedService {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: Some(image.into()),
        }
    }
}

/// Normalized image identity recovered from a full image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVersion {
    /// Service name after naming-convention normalization
    pub name: String,
    /// Image tag or digest
    pub version: String,
}
