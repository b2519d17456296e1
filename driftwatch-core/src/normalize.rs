//! Image naming-convention normalization
//!
//! A full image reference has the form `<registry>/<account-id>/<path>:<tag>`.
//! Normalization keeps the path after the `<account-id>` segment, runs an
//! ordered list of steps over it, then splits the version off. Images that do
//! not follow the configured convention are skipped, not reported.
//!
//! Rules are written as comma-separated `kind:value` steps:
//!
//! ```
//! use driftwatch_core::normalize::NormalizationRule;
//!
//! let rule: NormalizationRule = "require:dsm-rsp,strip:dsm-rsp-".parse().unwrap();
//! let image = rule
//!     .normalize("registry.example.com/acct123/dsm-rsp-billing:1.4.2", "acct123")
//!     .unwrap();
//! assert_eq!(image.name, "billing");
//! assert_eq!(image.version, "1.4.2");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::collision;
use crate::domain::service::{DeployedService, ImageVersion};

/// Rule used when none is configured
pub const DEFAULT_RULE: &str = "require:dsm-rsp,strip:dsm-rsp-";

/// Errors raised while parsing a normalization rule
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// A step is not of the form `kind:value`
    #[error("Malformed step '{0}', expected kind:value")]
    MalformedStep(String),

    /// Unknown step kind
    #[error("Unknown step kind '{0}', expected 'require' or 'strip'")]
    UnknownKind(String),

    /// A step has an empty value
    #[error("Step '{0}' has an empty value")]
    EmptyValue(String),

    /// The rule has no `require` step, so every image would be accepted
    #[error("Rule must contain at least one 'require' step")]
    NoRequireStep,
}

/// A single normalization step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeStep {
    /// Skip the image unless the current name starts with the prefix
    Require(String),
    /// Remove the prefix from the current name if present
    Strip(String),
}

impl fmt::Display for NormalizeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeStep::Require(prefix) => write!(f, "require:{}", prefix),
            NormalizeStep::Strip(prefix) => write!(f, "strip:{}", prefix),
        }
    }
}

/// Why an image reference produced no entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The reference does not contain `<account-id>/`
    MissingAccount,
    /// A `require` step did not match
    ConventionMismatch(String),
    /// No `:tag` or `@digest` after the name
    MissingVersion,
    /// The service has no container image
    NoImage,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingAccount => write!(f, "account id not found in image reference"),
            SkipReason::ConventionMismatch(prefix) => {
                write!(f, "image does not start with '{}'", prefix)
            }
            SkipReason::MissingVersion => write!(f, "image reference has no version"),
            SkipReason::NoImage => write!(f, "service has no container image"),
        }
    }
}

/// Ordered list of normalization steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationRule {
    steps: Vec<NormalizeStep>,
}

impl NormalizationRule {
    /// Builds a rule from explicit steps
    pub fn new(steps: Vec<NormalizeStep>) -> Result<Self, RuleError> {
        if !steps.iter().any(|s| matches!(s, NormalizeStep::Require(_))) {
            return Err(RuleError::NoRequireStep);
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[NormalizeStep] {
        &self.steps
    }

    /// Normalizes one image reference
    ///
    /// # Arguments
    /// * `image` - Full image reference
    /// * `account_id` - Account segment preceding the image path
    pub fn normalize(&self, image: &str, account_id: &str) -> Result<ImageVersion, SkipReason> {
        let mut name = after_account(image, account_id).ok_or(SkipReason::MissingAccount)?;

        for step in &self.steps {
            match step {
                NormalizeStep::Require(prefix) => {
                    if !name.starts_with(prefix.as_str()) {
                        return Err(SkipReason::ConventionMismatch(prefix.clone()));
                    }
                }
                NormalizeStep::Strip(prefix) => {
                    name = name.strip_prefix(prefix.as_str()).unwrap_or(name);
                }
            }
        }

        let (name, version) = split_version(name).ok_or(SkipReason::MissingVersion)?;

        Ok(ImageVersion {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    /// Builds the `service-name -> version` mapping of one environment
    ///
    /// Services that do not follow the convention are skipped. When two
    /// services normalize to the same name the later one wins.
    pub fn resolve_versions(
        &self,
        services: &[DeployedService],
        account_id: &str,
    ) -> HashMap<String, String> {
        let mut versions = HashMap::new();

        for service in services {
            let normalized = service
                .image
                .as_deref()
                .ok_or(SkipReason::NoImage)
                .and_then(|image| self.normalize(image, account_id));

            match normalized {
                Ok(image) => {
                    debug!("Service {}: {} -> {}", service.name, image.name, image.version);
                    if let Some(previous) =
                        collision::last_write_wins(&mut versions, image.name.clone(), image.version)
                    {
                        warn!(
                            "Service {} overwrites earlier version {} of {}",
                            service.name, previous, image.name
                        );
                    }
                }
                Err(reason) => debug!("Skipping service {}: {}", service.name, reason),
            }
        }

        versions
    }
}

impl Default for NormalizationRule {
    fn default() -> Self {
        Self {
            steps: vec![
                NormalizeStep::Require("dsm-rsp".to_string()),
                NormalizeStep::Strip("dsm-rsp-".to_string()),
            ],
        }
    }
}

impl FromStr for NormalizationRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (kind, value) = part
                    .split_once(':')
                    .ok_or_else(|| RuleError::MalformedStep(part.to_string()))?;
                if value.is_empty() {
                    return Err(RuleError::EmptyValue(part.to_string()));
                }
                match kind.trim() {
                    "require" => Ok(NormalizeStep::Require(value.to_string())),
                    "strip" => Ok(NormalizeStep::Strip(value.to_string())),
                    other => Err(RuleError::UnknownKind(other.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(steps)
    }
}

impl fmt::Display for NormalizationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.steps.iter().map(ToString::to_string).collect();
        write!(f, "{}", steps.join(","))
    }
}

/// Path after the first segment equal to `account_id`
fn after_account<'a>(image: &'a str, account_id: &str) -> Option<&'a str> {
    let index = image.split('/').position(|segment| segment == account_id)?;
    image
        .splitn(index + 2, '/')
        .nth(index + 1)
        .filter(|rest| !rest.is_empty())
}

/// Splits a reference into name and version
///
/// A `@digest` suffix is removed first; the rest splits at its last `:`.
/// The tag is the version when present, otherwise the digest.
fn split_version(reference: &str) -> Option<(&str, &str)> {
    let (name, version) = match reference.split_once('@') {
        Some((name_tag, digest)) => name_tag.rsplit_once(':').unwrap_or((name_tag, digest)),
        None => reference.rsplit_once(':')?,
    };

    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name, version))
}
