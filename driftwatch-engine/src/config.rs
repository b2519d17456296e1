//! Engine configuration
//!
//! Tuning for concurrency, timeouts and retries, plus the compute
//! environments a run compares against.

use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of upstream tasks in flight
    pub concurrency: usize,

    /// Timeout applied to each upstream call
    pub call_timeout: Duration,

    /// Deadline for one project or environment, retries included
    pub task_deadline: Duration,

    /// Retries after the first attempt for transient failures
    pub retries: u32,
}

impl EngineConfig {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be greater than 0");
        }

        if self.call_timeout.is_zero() {
            anyhow::bail!("call timeout must be greater than 0");
        }

        if self.task_deadline < self.call_timeout {
            anyhow::bail!("task deadline must not be shorter than the call timeout");
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            call_timeout: Duration::from_secs(30),
            task_deadline: Duration::from_secs(120),
            retries: 2,
        }
    }
}

/// A compute environment to list deployed services from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentTarget {
    /// Environment name (e.g., "stage")
    pub name: String,
    /// Compute project identifier, also the account segment of image references
    pub project_id: String,
    /// Region the services run in
    pub region: String,
}

impl EnvironmentTarget {
    pub fn new(
        name: impl Into<String>,
        project_id: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            project_id: project_id.into(),
            region: region.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.retries, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.concurrency = 0;
        assert!(config.validate().is_err());
        config.concurrency = 4;

        config.call_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        config.call_timeout = Duration::from_secs(60);
        config.task_deadline = Duration::from_secs(30);
        assert!(config.validate().is_err());

        config.task_deadline = Duration::from_secs(60);
        assert!(config.validate().is_ok());
    }
}
