//! In-memory repository fakes for engine tests

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use driftwatch_core::domain::pipeline::{Job, Pipeline};
use driftwatch_core::domain::project::Project;
use driftwatch_core::domain::service::DeployedService;
use driftwatch_core::domain::tag::Tag;

use crate::config::EnvironmentTarget;
use crate::repository::{ComputeRepository, SourceControlRepository};

pub fn pipeline(id: u64, git_ref: &str, created: Option<i64>) -> Pipeline {
    Pipeline {
        id,
        git_ref: git_ref.to_string(),
        link: format!("https://gitlab.example.com/g/p/-/pipelines/{}", id),
        status: None,
        created_at: created.and_then(|s| Utc.timestamp_opt(s, 0).single()),
    }
}

pub fn job(id: u64, name: &str, status: &str) -> Job {
    Job {
        id,
        name: name.to_string(),
        status: status.to_string(),
        stage: "deploy".to_string(),
    }
}

#[derive(Default)]
pub struct FakeSourceControl {
    projects: Vec<Project>,
    tags: HashMap<u64, Vec<Tag>>,
    failing_tags: HashMap<u64, String>,
    slow_tags: HashMap<u64, Duration>,
    pipelines: HashMap<u64, Vec<Pipeline>>,
    jobs: HashMap<(u64, u64), Vec<Job>>,
}

impl FakeSourceControl {
    pub fn with_project(mut self, id: u64, name: &str, tags: Vec<Tag>) -> Self {
        self.projects.push(Project::new(id, name));
        self.tags.insert(id, tags);
        self
    }

    pub fn with_failing_tags(mut self, id: u64, message: &str) -> Self {
        self.failing_tags.insert(id, message.to_string());
        self
    }

    pub fn with_slow_tags(mut self, id: u64, delay: Duration) -> Self {
        self.slow_tags.insert(id, delay);
        self
    }

    pub fn with_pipelines(mut self, project_id: u64, pipelines: Vec<Pipeline>) -> Self {
        self.pipelines.insert(project_id, pipelines);
        self
    }

    pub fn with_jobs(mut self, project_id: u64, pipeline_id: u64, jobs: Vec<Job>) -> Self {
        self.jobs.insert((project_id, pipeline_id), jobs);
        self
    }
}

#[async_trait]
impl SourceControlRepository for FakeSourceControl {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.clone())
    }

    async fn list_tags(&self, project_id: u64) -> Result<Vec<Tag>> {
        if let Some(delay) = self.slow_tags.get(&project_id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(message) = self.failing_tags.get(&project_id) {
            return Err(anyhow!("{}", message));
        }
        Ok(self.tags.get(&project_id).cloned().unwrap_or_default())
    }

    async fn list_tag_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>> {
        Ok(self.pipelines.get(&project_id).cloned().unwrap_or_default())
    }

    async fn list_pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>> {
        Ok(self
            .jobs
            .get(&(project_id, pipeline_id))
            .cloned()
            .unwrap_or_default())
    }
}

/// Environments without registered services fail to list
#[derive(Default)]
pub struct FakeCompute {
    services: HashMap<String, Vec<DeployedService>>,
}

impl FakeCompute {
    pub fn with_services(mut self, environment: &str, services: Vec<DeployedService>) -> Self {
        self.services.insert(environment.to_string(), services);
        self
    }
}

#[async_trait]
impl ComputeRepository for FakeCompute {
    async fn list_services(&self, target: &EnvironmentTarget) -> Result<Vec<DeployedService>> {
        self.services
            .get(&target.name)
            .cloned()
            .ok_or_else(|| anyhow!("permission denied on {}", target.project_id))
    }
}
