//! Bounded worker pool
//!
//! Each item runs in its own task once a permit is available. A task owns
//! its item exclusively; results are collected in input order once every
//! task has finished.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::Semaphore;
use tokio::time::{self, Duration};
use tracing::{Instrument, Span, warn};

/// Worker pool bounding concurrent upstream work
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    deadline: Duration,
}

impl WorkerPool {
    /// Creates a new worker pool
    ///
    /// # Arguments
    /// * `concurrency` - Maximum number of tasks running at once
    /// * `deadline` - Time a task may run once started
    pub fn new(concurrency: usize, deadline: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            deadline,
        }
    }

    /// Runs `task` for every item and waits for all of them
    ///
    /// A task that exceeds the deadline, fails or panics yields an error in
    /// its slot; the other slots are unaffected.
    ///
    /// # Returns
    /// One result per item, in input order
    pub async fn run_all<I, O, F, Fut>(&self, items: Vec<I>, task: F) -> Vec<Result<O>>
    where
        I: Send + 'static,
        O: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        let task = Arc::new(task);

        let handles: Vec<_> = items
            .into_iter()
            .map(|item| {
                let semaphore = Arc::clone(&self.semaphore);
                let task = Arc::clone(&task);
                let deadline = self.deadline;

                tokio::spawn(
                    async move {
                        // Permit is released when dropped
                        let _permit = match semaphore.acquire_owned().await {
                            Ok(permit) => permit,
                            Err(e) => return Err(anyhow!("worker pool closed: {}", e)),
                        };

                        match time::timeout(deadline, task(item)).await {
                            Ok(result) => result,
                            Err(_) => Err(anyhow!("task exceeded deadline of {:?}", deadline)),
                        }
                    }
                    .instrument(Span::current()),
                )
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Worker task panicked: {}", e);
                    Err(anyhow!("worker task panicked: {}", e))
                }
            });
        }

        results
    }
}
