//! ProfileRefreshWorker - Background execution of profile refresh jobs.
//!
//! Completing a journal enqueues a [`ProfileRefreshJob`] through the
//! [`ProfileJobQueue`] handle and returns at once. The worker pulls jobs off
//! a bounded channel and runs each one through a [`ProfileJobRunner`].
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `queue_capacity` | 64 | Jobs buffered before `schedule` reports `QueueFull` |
//! | `max_attempts` | 3 | Attempts per job, including the first |
//! | `initial_backoff` | 2s | Delay before the second attempt, doubling after |
//!
//! ## Graceful Shutdown
//!
//! On shutdown the worker drains jobs already queued, then stops. Jobs are
//! never cancelled midway.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::config::AgentConfig;
use crate::domain::foundation::ErrorCategory;
use crate::ports::{JobError, ProfileJobRunner, ProfileJobScheduler, ProfileRefreshJob};

/// Configuration for the ProfileRefreshWorker.
#[derive(Debug, Clone)]
pub struct ProfileWorkerConfig {
    pub queue_capacity: usize,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for ProfileWorkerConfig {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

impl From<&AgentConfig> for ProfileWorkerConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            queue_capacity: config.queue_capacity.max(1),
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff(),
        }
    }
}

impl ProfileWorkerConfig {
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

/// Cloneable handle for enqueuing jobs.
#[derive(Clone)]
pub struct ProfileJobQueue {
    sender: mpsc::Sender<ProfileRefreshJob>,
}

impl ProfileJobScheduler for ProfileJobQueue {
    fn schedule(&self, job: ProfileRefreshJob) -> Result<(), JobError> {
        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => JobError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => JobError::QueueClosed,
        })
    }
}

enum Next {
    Job(ProfileRefreshJob),
    Shutdown,
    Closed,
}

/// Background worker that runs queued profile refresh jobs.
pub struct ProfileRefreshWorker {
    runner: Arc<dyn ProfileJobRunner>,
    receiver: mpsc::Receiver<ProfileRefreshJob>,
    config: ProfileWorkerConfig,
}

impl ProfileRefreshWorker {
    /// Creates a worker and the queue handle that feeds it.
    pub fn new(
        runner: Arc<dyn ProfileJobRunner>,
        config: ProfileWorkerConfig,
    ) -> (ProfileJobQueue, Self) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let worker = Self {
            runner,
            receiver,
            config,
        };
        (ProfileJobQueue { sender }, worker)
    }

    /// Run the worker loop until shutdown or until every queue handle is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(capacity = self.config.queue_capacity, "Profile refresh worker started");
        loop {
            let next = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        Next::Shutdown
                    } else {
                        continue;
                    }
                }
                job = self.receiver.recv() => match job {
                    Some(job) => Next::Job(job),
                    None => Next::Closed,
                },
            };
            match next {
                Next::Job(job) => {
                    let _ = self.process_job(job).await;
                }
                Next::Shutdown => {
                    self.drain().await;
                    break;
                }
                Next::Closed => break,
            }
        }
        info!("Profile refresh worker stopped");
    }

    async fn drain(&mut self) {
        self.receiver.close();
        while let Some(job) = self.receiver.recv().await {
            let _ = self.process_job(job).await;
        }
    }

    /// Runs one job with retries and doubling backoff.
    ///
    /// Missing or invalid inputs are not retried. The final failure is
    /// logged at `error` and returned; the worker itself drops it.
    pub async fn process_job(&self, job: ProfileRefreshJob) -> Result<(), JobError> {
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 1;
        loop {
            match self.runner.run(job).await {
                Ok(()) => {
                    info!(journal_id = %job.journal_id, attempt, "Profile refresh completed");
                    return Ok(());
                }
                Err(err) => {
                    let permanent =
                        matches!(err.category(), ErrorCategory::NotFound | ErrorCategory::Validation);
                    if permanent || attempt >= self.config.max_attempts {
                        error!(
                            journal_id = %job.journal_id,
                            attempt,
                            error = %err,
                            "Profile refresh failed; giving up"
                        );
                        return Err(JobError::Failed {
                            attempts: attempt,
                            message: err.to_string(),
                        });
                    }
                    warn!(
                        journal_id = %job.journal_id,
                        attempt,
                        error = %err,
                        backoff_ms = backoff.as_millis() as u64,
                        "Profile refresh failed; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
            }
        }
    }
}
