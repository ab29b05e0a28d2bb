use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Snapshot of one named background job's latest run.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub name: String,
    pub state: JobState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

struct JobEntry {
    run_id: String,
    status: JobStatus,
    token: CancellationToken,
}

/// Tracks admin-triggered background runs by name.
///
/// Every spawn gets a cancellation token and a queryable status; nothing runs
/// untracked. A new run for a name replaces the previous entry, and no mutual
/// exclusion is imposed between overlapping runs of the same name (or against
/// the periodic scheduler); overlapping rebuilds may race, which the data
/// model tolerates.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<String, JobEntry>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn spawn<F, Fut>(&self, name: &str, f: F) -> JobStatus
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        let run_id = nanoid::nanoid!();
        let token = CancellationToken::new();
        let status = JobStatus {
            name: name.to_string(),
            state: JobState::Running,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        };

        {
            let mut jobs = self.jobs.write().await;
            jobs.insert(
                name.to_string(),
                JobEntry {
                    run_id: run_id.clone(),
                    status: status.clone(),
                    token: token.clone(),
                },
            );
        }

        info!(job = name, "Background job started");

        let jobs = self.jobs.clone();
        let job_name = name.to_string();
        tokio::spawn(async move {
            let result = f(token.clone()).await;

            let mut jobs = jobs.write().await;
            // Only the run that owns the entry may finalize it; a newer run
            // for the same name has replaced us otherwise.
            let Some(entry) = jobs.get_mut(&job_name) else {
                return;
            };
            if entry.run_id != run_id {
                return;
            }

            entry.status.finished_at = Some(Utc::now());
            match result {
                Ok(()) if token.is_cancelled() => {
                    info!(job = job_name.as_str(), "Background job cancelled");
                    entry.status.state = JobState::Cancelled;
                }
                Ok(()) => {
                    info!(job = job_name.as_str(), "Background job completed");
                    entry.status.state = JobState::Completed;
                }
                Err(e) => {
                    error!(job = job_name.as_str(), error = %e, "Background job failed");
                    entry.status.state = JobState::Failed;
                    entry.status.error = Some(e.to_string());
                }
            }
        });

        status
    }

    pub async fn status(&self, name: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(name).map(|e| e.status.clone())
    }

    /// Request cancellation of a job's latest run. Returns the status as of
    /// the request, or `None` for a name that was never spawned.
    pub async fn cancel(&self, name: &str) -> Option<JobStatus> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(name)?;
        if entry.status.state == JobState::Running {
            entry.token.cancel();
        }
        Some(entry.status.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RekkoError;

    async fn wait_for_terminal(registry: &JobRegistry, name: &str) -> JobStatus {
        for _ in 0..100 {
            if let Some(status) = registry.status(name).await {
                if status.state != JobState::Running {
                    return status;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("job {name} never reached a terminal state");
    }

    #[tokio::test]
    async fn test_spawned_job_reaches_completed() {
        let registry = JobRegistry::new();

        let status = registry.spawn("noop", |_token| async { Ok(()) }).await;
        assert_eq!(status.state, JobState::Running);

        let done = wait_for_terminal(&registry, "noop").await;
        assert_eq!(done.state, JobState::Completed);
        assert!(done.finished_at.is_some());
        assert!(done.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_job_records_error() {
        let registry = JobRegistry::new();

        registry
            .spawn("doomed", |_token| async {
                Err(RekkoError::Internal("storage offline".to_string()))
            })
            .await;

        let done = wait_for_terminal(&registry, "doomed").await;
        assert_eq!(done.state, JobState::Failed);
        assert!(done.error.unwrap().contains("storage offline"));
    }

    #[tokio::test]
    async fn test_cancel_marks_job_cancelled() {
        let registry = JobRegistry::new();

        registry
            .spawn("slow", |token| async move {
                token.cancelled().await;
                Ok(())
            })
            .await;

        let status = registry.cancel("slow").await.unwrap();
        assert_eq!(status.state, JobState::Running);

        let done = wait_for_terminal(&registry, "slow").await;
        assert_eq!(done.state, JobState::Cancelled);
    }

    #[tokio::test]
    async fn test_unknown_job_has_no_status() {
        let registry = JobRegistry::new();
        assert!(registry.status("ghost").await.is_none());
        assert!(registry.cancel("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_respawn_replaces_previous_run() {
        let registry = JobRegistry::new();

        registry
            .spawn("rebuild", |_token| async {
                Err(RekkoError::Internal("first run".to_string()))
            })
            .await;
        wait_for_terminal(&registry, "rebuild").await;

        registry.spawn("rebuild", |_token| async { Ok(()) }).await;
        let done = wait_for_terminal(&registry, "rebuild").await;
        assert_eq!(done.state, JobState::Completed);
        assert!(done.error.is_none());
    }
}
