use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::Result;

type JobFn = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// A named job run on a fixed interval. The closure is decoupled from any
/// schedule so the underlying work stays directly invokable in tests and
/// from the admin API.
#[derive(Clone)]
pub struct PeriodicJob {
    name: &'static str,
    interval_secs: u64,
    run: JobFn,
}

impl PeriodicJob {
    pub fn new<F, Fut>(name: &'static str, interval_secs: u64, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name,
            interval_secs,
            run: Arc::new(move || -> BoxFuture<'static, Result<()>> { Box::pin(f()) }),
        }
    }
}

/// Drives registered periodic jobs, one task per job, until the supplied
/// token is cancelled. Ticks never overlap within a job (the next sleep only
/// starts after a run finishes), but nothing serializes a periodic run
/// against an admin-triggered one.
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<PeriodicJob>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn register(&mut self, job: PeriodicJob) {
        self.jobs.push(job);
    }

    pub fn start(self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        self.jobs
            .into_iter()
            .map(|job| {
                let token = cancel.child_token();
                info!(
                    job = job.name,
                    interval_secs = job.interval_secs,
                    "Registering periodic job"
                );
                tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            _ = token.cancelled() => {
                                info!(job = job.name, "Periodic job shutting down");
                                break;
                            }
                            _ = tokio::time::sleep(std::time::Duration::from_secs(job.interval_secs)) => {
                                if let Err(e) = (job.run)().await {
                                    error!(job = job.name, error = %e, "Periodic job failed");
                                }
                            }
                        }
                    }
                })
            })
            .collect()
    }
}
