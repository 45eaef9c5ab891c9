//! # Parallel Dispatcher
//!
//! Fans per-video work out over a bounded set of tokio tasks and waits for all
//! of them. Results come back in completion order; a unit that panics is
//! reported as a failed result for its video instead of taking the run down.

use std::{any::Any, future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::{sync::Semaphore, task::JoinSet};

use crate::types::{Provenance, SummaryResult, VideoItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelDispatcher {
    max_workers: usize,
}

impl Default for ParallelDispatcher {
    fn default() -> Self {
        Self { max_workers: 5 }
    }
}

impl ParallelDispatcher {
    /// `max_workers` of zero is treated as one
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Runs `work` once per item, at most `max_workers` at a time, and
    /// returns exactly one result per item.
    #[tracing::instrument(skip_all, fields(items = items.len(), max_workers = self.max_workers))]
    pub async fn dispatch<F, Fut>(&self, items: Vec<VideoItem>, work: F) -> Vec<SummaryResult>
    where
        F: Fn(VideoItem) -> Fut,
        Fut: Future<Output = SummaryResult> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();
        let total = items.len();

        for item in items {
            let semaphore = Arc::clone(&semaphore);
            let fallback = item.clone();
            // building the future can panic too
            let unit = std::panic::catch_unwind(AssertUnwindSafe(|| work(item)));

            tasks.spawn(async move {
                // the semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();

                let outcome = match unit {
                    Ok(unit) => AssertUnwindSafe(unit).catch_unwind().await,
                    Err(panic) => Err(panic),
                };

                match outcome {
                    Ok(result) => result,
                    Err(panic) => {
                        let reason = panic_message(panic.as_ref());
                        tracing::error!(video_id = %fallback.video_id, %reason, "Worker panicked");
                        SummaryResult::failed(
                            fallback,
                            Provenance::None,
                            format!("worker panicked: {reason}"),
                        )
                    }
                }
            });
        }

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    tracing::debug!(
                        video_id = %result.video.video_id,
                        status = result.status.label(),
                        done = results.len() + 1,
                        total,
                        "Unit finished"
                    );
                    results.push(result);
                }
                // panics are caught inside the task, so only runtime shutdown lands here
                Err(e) => tracing::error!(error = %e, "Worker task did not complete"),
            }
        }

        results
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
