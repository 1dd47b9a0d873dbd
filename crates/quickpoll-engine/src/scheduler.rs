use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// One-shot job scheduling at an absolute deadline.
///
/// Delivery is at-least-once: `cancel` is advisory and may lose a race with
/// the job firing, so the job itself must tolerate running after a cancel
/// (the engine's closure path no-ops on a missing poll record).
pub trait Scheduler: Send + Sync {
    /// Run `job` at (or after) `fire_at`. Returns an opaque handle for
    /// cancellation, or `None` if the implementation cannot provide one.
    fn schedule_once<F>(&self, fire_at: DateTime<Utc>, job: F) -> Option<String>
    where
        F: Future<Output = ()> + Send + 'static;

    /// Best-effort cancellation of a pending job. Returns whether a pending
    /// job was found under `handle`.
    fn cancel(&self, handle: &str) -> bool;
}

/// Tokio-backed scheduler: one spawned task per pending job, keyed by a
/// generated handle so a cancellation can abort it before it fires.
#[derive(Clone, Default)]
pub struct TokioScheduler {
    pending: Arc<DashMap<String, JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs currently waiting to fire.
    pub fn pending_jobs(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once<F>(&self, fire_at: DateTime<Utc>, job: F) -> Option<String>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = Uuid::new_v4().to_string();
        let pending = self.pending.clone();
        let key = handle.clone();
        let delay = (fire_at - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
            pending.remove(&key);
        });
        self.pending.insert(handle.clone(), task);
        Some(handle)
    }

    fn cancel(&self, handle: &str) -> bool {
        if let Some((_, task)) = self.pending.remove(handle) {
            task.abort();
            true
        } else {
            false
        }
    }
}
