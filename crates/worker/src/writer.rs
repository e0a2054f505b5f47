//! Detached background tasks for best-effort cache writes.
//!
//! Tasks are spawned with `tokio::spawn`, so dropping the caller never
//! cancels them. Failures are logged and published on a broadcast channel;
//! they never reach the response path.

use std::future::Future;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use precache_core::Error;

const FAILURE_CHANNEL_CAPACITY: usize = 64;

/// A background write that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// URL of the request being cached.
    pub url: String,
    pub error: String,
}

pub struct BackgroundWriter {
    tasks: Mutex<Vec<JoinHandle<()>>>,
    failures: broadcast::Sender<WriteFailure>,
}

impl Default for BackgroundWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundWriter {
    pub fn new() -> Self {
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        Self { tasks: Mutex::new(Vec::new()), failures }
    }

    /// Run `task` detached. An `Err` is logged and broadcast to subscribers.
    pub async fn spawn<F>(&self, url: String, task: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let failures = self.failures.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = task.await {
                tracing::warn!(url = %url, error = %e, "background cache write failed");
                // No subscribers is fine.
                let _ = failures.send(WriteFailure { url, error: e.to_string() });
            }
        });

        let mut tasks = self.tasks.lock().await;
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    /// Receive failures of writes spawned after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<WriteFailure> {
        self.failures.subscribe()
    }

    /// Number of spawned tasks that have not finished.
    pub async fn pending(&self) -> usize {
        self.tasks.lock().await.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every task spawned so far.
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.tasks.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "background cache task panicked");
            }
        }
    }
}
