// task_group.rs - Run tasks concurrently, wait for all of them, keep the first error

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::error_handling::{MazeError, Result};

/// Counted completion barrier with a shared first-error slot.
///
/// `wait` returns only after every spawned task has finished, even when one
/// of them failed early. A panicking task counts as a failure.
pub struct TaskGroup {
    shared: Arc<Shared>,
}

struct Shared {
    pending: AtomicUsize,
    done: Notify,
    first_error: Mutex<Option<MazeError>>,
}

impl Shared {
    fn record(&self, err: MazeError) {
        if let Ok(mut slot) = self.first_error.lock() {
            slot.get_or_insert(err);
        }
    }
}

/// Decrements the counter however the task ends, including when the
/// runtime drops it unfinished.
struct Completion {
    shared: Arc<Shared>,
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.shared.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shared.done.notify_one();
        }
    }
}

impl TaskGroup {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                pending: AtomicUsize::new(0),
                done: Notify::new(),
                first_error: Mutex::new(None),
            }),
        }
    }

    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        let completion = Completion {
            shared: self.shared.clone(),
        };

        tokio::spawn(async move {
            let completion = completion;
            let failure = match AssertUnwindSafe(task).catch_unwind().await {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(_) => Some(MazeError::TaskJoin(format!("{name} panicked"))),
            };
            if let Some(err) = failure {
                log::error!("task {name} failed: {err}");
                completion.shared.record(err);
            }
        });
    }

    /// Block until every task is done; the first recorded error wins.
    pub async fn wait(self) -> Result<()> {
        while self.shared.pending.load(Ordering::Acquire) > 0 {
            // notify_one stores a permit, so a completion racing this check is not lost
            self.shared.done.notified().await;
        }

        let first = self
            .shared
            .first_error
            .lock()
            .map_err(|_| MazeError::TaskJoin("error slot poisoned".into()))?
            .take();
        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}
