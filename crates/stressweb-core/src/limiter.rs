use crate::error::{Error, Result};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Bounds the number of attempts executing at once.
///
/// A permit is acquired *before* each task is spawned and moved into it, so
/// at most `limit` tasks exist at any instant and releasing a slot is tied
/// to the task ending (including by panic).
pub struct ConcurrencyLimiter {
    permits: Arc<Semaphore>,
    limit: NonZeroUsize,
}

impl ConcurrencyLimiter {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.get())),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `count` tasks built by `make(index)`, admitting a new one only
    /// when a slot frees up, and wait for all of them.
    ///
    /// Slot `i` holds the output of the task built from index `i`, or `None`
    /// if that task panicked. Completion order is not observable.
    pub async fn run<F, Fut, T>(&self, count: usize, mut make: F) -> Result<Vec<Option<T>>>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut slots: Vec<Option<T>> = Vec::with_capacity(count);
        slots.resize_with(count, || None);

        let mut tasks = JoinSet::new();
        for idx in 0..count {
            let permit = self
                .permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| Error::LimiterClosed)?;
            let task = make(idx);

            tasks.spawn(async move {
                let output = task.await;
                drop(permit);
                (idx, output)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, output)) => slots[idx] = Some(output),
                Err(e) => warn!(error = %e, "attempt task did not complete"),
            }
        }

        Ok(slots)
    }
}
