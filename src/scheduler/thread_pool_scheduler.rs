use std::time::Duration;

use futures::executor::{ThreadPool, ThreadPoolBuilder};

use super::{cancellable, Scheduler, Task};
use crate::{error::RxError, subscription::Subscription};

/// Runs tasks on a `futures` thread pool.
///
/// Delayed tasks wait on a `futures-time` timer (feature `timer`) so a pending
/// delay does not occupy a pool thread.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

/// Configures a [`ThreadPoolScheduler`].
#[derive(Default)]
pub struct ThreadPoolSchedulerBuilder {
  pool_size: Option<usize>,
  name_prefix: Option<String>,
}

impl ThreadPoolSchedulerBuilder {
  /// Number of worker threads; defaults to the number of CPUs.
  pub fn pool_size(mut self, size: usize) -> Self {
    self.pool_size = Some(size);
    self
  }

  /// Prefix of the worker thread names.
  pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.name_prefix = Some(prefix.into());
    self
  }

  pub fn build(self) -> Result<ThreadPoolScheduler, RxError> {
    let mut builder = ThreadPoolBuilder::new();
    if let Some(size) = self.pool_size {
      assert!(size > 0, "thread pool size must be at least 1");
      builder.pool_size(size);
    }
    if let Some(prefix) = self.name_prefix {
      builder.name_prefix(prefix);
    }
    let pool = builder.create()?;
    Ok(ThreadPoolScheduler { pool })
  }
}

impl ThreadPoolScheduler {
  pub fn builder() -> ThreadPoolSchedulerBuilder { ThreadPoolSchedulerBuilder::default() }

  /// Wrap an existing pool.
  pub fn from_pool(pool: ThreadPool) -> Self { ThreadPoolScheduler { pool } }
}

#[cfg(all(feature = "timer", not(target_arch = "wasm32")))]
async fn sleep(delay: Duration) { futures_time::task::sleep(delay.into()).await; }

#[cfg(not(all(feature = "timer", not(target_arch = "wasm32"))))]
async fn sleep(delay: Duration) { std::thread::sleep(delay); }

impl Scheduler for ThreadPoolScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Subscription {
    let (task, handle) = cancellable(task);
    let probe = handle.clone();
    self.pool.spawn_ok(async move {
      if let Some(delay) = delay.filter(|d| !d.is_zero()) {
        sleep(delay).await;
      }
      if !probe.is_closed() {
        task();
      }
    });
    tracing::trace!(?delay, "task dispatched to thread pool");
    handle
  }
}
