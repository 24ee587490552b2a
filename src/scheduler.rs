//! Schedulers decide where and when deferred work runs.
//!
//! A [`Scheduler`] runs a [`Task`] exactly once, asynchronously, after an
//! optional delay, and returns a [`Subscription`] that cancels the task if it
//! has not started yet. Once the task has run the returned subscription is
//! closed.

use std::{sync::Arc, time::Duration};

use once_cell::sync::Lazy;

use crate::subscription::Subscription;

mod immediate;
mod test_scheduler;
mod thread_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use immediate::ImmediateScheduler;
pub use test_scheduler::TestScheduler;
pub use thread_scheduler::NewThreadScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::{ThreadPoolScheduler, ThreadPoolSchedulerBuilder};
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A Scheduler is an object to order task and schedule their execution.
pub trait Scheduler: Send + Sync {
  /// Run `task` once, after `delay` (`None` means "next opportunity").
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Subscription;
}

/// Type-erased scheduler handle.
pub type SchedulerRef = Arc<dyn Scheduler>;

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
  #[inline]
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Subscription {
    (**self).schedule(task, delay)
  }
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
  #[inline]
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Subscription {
    (**self).schedule(task, delay)
  }
}

/// Pair `task` with the handle that cancels it.
///
/// The wrapped task does nothing if the handle was closed before it started,
/// and closes the handle once it has run.
pub(crate) fn cancellable(task: Task) -> (Task, Subscription) {
  let handle = Subscription::empty();
  let probe = handle.clone();
  let guarded: Task = Box::new(move || {
    if !probe.is_closed() {
      task();
      probe.unsubscribe();
    }
  });
  (guarded, handle)
}

static DEFAULT_SCHEDULER: Lazy<SchedulerRef> = Lazy::new(build_default);

#[cfg(feature = "futures-scheduler")]
fn build_default() -> SchedulerRef {
  match ThreadPoolScheduler::builder().name_prefix("rxcore-").build() {
    Ok(pool) => Arc::new(pool),
    Err(err) => {
      tracing::error!(error = %err, "default thread pool unavailable, using new-thread scheduler");
      Arc::new(NewThreadScheduler)
    }
  }
}

#[cfg(not(feature = "futures-scheduler"))]
fn build_default() -> SchedulerRef { Arc::new(NewThreadScheduler) }

/// The process-wide default execution context.
///
/// Backed by a shared thread pool with the `futures-scheduler` feature, and
/// by a thread per task otherwise.
pub fn default_scheduler() -> SchedulerRef { DEFAULT_SCHEDULER.clone() }
