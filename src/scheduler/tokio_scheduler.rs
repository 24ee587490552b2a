use std::time::Duration;

use tokio::runtime::Handle;

use super::{cancellable, Scheduler, Task};
use crate::{error::RxError, subscription::Subscription};

/// Runs tasks on a tokio runtime as blocking jobs, so a long generator loop
/// or blocking work unit does not stall the runtime's async workers.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { TokioScheduler { handle } }

  /// Scheduler bound to the runtime of the calling context.
  pub fn current() -> Result<Self, RxError> {
    Handle::try_current()
      .map(Self::new)
      .map_err(|err| RxError::NoRuntime(err.to_string()))
  }
}

impl Scheduler for TokioScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Subscription {
    let (task, handle) = cancellable(task);
    let probe = handle.clone();
    let join = self.handle.spawn(async move {
      if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
      }
      if !probe.is_closed() {
        if let Err(err) = tokio::task::spawn_blocking(task).await {
          tracing::error!(error = %err, "scheduled task failed");
        }
      }
    });
    handle.add_action(move || join.abort());
    handle
  }
}
