use std::{thread, time::Duration};

use super::{cancellable, Scheduler, Task};
use crate::{error::RxError, subscription::Subscription};

/// Runs each task on a freshly spawned thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct NewThreadScheduler;

impl Scheduler for NewThreadScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Subscription {
    let (task, handle) = cancellable(task);
    let probe = handle.clone();
    let spawned = thread::Builder::new()
      .name("rxcore-worker".into())
      .spawn(move || {
        if let Some(delay) = delay {
          thread::sleep(delay);
        }
        if !probe.is_closed() {
          task();
        }
      });
    if let Err(err) = spawned {
      let err = RxError::Spawn { scheduler: "new thread", reason: err.to_string() };
      tracing::error!(error = %err, "task dropped");
      handle.unsubscribe();
    }
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc,
  };

  use super::*;

  #[rxcore_macro::test]
  fn runs_on_another_thread() {
    let (tx, rx) = mpsc::channel();
    let caller = thread::current().id();
    let _ = NewThreadScheduler.schedule(Box::new(move || tx.send(thread::current().id()).unwrap()), None);
    assert_ne!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), caller);
  }

  #[rxcore_macro::test]
  fn cancel_before_delay_elapses() {
    let ran = Arc::new(AtomicBool::new(false));
    let c_ran = ran.clone();
    let handle = NewThreadScheduler.schedule(
      Box::new(move || c_ran.store(true, Ordering::SeqCst)),
      Some(Duration::from_millis(50)),
    );
    handle.unsubscribe();
    thread::sleep(Duration::from_millis(150));
    assert!(!ran.load(Ordering::SeqCst));
  }
}
