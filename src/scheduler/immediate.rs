use std::time::Duration;

use super::{Scheduler, Task};
use crate::subscription::Subscription;

/// Runs every task inline on the calling thread, blocking for any delay.
///
/// Useful for deterministic, synchronous pipelines. Not suitable as the
/// lifetime scheduler of a core: an inline grace-period check runs before the
/// creator had a chance to subscribe.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Subscription {
    if let Some(delay) = delay.filter(|d| !d.is_zero()) {
      std::thread::sleep(delay);
    }
    task();
    Subscription::closed()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  };

  use super::*;

  #[rxcore_macro::test]
  fn runs_inline() {
    let ran = Arc::new(AtomicBool::new(false));
    let c_ran = ran.clone();
    let handle = ImmediateScheduler.schedule(Box::new(move || c_ran.store(true, Ordering::SeqCst)), None);
    assert!(ran.load(Ordering::SeqCst));
    assert!(handle.is_closed());
  }

  #[rxcore_macro::test]
  fn honors_delay() {
    let start = std::time::Instant::now();
    let _ = ImmediateScheduler.schedule(Box::new(|| {}), Some(Duration::from_millis(20)));
    assert!(start.elapsed() >= Duration::from_millis(20));
  }
}
