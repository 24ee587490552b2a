//! Test Scheduler for deterministic testing.
//!
//! Provides virtual time that only advances when explicitly instructed, so
//! grace-period checks, generator loops and async work units run exactly when
//! a test says so.
//!
//! # Usage
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let numbers = observable::generate::<_, (), _, _>(1, |v| (*v < 3).then(|| v + 1), scheduler.clone());
//! let _ = numbers.subscribe_fn(|v| println!("{v}"));
//!
//! // Nothing has run yet: run everything that is due.
//! scheduler.flush();
//! ```
//!
//! # Thread Safety
//!
//! Unlike a thread-local clock, every `TestScheduler` value owns its own
//! queue; clones share it. Tasks may be scheduled from any thread, and run on
//! the thread that calls `flush` or `advance_by`.

use std::{cmp::Ordering, collections::BinaryHeap, time::Duration};

use super::{cancellable, Scheduler, Task};
use crate::{rc::MutArc, subscription::Subscription};

// ==================== Internal State ====================

#[derive(Default)]
struct TestSchedulerState {
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  task: Task,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

// ==================== TestScheduler ====================

/// A virtual time scheduler for deterministic testing.
#[derive(Clone, Default)]
pub struct TestScheduler {
  state: MutArc<TestSchedulerState>,
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Current virtual time.
  pub fn now(&self) -> Duration { self.state.rc_deref_mut().virtual_time }

  /// Number of tasks waiting in the queue, cancelled ones included.
  pub fn pending_count(&self) -> usize { self.state.rc_deref_mut().task_queue.len() }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  fn pop_due(&self, target_time: Option<Duration>) -> Option<ScheduledTask> {
    let mut state = self.state.rc_deref_mut();
    let due = state
      .task_queue
      .peek()
      .is_some_and(|peek| target_time.map_or(true, |limit| peek.scheduled_time <= limit));
    if !due {
      return None;
    }
    let task = state.task_queue.pop()?;
    state.virtual_time = state.virtual_time.max(task.scheduled_time);
    Some(task)
  }

  fn execute_tasks_until(&self, target_time: Option<Duration>) {
    // The lock is released before each task runs: tasks commonly schedule
    // more work on this same scheduler.
    while let Some(scheduled) = self.pop_due(target_time) {
      (scheduled.task)();
    }
  }

  /// Advance virtual time by `duration`, running every task that falls due,
  /// in time order and FIFO for equal times.
  pub fn advance_by(&self, duration: Duration) {
    let target_time = self.now() + duration;
    self.execute_tasks_until(Some(target_time));
    let mut state = self.state.rc_deref_mut();
    state.virtual_time = state.virtual_time.max(target_time);
  }

  /// Run all pending tasks, including tasks scheduled while flushing,
  /// advancing virtual time to each task's due time.
  pub fn flush(&self) { self.execute_tasks_until(None); }

  /// Run only the tasks due at the current virtual time.
  pub fn run_due(&self) { self.advance_by(Duration::ZERO); }
}

impl Scheduler for TestScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Subscription {
    let (task, handle) = cancellable(task);
    let mut state = self.state.rc_deref_mut();
    let scheduled_time = state.virtual_time + delay.unwrap_or(Duration::ZERO);
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    state.task_queue.push(ScheduledTask { scheduled_time, task_id, task });
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;

  fn log_task(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Task {
    let log = log.clone();
    Box::new(move || log.lock().unwrap().push(name))
  }

  #[rxcore_macro::test]
  fn nothing_runs_until_flushed() {
    let scheduler = TestScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let _ = scheduler.schedule(log_task(&log, "a"), None);
    assert_eq!(scheduler.pending_count(), 1);
    assert!(log.lock().unwrap().is_empty());

    scheduler.flush();
    assert_eq!(*log.lock().unwrap(), vec!["a"]);
    assert!(scheduler.is_empty());
  }

  #[rxcore_macro::test]
  fn runs_in_time_then_fifo_order() {
    let scheduler = TestScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let _ = scheduler.schedule(log_task(&log, "late"), Some(Duration::from_millis(20)));
    let _ = scheduler.schedule(log_task(&log, "first"), None);
    let _ = scheduler.schedule(log_task(&log, "second"), None);

    scheduler.flush();
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "late"]);
    assert_eq!(scheduler.now(), Duration::from_millis(20));
  }

  #[rxcore_macro::test]
  fn advance_by_runs_only_due_tasks() {
    let scheduler = TestScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let _ = scheduler.schedule(log_task(&log, "10ms"), Some(Duration::from_millis(10)));
    let _ = scheduler.schedule(log_task(&log, "30ms"), Some(Duration::from_millis(30)));

    scheduler.advance_by(Duration::from_millis(15));
    assert_eq!(*log.lock().unwrap(), vec!["10ms"]);
    assert_eq!(scheduler.now(), Duration::from_millis(15));

    scheduler.advance_by(Duration::from_millis(15));
    assert_eq!(*log.lock().unwrap(), vec!["10ms", "30ms"]);
  }

  #[rxcore_macro::test]
  fn tasks_scheduled_while_flushing_also_run() {
    let scheduler = TestScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let c_scheduler = scheduler.clone();
    let c_log = log.clone();
    let _ = scheduler.schedule(
      Box::new(move || {
        c_log.lock().unwrap().push("outer");
        let _ = c_scheduler.schedule(log_task(&c_log, "inner"), None);
      }),
      None,
    );
    scheduler.flush();
    assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
  }

  #[rxcore_macro::test]
  fn cancelled_task_is_skipped() {
    let scheduler = TestScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let handle = scheduler.schedule(log_task(&log, "cancelled"), None);
    handle.unsubscribe();
    scheduler.flush();
    assert!(log.lock().unwrap().is_empty());
  }

  #[rxcore_macro::test]
  fn run_due_leaves_future_tasks() {
    let scheduler = TestScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let _ = scheduler.schedule(log_task(&log, "now"), None);
    let _ = scheduler.schedule(log_task(&log, "later"), Some(Duration::from_millis(1)));
    scheduler.run_due();
    assert_eq!(*log.lock().unwrap(), vec!["now"]);
    assert_eq!(scheduler.pending_count(), 1);
  }
}
