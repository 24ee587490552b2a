use super::ObservableBuilder;
use crate::{observer::Observer, scheduler::Scheduler, subject::AsyncSubject};

impl ObservableBuilder {
  /// Run `work` once on `scheduler` and broadcast its outcome.
  ///
  /// Returns at once. `Ok(value)` reaches every subscriber as `next(value)`
  /// followed by `complete()`, `Err(err)` as `error(err)`. Subscribers that
  /// arrive after `work` finished get the outcome replayed.
  pub fn start<Item, Err, S, W>(self, scheduler: S, work: W) -> AsyncSubject<Item, Err>
  where
    Item: Clone + Send + 'static,
    Err: Clone + Send + 'static,
    S: Scheduler,
    W: FnOnce() -> Result<Item, Err> + Send + 'static,
  {
    let subject = AsyncSubject::with_builder(self);
    let target = subject.clone();
    let _handle = scheduler.schedule(
      Box::new(move || match work() {
        Ok(value) => {
          target.next(value);
          target.complete();
        }
        Err(err) => {
          tracing::debug!(core = target.as_observable().id(), "async work failed");
          target.error(err);
        }
      }),
      None,
    );
    subject
  }
}

/// Bridge blocking `work` into a single-outcome source, see
/// [`ObservableBuilder::start`].
///
/// ```rust
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let answer = observable::start::<_, (), _, _>(ImmediateScheduler, || Ok(42));
/// let seen = Arc::new(Mutex::new(None));
/// let c_seen = seen.clone();
/// let _ = answer.subscribe_fn(move |v| *c_seen.lock().unwrap() = Some(v));
/// assert_eq!(*seen.lock().unwrap(), Some(42));
/// ```
pub fn start<Item, Err, S, W>(scheduler: S, work: W) -> AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  S: Scheduler,
  W: FnOnce() -> Result<Item, Err> + Send + 'static,
{
  ObservableBuilder::default().start(scheduler, work)
}

#[cfg(test)]
mod tests {
  use std::{
    sync::{
      atomic::{AtomicUsize, Ordering},
      Arc,
    },
    time::Duration,
  };

  use crate::{
    prelude::*,
    test_util::{Event, Recorder},
  };

  fn builder() -> ObservableBuilder { ObservableBuilder::new().lifetime_scheduler(TestScheduler::new()) }

  #[rxcore_macro::test]
  fn late_subscriber_sees_result() {
    let scheduler = TestScheduler::new();
    let answer = builder().start::<_, (), _, _>(scheduler.clone(), || Ok(42));
    scheduler.flush();

    let late = Recorder::new();
    let _ = answer.subscribe(late.clone());
    assert_eq!(late.events(), vec![Event::Next(42), Event::Complete]);
  }

  #[rxcore_macro::test]
  fn early_subscriber_waits_for_work() {
    let scheduler = TestScheduler::new();
    let answer = builder().start::<_, (), _, _>(scheduler.clone(), || Ok("done"));
    let early = Recorder::new();
    let _ = answer.subscribe(early.clone());
    assert!(early.events().is_empty());

    scheduler.flush();
    assert_eq!(early.events(), vec![Event::Next("done"), Event::Complete]);
  }

  #[rxcore_macro::test]
  fn failure_delivers_error_only() {
    let scheduler = TestScheduler::new();
    let answer = builder().start::<i32, _, _, _>(scheduler.clone(), || Err("io".to_owned()));
    let early = Recorder::new();
    let _ = answer.subscribe(early.clone());
    scheduler.flush();

    let late = Recorder::new();
    let _ = answer.subscribe(late.clone());
    assert_eq!(early.events(), vec![Event::Error("io".to_owned())]);
    assert_eq!(late.events(), vec![Event::Error("io".to_owned())]);
  }

  #[rxcore_macro::test]
  fn work_runs_once() {
    let scheduler = TestScheduler::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let c_runs = runs.clone();
    let answer = builder().start::<_, (), _, _>(scheduler.clone(), move || {
      Ok(c_runs.fetch_add(1, Ordering::SeqCst))
    });
    let _ = answer.subscribe(Recorder::new());
    let _ = answer.subscribe(Recorder::new());
    scheduler.flush();
    let _ = answer.subscribe(Recorder::new());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
  }

  #[rxcore_macro::test]
  async fn result_arrives_from_thread_pool() {
    let answer = builder().start::<_, (), _, _>(default_scheduler(), || {
      std::thread::sleep(Duration::from_millis(10));
      Ok(7)
    });
    let (tx, rx) = tokio::sync::oneshot::channel();
    let tx = std::sync::Mutex::new(Some(tx));
    let _ = answer.subscribe_fn(move |v| {
      if let Some(tx) = tx.lock().unwrap().take() {
        let _ = tx.send(v);
      }
    });
    let value = tokio::time::timeout(Duration::from_secs(5), rx).await.unwrap().unwrap();
    assert_eq!(value, 7);
  }
}
