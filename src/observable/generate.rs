use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use super::{Observable, ObservableBuilder};
use crate::{
  observer::Observer,
  scheduler::Scheduler,
  subscription::Subscription,
};

impl ObservableBuilder {
  /// Emits `seed`, `successor(seed)`, `successor(successor(seed))`, ... on
  /// `scheduler`, completing when `successor` returns `None`.
  ///
  /// Every subscription runs its own loop from a clone of `seed`. Disposing
  /// the subscription stops the loop before its next value, and a stopped
  /// loop never completes.
  pub fn generate<Item, Err, F, S>(self, seed: Item, successor: F, scheduler: S) -> Observable<Item, Err>
  where
    Item: Clone + Send + Sync + 'static,
    Err: Send + 'static,
    F: Fn(&Item) -> Option<Item> + Send + Sync + 'static,
    S: Scheduler + 'static,
  {
    let successor = Arc::new(successor);
    self.create(move |observer| {
      let cancelled = Arc::new(AtomicBool::new(false));
      let flag = cancelled.clone();
      let seed = seed.clone();
      let successor = successor.clone();

      let subscription = Subscription::new(move || {
        if !cancelled.swap(true, Ordering::Release) {
          tracing::debug!("generator cancelled");
        }
      });
      let task = scheduler.schedule(
        Box::new(move || run(seed, &*successor, &*observer, &flag)),
        None,
      );
      subscription.add(task);
      subscription
    })
  }
}

fn run<Item: Clone, Err>(
  seed: Item,
  successor: &dyn Fn(&Item) -> Option<Item>,
  observer: &dyn Observer<Item, Err>,
  cancelled: &AtomicBool,
) {
  let mut current = Some(seed);
  while let Some(value) = current {
    if cancelled.load(Ordering::Acquire) {
      break;
    }
    observer.next(value.clone());
    current = successor(&value);
  }
  if !cancelled.load(Ordering::Acquire) {
    observer.complete();
  }
}

/// Converts a seed and a successor function into an observable that iterates
/// on `scheduler`.
///
/// ```rust
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// let _ = observable::generate::<_, (), _, _>(1, |x| (*x < 5).then(|| x + 1), ImmediateScheduler)
///   .subscribe_fn(move |v| c_seen.lock().unwrap().push(v));
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
/// ```
pub fn generate<Item, Err, F, S>(seed: Item, successor: F, scheduler: S) -> Observable<Item, Err>
where
  Item: Clone + Send + Sync + 'static,
  Err: Send + 'static,
  F: Fn(&Item) -> Option<Item> + Send + Sync + 'static,
  S: Scheduler + 'static,
{
  ObservableBuilder::default().generate(seed, successor, scheduler)
}
