//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three signal methods: next (for values), error (for errors),
//! and complete (for stream completion), plus a hook that hands the observer
//! the [`Subscription`] of the subscription it is attached to.

use std::{
  marker::PhantomData,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use crate::subscription::Subscription;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// Observers are shared between the subscribing thread and whatever thread a
/// source emits on, so every method takes `&self` and implementations use
/// interior mutability for their own state.
///
/// A source delivers `next` any number of times followed by at most one of
/// `error` or `complete`. Nothing is delivered after the terminal signal or
/// after the subscription was disposed.
pub trait Observer<Item, Err>: Send + Sync {
  /// Receive the next value from the observable
  fn next(&self, value: Item);

  /// Handle an error from the observable. Terminal.
  fn error(&self, err: Err);

  /// Handle completion of the observable. Terminal.
  fn complete(&self);

  /// Called once per subscription with the handle that cancels it.
  fn receive_subscription(&self, _subscription: Subscription) {}
}

/// Type-erased observer as stored by sources.
pub type SharedObserver<Item, Err> = Arc<dyn Observer<Item, Err>>;

impl<Item, Err, O> Observer<Item, Err> for Arc<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&self, err: Err) { (**self).error(err) }

  #[inline]
  fn complete(&self) { (**self).complete() }

  #[inline]
  fn receive_subscription(&self, subscription: Subscription) {
    (**self).receive_subscription(subscription)
  }
}

// ============================================================================
// FnObserver - Closure adapter
// ============================================================================

/// Observer assembled from three closures.
///
/// ```rust
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// let observer = FnObserver::new(
///   move |v: i32| c_seen.lock().unwrap().push(v),
///   |_: ()| {},
///   || {},
/// );
/// observer.next(1);
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
/// ```
pub struct FnObserver<N, E, C, Item, Err> {
  next: N,
  error: E,
  complete: C,
  _marker: PhantomData<fn(Item, Err)>,
}

impl<N, E, C, Item, Err> FnObserver<N, E, C, Item, Err>
where
  N: Fn(Item) + Send + Sync,
  E: Fn(Err) + Send + Sync,
  C: Fn() + Send + Sync,
{
  pub fn new(next: N, error: E, complete: C) -> Self {
    FnObserver { next, error, complete, _marker: PhantomData }
  }
}

impl<N, E, C, Item, Err> Observer<Item, Err> for FnObserver<N, E, C, Item, Err>
where
  N: Fn(Item) + Send + Sync,
  E: Fn(Err) + Send + Sync,
  C: Fn() + Send + Sync,
{
  #[inline]
  fn next(&self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(&self) { (self.complete)() }
}

// ============================================================================
// SafeObserver - protocol guard
// ============================================================================

/// Wraps every observer a core registers.
///
/// Drops signals once `subscription` is closed or a terminal signal was
/// delivered, and disposes `subscription` after the terminal signal so the
/// finished subscription releases its resources.
pub(crate) struct SafeObserver<Item, Err> {
  inner: SharedObserver<Item, Err>,
  subscription: Subscription,
  stopped: AtomicBool,
}

impl<Item, Err> SafeObserver<Item, Err> {
  pub(crate) fn new(inner: SharedObserver<Item, Err>, subscription: Subscription) -> Self {
    SafeObserver { inner, subscription, stopped: AtomicBool::new(false) }
  }

  #[inline]
  fn is_stopped(&self) -> bool {
    self.stopped.load(Ordering::Acquire) || self.subscription.is_closed()
  }

  /// Claim the right to deliver the terminal signal.
  fn try_stop(&self) -> bool {
    !self.subscription.is_closed() && !self.stopped.swap(true, Ordering::AcqRel)
  }
}

impl<Item, Err> Observer<Item, Err> for SafeObserver<Item, Err>
where
  Item: Send,
  Err: Send,
{
  fn next(&self, value: Item) {
    if !self.is_stopped() {
      self.inner.next(value);
    }
  }

  fn error(&self, err: Err) {
    if self.try_stop() {
      self.inner.error(err);
      self.subscription.unsubscribe();
    }
  }

  fn complete(&self) {
    if self.try_stop() {
      self.inner.complete();
      self.subscription.unsubscribe();
    }
  }

  fn receive_subscription(&self, subscription: Subscription) {
    self.inner.receive_subscription(subscription)
  }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_util::{Event, Recorder};

  #[rxcore_macro::test]
  fn closure_observer_forwards_all_signals() {
    let recorder = Recorder::<i32, &'static str>::new();
    let (r1, r2, r3) = (recorder.clone(), recorder.clone(), recorder.clone());
    let observer = FnObserver::new(
      move |v| r1.next(v),
      move |e| r2.error(e),
      move || r3.complete(),
    );
    observer.next(1);
    observer.error("boom");
    observer.complete();
    assert_eq!(
      recorder.events(),
      vec![Event::Next(1), Event::Error("boom"), Event::Complete]
    );
  }

  #[rxcore_macro::test]
  fn safe_observer_single_terminal() {
    let recorder = Recorder::<i32, ()>::new();
    let sub = Subscription::empty();
    let safe = SafeObserver::new(Arc::new(recorder.clone()), sub.clone());

    safe.next(1);
    safe.complete();
    safe.error(());
    safe.complete();
    safe.next(2);

    assert_eq!(recorder.events(), vec![Event::Next(1), Event::Complete]);
    assert!(sub.is_closed());
  }

  #[rxcore_macro::test]
  fn safe_observer_silent_after_dispose() {
    let recorder = Recorder::<i32, ()>::new();
    let sub = Subscription::empty();
    let safe = SafeObserver::new(Arc::new(recorder.clone()), sub.clone());

    safe.next(1);
    sub.unsubscribe();
    safe.next(2);
    safe.complete();

    assert_eq!(recorder.events(), vec![Event::Next(1)]);
  }

  #[rxcore_macro::test]
  fn arc_observer_delegates() {
    let recorder = Arc::new(Recorder::<i32, ()>::new());
    let shared: SharedObserver<i32, ()> = recorder.clone();
    shared.next(7);
    shared.complete();
    assert_eq!(recorder.events(), vec![Event::Next(7), Event::Complete]);
  }
}
