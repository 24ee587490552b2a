//! Cancellation handles.
//!
//! A [`Subscription`] represents "run these cleanup actions once". It is
//! cheap to clone (all clones share one state), idempotent, thread-safe and
//! composable: child subscriptions and plain actions can be attached, and
//! disposing the parent disposes every child exactly once.

use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  },
};

use smallvec::SmallVec;

use crate::rc::lock;

enum Teardown {
  Action(Box<dyn FnOnce() + Send>),
  Child(Subscription),
}

impl Teardown {
  fn run(self) {
    match self {
      Teardown::Action(action) => action(),
      Teardown::Child(child) => child.unsubscribe(),
    }
  }

  fn is_closed(&self) -> bool {
    match self {
      Teardown::Action(_) => false,
      Teardown::Child(child) => child.is_closed(),
    }
  }
}

struct Inner {
  closed: AtomicBool,
  teardown: Mutex<SmallVec<[Teardown; 2]>>,
}

/// Handle returned by `subscribe` that cancels the subscription.
///
/// `unsubscribe` may be called any number of times, from any thread, and
/// from inside a signal delivered by the very subscription it cancels.
#[derive(Clone)]
pub struct Subscription(Arc<Inner>);

impl Subscription {
  /// A subscription with nothing to clean up yet.
  pub fn empty() -> Self {
    Subscription(Arc::new(Inner {
      closed: AtomicBool::new(false),
      teardown: Mutex::new(SmallVec::new()),
    }))
  }

  /// A subscription that is already closed. Used by sources that finish
  /// synchronously and have nothing to cancel.
  pub fn closed() -> Self {
    let sub = Self::empty();
    sub.0.closed.store(true, Ordering::Release);
    sub
  }

  /// A subscription that runs `action` when it is unsubscribed.
  pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
    let sub = Self::empty();
    sub.add_action(action);
    sub
  }

  /// Attach a child subscription. If `self` is already closed the child is
  /// unsubscribed immediately.
  pub fn add(&self, child: Subscription) {
    if self.ptr_eq(&child) || child.is_closed() {
      return;
    }
    self.push(Teardown::Child(child));
  }

  /// Attach a cleanup action. If `self` is already closed the action runs
  /// immediately.
  pub fn add_action(&self, action: impl FnOnce() + Send + 'static) {
    self.push(Teardown::Action(Box::new(action)));
  }

  fn push(&self, teardown: Teardown) {
    let rejected = {
      let mut list = lock(&self.0.teardown);
      // Checked under the lock so a concurrent `unsubscribe` either sees this
      // entry or we see its closed flag.
      if self.is_closed() {
        Some(teardown)
      } else {
        list.retain(|t| !t.is_closed());
        list.push(teardown);
        None
      }
    };
    if let Some(teardown) = rejected {
      teardown.run();
    }
  }

  /// Run every attached teardown once. Later calls are no-ops.
  pub fn unsubscribe(&self) {
    if self.0.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    let list = std::mem::take(&mut *lock(&self.0.teardown));
    for teardown in list {
      teardown.run();
    }
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.closed.load(Ordering::Acquire) }

  /// Whether two handles refer to the same subscription.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }

  /// Number of pending teardowns. Closed children are pruned lazily.
  pub fn teardown_size(&self) -> usize { lock(&self.0.teardown).len() }

  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard::new(self) }
}

impl Default for Subscription {
  fn default() -> Self { Self::empty() }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("is_closed", &self.is_closed())
      .field("teardown_count", &self.teardown_size())
      .finish()
  }
}

/// Compose many subscriptions into one that disposes all of them.
impl FromIterator<Subscription> for Subscription {
  fn from_iter<I: IntoIterator<Item = Subscription>>(iter: I) -> Self {
    let composite = Subscription::empty();
    for child in iter {
      composite.add(child);
    }
    composite
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Option<Subscription>);

impl SubscriptionGuard {
  pub fn new(subscription: Subscription) -> SubscriptionGuard {
    SubscriptionGuard(Some(subscription))
  }

  /// Give up the guard without unsubscribing.
  pub fn into_inner(mut self) -> Subscription {
    self.0.take().unwrap_or_else(Subscription::closed)
  }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.unsubscribe();
    }
  }
}
