//! The observable core.
//!
//! An [`Observable`] is a shared handle to an [`ObservableCore`]: the
//! emission callback supplied by a factory, the registry of live
//! subscribers, and the state that decides how long the core stays alive.
//!
//! # Lifetime
//!
//! A core registers itself in the process-wide active set (see
//! [`registry`](crate::registry)) when it is built, and schedules a
//! grace-period check on its lifetime scheduler. If the check finds no
//! subscribers the core leaves the active set and lives only as long as
//! somebody holds an `Observable` handle, until the next subscriber puts it
//! back. Whenever the last subscriber leaves another check is requested. Checks and cancellation actions hold `Weak`
//! references, so they never extend the life of a core.
//!
//! # Factories
//!
//! | Function | Behavior on subscribe |
//! |---|---|
//! | [`create`] | runs the given callback |
//! | [`just`] | `next(value)`, then `complete()` |
//! | [`failed`] | `error(err)` |
//! | [`empty`] | `complete()` |
//! | [`never`] | nothing |
//! | [`generate`] | iterates a successor function on a scheduler |
//! | [`start`] | runs blocking work once and replays its outcome |
//!
//! Every factory is also available on [`ObservableBuilder`], which sets the
//! diagnostic name and the lifetime scheduler.

use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, Weak,
  },
};

use smallvec::SmallVec;

use crate::{
  observer::{FnObserver, Observer, SafeObserver, SharedObserver},
  rc::lock,
  registry,
  scheduler::{default_scheduler, Scheduler, SchedulerRef},
  subscription::Subscription,
};

mod create;
mod generate;
mod start;
mod subscribers;
mod trivial;

pub use create::create;
pub use generate::generate;
pub use start::start;
pub use trivial::{empty, failed, just, never};

pub(crate) use subscribers::Subscribers;

/// Emission callback: runs once per subscription with the (guarded) observer
/// and returns the subscription that cancels whatever it started.
pub type OnSubscribe<Item, Err> =
  Box<dyn Fn(SharedObserver<Item, Err>) -> Subscription + Send + Sync>;

// ============================================================================
// ObservableBuilder
// ============================================================================

/// Configuration shared by all factories.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let scheduler = TestScheduler::new();
/// let numbers = ObservableBuilder::new()
///   .name("numbers")
///   .lifetime_scheduler(scheduler.clone())
///   .just::<i32, ()>(1);
/// assert_eq!(numbers.name(), Some("numbers"));
/// ```
#[derive(Clone, Default)]
pub struct ObservableBuilder {
  name: Option<String>,
  lifetime_scheduler: Option<SchedulerRef>,
}

impl ObservableBuilder {
  pub fn new() -> Self { Self::default() }

  /// Diagnostic label, shown in `Debug` output and log fields.
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Scheduler hosting the grace-period checks. Defaults to
  /// [`default_scheduler`].
  pub fn lifetime_scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
    self.lifetime_scheduler = Some(Arc::new(scheduler));
    self
  }
}

// ============================================================================
// ObservableCore
// ============================================================================

/// Shared state behind an [`Observable`] handle.
pub struct ObservableCore<Item, Err> {
  id: usize,
  name: Option<String>,
  on_subscribe: Option<OnSubscribe<Item, Err>>,
  subscribers: Mutex<Subscribers<SharedObserver<Item, Err>>>,
  tearing_down: AtomicBool,
  grace_check_pending: AtomicBool,
  lifetime_scheduler: SchedulerRef,
}

impl<Item, Err> ObservableCore<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Schedule a grace-period check unless one is already pending.
  fn request_grace_check(core: &Arc<Self>) {
    if core.grace_check_pending.swap(true, Ordering::AcqRel) {
      return;
    }
    let weak = Arc::downgrade(core);
    let _handle = core.lifetime_scheduler.schedule(
      Box::new(move || {
        if let Some(core) = weak.upgrade() {
          core.grace_check();
        }
      }),
      None,
    );
  }

  fn grace_check(&self) {
    self.grace_check_pending.store(false, Ordering::Release);
    // Checked and released under the subscriber lock, so a concurrent
    // `subscribe` either is seen here or re-registers the core after us.
    let (released, subscribers) = {
      let subscribers = lock(&self.subscribers);
      let released = if subscribers.is_empty() { registry::take(self.id) } else { None };
      (released, subscribers.len())
    };
    if released.is_some() {
      tracing::debug!(core = self.id, name = ?self.name, "released from active set");
    } else {
      tracing::trace!(core = self.id, subscribers, "grace check kept core");
    }
  }

  /// Default cancellation action of a subscription.
  ///
  /// The entry is removed even while tearing down: `tear_down` only clears
  /// the entries present when it runs.
  fn remove_entry(core: &Arc<Self>, entry: usize) {
    let (removed, remaining, now_empty) = {
      let mut subscribers = lock(&core.subscribers);
      let removed = subscribers.remove(entry);
      (removed, subscribers.len(), subscribers.is_empty())
    };
    if removed.is_none() {
      return;
    }
    tracing::trace!(core = core.id, subscribers = remaining, "unsubscribed");
    if now_empty && !core.tearing_down.load(Ordering::Acquire) {
      Self::request_grace_check(core);
    }
  }
}

// ============================================================================
// Observable
// ============================================================================

/// A push-based source of `Item` values that ends with an `Err` or a
/// completion.
///
/// Cloning an `Observable` clones the handle, not the source: clones share
/// one core. Cores are compared by identity only, see [`Observable::ptr_eq`].
///
/// ```rust
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// let _ = observable::just::<_, ()>(42).subscribe_fn(move |v| c_seen.lock().unwrap().push(v));
/// assert_eq!(*seen.lock().unwrap(), vec![42]);
/// ```
pub struct Observable<Item, Err>(Arc<ObservableCore<Item, Err>>);

impl<Item, Err> Clone for Observable<Item, Err> {
  fn clone(&self) -> Self { Observable(self.0.clone()) }
}

impl<Item, Err> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  pub(crate) fn build(builder: ObservableBuilder, on_subscribe: Option<OnSubscribe<Item, Err>>) -> Self {
    Self::build_cyclic(builder, |_| on_subscribe)
  }

  /// Build a core whose callback needs a weak reference back to the core.
  pub(crate) fn build_cyclic(
    builder: ObservableBuilder,
    on_subscribe: impl FnOnce(&Weak<ObservableCore<Item, Err>>) -> Option<OnSubscribe<Item, Err>>,
  ) -> Self {
    let ObservableBuilder { name, lifetime_scheduler } = builder;
    let core = Arc::new_cyclic(|weak| ObservableCore {
      id: registry::next_id(),
      name,
      on_subscribe: on_subscribe(weak),
      subscribers: Mutex::default(),
      tearing_down: AtomicBool::new(false),
      grace_check_pending: AtomicBool::new(false),
      lifetime_scheduler: lifetime_scheduler.unwrap_or_else(default_scheduler),
    });
    registry::retain(core.id, core.clone());
    tracing::debug!(core = core.id, name = ?core.name, "observable created");
    ObservableCore::request_grace_check(&core);
    Observable(core)
  }

  /// Subscribe `observer` and return the handle that cancels this
  /// subscription.
  ///
  /// The emission callback runs synchronously on the calling thread. The
  /// returned subscription is effective while the callback runs: a source
  /// that emits synchronously stops delivering as soon as it is disposed.
  pub fn subscribe<O>(&self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    let core = &self.0;
    let observer: SharedObserver<Item, Err> = Arc::new(observer);
    let subscription = Subscription::empty();
    let guarded: SharedObserver<Item, Err> =
      Arc::new(SafeObserver::new(observer.clone(), subscription.clone()));

    let (entry, count, retained) = {
      let mut subscribers = lock(&core.subscribers);
      let entry = subscribers.add(guarded.clone());
      let retained = !core.tearing_down.load(Ordering::Acquire)
        && registry::retain_if_absent(core.id, || core.clone() as registry::Entry);
      (entry, subscribers.len(), retained)
    };
    if retained {
      tracing::debug!(core = core.id, name = ?core.name, "returned to active set");
    }
    tracing::trace!(core = core.id, subscribers = count, "subscribed");

    let weak = Arc::downgrade(core);
    subscription.add_action(move || {
      if let Some(core) = weak.upgrade() {
        ObservableCore::remove_entry(&core, entry);
      }
    });

    if let Some(on_subscribe) = &core.on_subscribe {
      subscription.add(on_subscribe(guarded));
    }

    observer.receive_subscription(subscription.clone());
    subscription
  }

  /// Subscribe with a value handler only; errors and completion are ignored.
  pub fn subscribe_fn<N>(&self, next: N) -> Subscription
  where
    N: Fn(Item) + Send + Sync + 'static,
  {
    self.subscribe(FnObserver::new(next, |_: Err| {}, || {}))
  }

  /// Subscribe with one handler per signal.
  pub fn subscribe_all<N, E, C>(&self, next: N, error: E, complete: C) -> Subscription
  where
    N: Fn(Item) + Send + Sync + 'static,
    E: Fn(Err) + Send + Sync + 'static,
    C: Fn() + Send + Sync + 'static,
  {
    self.subscribe(FnObserver::new(next, error, complete))
  }

  /// Run `action` on every current subscriber.
  ///
  /// The registry is copied under its lock and `action` runs after the lock
  /// is released, so an action may subscribe to or unsubscribe from this
  /// very core.
  pub fn for_each_subscriber(&self, mut action: impl FnMut(&SharedObserver<Item, Err>)) {
    let snapshot = lock(&self.0.subscribers).snapshot();
    for observer in snapshot.iter() {
      action(observer);
    }
  }

  /// Retire the core: drop every subscriber entry at once and leave the
  /// active set for good. Per-subscription cancellation actions no longer
  /// request grace checks, and later subscribers never put the core back
  /// into the active set.
  ///
  /// Meant for sources built on top of the core (such as subjects) that
  /// decide they are done. Idempotent.
  pub fn tear_down(&self) {
    let core = &self.0;
    let first = !core.tearing_down.swap(true, Ordering::AcqRel);
    let dropped = lock(&core.subscribers).drain();
    registry::release(core.id);
    if first {
      tracing::debug!(core = core.id, name = ?core.name, dropped = dropped.len(), "torn down");
    }
  }

  /// Take every subscriber out of the registry without running their
  /// cancellation actions.
  pub(crate) fn drain_subscribers(&self) -> SmallVec<[SharedObserver<Item, Err>; 2]> {
    lock(&self.0.subscribers).drain()
  }

  /// Remove the entry holding exactly `observer`. Returns whether it was
  /// still registered.
  pub(crate) fn remove_subscriber(&self, observer: &SharedObserver<Item, Err>) -> bool {
    let target = Arc::as_ptr(observer) as *const ();
    let removed = lock(&self.0.subscribers).remove_where(|ob| Arc::as_ptr(ob) as *const () == target);
    removed.is_some()
  }

  /// Recover a handle from the weak reference given to `build_cyclic`.
  pub(crate) fn upgrade(core: &Weak<ObservableCore<Item, Err>>) -> Option<Self> {
    core.upgrade().map(Observable)
  }

  #[cfg(test)]
  pub(crate) fn downgrade(&self) -> Weak<ObservableCore<Item, Err>> { Arc::downgrade(&self.0) }
}

impl<Item, Err> Observable<Item, Err> {
  /// Process-unique id, also the key of this core in the active set.
  #[inline]
  pub fn id(&self) -> usize { self.0.id }

  #[inline]
  pub fn name(&self) -> Option<&str> { self.0.name.as_deref() }

  pub fn subscriber_count(&self) -> usize { lock(&self.0.subscribers).len() }

  /// Whether the active set currently keeps this core alive.
  pub fn is_active(&self) -> bool { registry::contains(self.0.id) }

  pub fn is_tearing_down(&self) -> bool { self.0.tearing_down.load(Ordering::Acquire) }

  /// Whether both handles refer to the same core.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl<Item, Err> Debug for Observable<Item, Err> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Observable")
      .field("id", &self.id())
      .field("name", &self.name())
      .field("subscribers", &self.subscriber_count())
      .field("tearing_down", &self.is_tearing_down())
      .finish()
  }
}
