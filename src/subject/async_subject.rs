use smallvec::SmallVec;

use crate::{
  observable::{Observable, ObservableBuilder, OnSubscribe},
  observer::{Observer, SharedObserver},
  rc::MutArc,
  subscription::Subscription,
};

enum AsyncState<Item, Err> {
  /// Still open, holding the latest value.
  Pending(Option<Item>),
  Completed(Option<Item>),
  Failed(Err),
}

/// Outcome replayed to a subscriber.
enum Outcome<Item, Err> {
  Completed(Option<Item>),
  Failed(Err),
}

impl<Item: Clone, Err: Clone> AsyncState<Item, Err> {
  fn outcome(&self) -> Option<Outcome<Item, Err>> {
    match self {
      AsyncState::Pending(_) => None,
      AsyncState::Completed(last) => Some(Outcome::Completed(last.clone())),
      AsyncState::Failed(err) => Some(Outcome::Failed(err.clone())),
    }
  }
}

impl<Item: Clone, Err: Clone> Outcome<Item, Err> {
  fn deliver(&self, observer: &dyn Observer<Item, Err>) {
    match self {
      Outcome::Completed(last) => {
        if let Some(last) = last {
          observer.next(last.clone());
        }
        observer.complete();
      }
      Outcome::Failed(err) => observer.error(err.clone()),
    }
  }
}

/// A subject that emits only its final outcome.
///
/// Values fed with `next` are buffered, only the latest is kept. On
/// `complete` every subscriber receives that latest value (if any) followed
/// by `complete()`; on `error` every subscriber receives the error. Anything
/// fed after the first terminal signal is ignored.
///
/// Subscribers arriving after the outcome is known get it replayed
/// immediately. Either way each subscriber sees the outcome exactly once.
///
/// ```rust
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let subject = AsyncSubject::<i32, ()>::new();
/// subject.next(1);
/// subject.next(2);
/// subject.complete();
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// let _ = subject.subscribe_fn(move |v| c_seen.lock().unwrap().push(v));
/// assert_eq!(*seen.lock().unwrap(), vec![2]);
/// ```
pub struct AsyncSubject<Item, Err> {
  core: Observable<Item, Err>,
  state: MutArc<AsyncState<Item, Err>>,
}

impl<Item, Err> Clone for AsyncSubject<Item, Err> {
  fn clone(&self) -> Self { AsyncSubject { core: self.core.clone(), state: self.state.clone() } }
}

impl<Item, Err> AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub fn new() -> Self { Self::with_builder(ObservableBuilder::default()) }

  /// Create a subject whose core uses the name and lifetime scheduler of
  /// `builder`.
  pub fn with_builder(builder: ObservableBuilder) -> Self {
    let state = MutArc::own(AsyncState::Pending(None));
    let c_state = state.clone();
    let core = Observable::build_cyclic(builder, move |weak| {
      let weak = weak.clone();
      let on_subscribe: OnSubscribe<Item, Err> = Box::new(move |observer: SharedObserver<Item, Err>| {
        // The registry was drained when the outcome was recorded, so a
        // subscriber still registered here has not been delivered to yet.
        let replay = {
          let state = c_state.rc_deref_mut();
          state.outcome().filter(|_| {
            Observable::upgrade(&weak).map_or(false, |core| core.remove_subscriber(&observer))
          })
        };
        if let Some(outcome) = replay {
          outcome.deliver(&*observer);
        }
        Subscription::closed()
      });
      Some(on_subscribe)
    });
    AsyncSubject { core, state }
  }

  /// Record `terminal` and hand back the observers waiting for it. Returns
  /// nothing if the subject already finished.
  fn finish(
    &self,
    terminal: impl FnOnce(Option<Item>) -> AsyncState<Item, Err>,
  ) -> Option<SmallVec<[SharedObserver<Item, Err>; 2]>> {
    let mut state = self.state.rc_deref_mut();
    let last = match &mut *state {
      AsyncState::Pending(last) => last.take(),
      _ => return None,
    };
    *state = terminal(last);
    let observers = self.core.drain_subscribers();
    self.core.tear_down();
    Some(observers)
  }

  #[inline]
  pub fn subscribe<O>(&self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    self.core.subscribe(observer)
  }

  #[inline]
  pub fn subscribe_fn<N>(&self, next: N) -> Subscription
  where
    N: Fn(Item) + Send + Sync + 'static,
  {
    self.core.subscribe_fn(next)
  }

  #[inline]
  pub fn subscribe_all<N, E, C>(&self, next: N, error: E, complete: C) -> Subscription
  where
    N: Fn(Item) + Send + Sync + 'static,
    E: Fn(Err) + Send + Sync + 'static,
    C: Fn() + Send + Sync + 'static,
  {
    self.core.subscribe_all(next, error, complete)
  }

  /// Whether a terminal signal has been recorded.
  pub fn is_finished(&self) -> bool { !matches!(&*self.state.rc_deref_mut(), AsyncState::Pending(_)) }
}

impl<Item, Err> AsyncSubject<Item, Err> {
  /// The source side of this subject.
  #[inline]
  pub fn as_observable(&self) -> &Observable<Item, Err> { &self.core }

  #[inline]
  pub fn into_observable(self) -> Observable<Item, Err> { self.core }
}

impl<Item, Err> Default for AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn default() -> Self { Self::new() }
}

impl<Item, Err> From<AsyncSubject<Item, Err>> for Observable<Item, Err> {
  fn from(subject: AsyncSubject<Item, Err>) -> Self { subject.into_observable() }
}

impl<Item, Err> Observer<Item, Err> for AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn next(&self, value: Item) {
    if let AsyncState::Pending(last) = &mut *self.state.rc_deref_mut() {
      *last = Some(value);
    }
  }

  fn error(&self, err: Err) {
    let outcome = Outcome::Failed(err.clone());
    if let Some(observers) = self.finish(move |_| AsyncState::Failed(err)) {
      for observer in observers.iter() {
        outcome.deliver(&**observer);
      }
    }
  }

  fn complete(&self) {
    let mut outcome = None;
    let observers = self.finish(|last| {
      outcome = Some(Outcome::Completed(last.clone()));
      AsyncState::Completed(last)
    });
    if let (Some(observers), Some(outcome)) = (observers, outcome) {
      for observer in observers.iter() {
        outcome.deliver(&**observer);
      }
    }
  }
}

impl<Item, Err> std::fmt::Debug for AsyncSubject<Item, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let state = match &*self.state.rc_deref_mut() {
      AsyncState::Pending(_) => "pending",
      AsyncState::Completed(_) => "completed",
      AsyncState::Failed(_) => "failed",
    };
    f.debug_struct("AsyncSubject").field("core", &self.core).field("state", &state).finish()
  }
}
