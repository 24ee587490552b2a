use super::{Observable, ObservableBuilder};
use crate::subscription::Subscription;

impl ObservableBuilder {
  /// Emits `value` then completes, synchronously on subscribe.
  pub fn just<Item, Err>(self, value: Item) -> Observable<Item, Err>
  where
    Item: Clone + Send + Sync + 'static,
    Err: Send + 'static,
  {
    self.create(move |observer| {
      observer.next(value.clone());
      observer.complete();
      Subscription::closed()
    })
  }

  /// Emits `err`, synchronously on subscribe.
  pub fn failed<Item, Err>(self, err: Err) -> Observable<Item, Err>
  where
    Item: Send + 'static,
    Err: Clone + Send + Sync + 'static,
  {
    self.create(move |observer| {
      observer.error(err.clone());
      Subscription::closed()
    })
  }

  /// Completes immediately on subscribe.
  pub fn empty<Item, Err>(self) -> Observable<Item, Err>
  where
    Item: Send + 'static,
    Err: Send + 'static,
  {
    self.create(|observer| {
      observer.complete();
      Subscription::closed()
    })
  }

  /// Never emits anything. Subscribing only registers the observer.
  pub fn never<Item, Err>(self) -> Observable<Item, Err>
  where
    Item: Send + 'static,
    Err: Send + 'static,
  {
    Observable::build(self, None)
  }
}

/// Creates an observable producing a single value.
pub fn just<Item, Err>(value: Item) -> Observable<Item, Err>
where
  Item: Clone + Send + Sync + 'static,
  Err: Send + 'static,
{
  ObservableBuilder::default().just(value)
}

/// Creates an observable that emits an error right away.
pub fn failed<Item, Err>(err: Err) -> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Clone + Send + Sync + 'static,
{
  ObservableBuilder::default().failed(err)
}

/// Creates an observable that produces no values and completes at once.
pub fn empty<Item, Err>() -> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  ObservableBuilder::default().empty()
}

/// Creates an observable that never emits anything.
pub fn never<Item, Err>() -> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  ObservableBuilder::default().never()
}

#[cfg(test)]
mod test {
  use crate::{
    prelude::*,
    test_util::{Event, Recorder},
  };

  fn builder() -> ObservableBuilder { ObservableBuilder::new().lifetime_scheduler(TestScheduler::new()) }

  #[rxcore_macro::test]
  fn just_emits_value_then_completes() {
    let recorder = Recorder::<i32, ()>::new();
    let sub = builder().just(1).subscribe(recorder.clone());
    assert_eq!(recorder.events(), vec![Event::Next(1), Event::Complete]);
    assert!(sub.is_closed());
  }

  #[rxcore_macro::test]
  fn just_replays_for_every_subscriber() {
    let obs = builder().just::<_, ()>("hi");
    let a = Recorder::new();
    let b = Recorder::new();
    let _ = obs.subscribe(a.clone());
    let _ = obs.subscribe(b.clone());
    assert_eq!(a.events(), b.events());
    assert_eq!(a.events().len(), 2);
  }

  #[rxcore_macro::test]
  fn failed_emits_only_error() {
    let recorder = Recorder::<i32, String>::new();
    let _ = builder().failed("bad".to_owned()).subscribe(recorder.clone());
    assert_eq!(recorder.events(), vec![Event::Error("bad".to_owned())]);
  }

  #[rxcore_macro::test]
  fn empty_only_completes() {
    let recorder = Recorder::<i32, ()>::new();
    let _ = builder().empty().subscribe(recorder.clone());
    assert_eq!(recorder.events(), vec![Event::Complete]);
  }

  #[rxcore_macro::test]
  fn never_emits_nothing() {
    let recorder = Recorder::<i32, ()>::new();
    let obs = builder().never();
    let sub = obs.subscribe(recorder.clone());
    assert!(recorder.events().is_empty());
    assert!(!sub.is_closed());
    sub.unsubscribe();
    assert!(recorder.events().is_empty());
  }

  #[rxcore_macro::test]
  fn subscribe_all_routes_signals() {
    use std::sync::{Arc, Mutex};

    let log = Arc::new(Mutex::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let _ = builder().just::<_, ()>(3).subscribe_all(
      move |v| l1.lock().unwrap().push(format!("next {v}")),
      move |_| l2.lock().unwrap().push("error".to_owned()),
      move || l3.lock().unwrap().push("complete".to_owned()),
    );
    assert_eq!(*log.lock().unwrap(), vec!["next 3".to_owned(), "complete".to_owned()]);
  }
}
