use super::{Observable, ObservableBuilder};
use crate::{observer::SharedObserver, subscription::Subscription};

impl ObservableBuilder {
  /// Build a core around an emission callback.
  ///
  /// `on_subscribe` runs once per subscription, on the subscribing thread,
  /// and returns the subscription that cancels whatever it started.
  pub fn create<Item, Err, F>(self, on_subscribe: F) -> Observable<Item, Err>
  where
    Item: Send + 'static,
    Err: Send + 'static,
    F: Fn(SharedObserver<Item, Err>) -> Subscription + Send + Sync + 'static,
  {
    Observable::build(self, Some(Box::new(on_subscribe)))
  }
}

/// param `on_subscribe`: the function that is called when the Observable is
/// initially subscribed to. This function is given an observer, to which
/// new values can be `next`ed, or an `error` method can be called to raise
/// an error, or `complete` can be called to notify of a successful
/// completion. It returns the subscription that cancels the work it started.
pub fn create<Item, Err, F>(on_subscribe: F) -> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
  F: Fn(SharedObserver<Item, Err>) -> Subscription + Send + Sync + 'static,
{
  ObservableBuilder::default().create(on_subscribe)
}
