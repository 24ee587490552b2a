use std::sync::{Arc, Mutex};

use crate::{observer::Observer, subscription::Subscription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

type Hook<Item> = Box<dyn Fn(&Item, &Subscription) + Send + Sync>;

struct State<Item, Err> {
  events: Vec<Event<Item, Err>>,
  subscription: Option<Subscription>,
}

/// Observer that records every signal it receives.
pub(crate) struct Recorder<Item, Err> {
  state: Arc<Mutex<State<Item, Err>>>,
  on_next: Option<Arc<Hook<Item>>>,
}

impl<Item, Err> Clone for Recorder<Item, Err> {
  fn clone(&self) -> Self { Recorder { state: self.state.clone(), on_next: self.on_next.clone() } }
}

impl<Item, Err> Recorder<Item, Err> {
  pub(crate) fn new() -> Self {
    Recorder {
      state: Arc::new(Mutex::new(State { events: vec![], subscription: None })),
      on_next: None,
    }
  }

  /// Run `hook` after each recorded value with the received subscription.
  pub(crate) fn with_hook(hook: impl Fn(&Item, &Subscription) + Send + Sync + 'static) -> Self {
    let mut recorder = Self::new();
    recorder.on_next = Some(Arc::new(Box::new(hook)));
    recorder
  }

  pub(crate) fn events(&self) -> Vec<Event<Item, Err>>
  where
    Item: Clone,
    Err: Clone,
  {
    self.state.lock().unwrap().events.clone()
  }

  pub(crate) fn subscription(&self) -> Option<Subscription> {
    self.state.lock().unwrap().subscription.clone()
  }
}

impl<Item, Err> Observer<Item, Err> for Recorder<Item, Err>
where
  Item: Clone + Send,
  Err: Send,
{
  fn next(&self, value: Item) {
    let subscription = {
      let mut state = self.state.lock().unwrap();
      state.events.push(Event::Next(value.clone()));
      state.subscription.clone()
    };
    if let (Some(hook), Some(sub)) = (&self.on_next, subscription) {
      hook(&value, &sub);
    }
  }

  fn error(&self, err: Err) { self.state.lock().unwrap().events.push(Event::Error(err)); }

  fn complete(&self) { self.state.lock().unwrap().events.push(Event::Complete); }

  fn receive_subscription(&self, subscription: Subscription) {
    self.state.lock().unwrap().subscription = Some(subscription);
  }
}
