use smallvec::SmallVec;

/// Subscriber registry of a core, with ID-based tracking.
///
/// Every `subscribe` call gets its own id, so one observer subscribed twice
/// occupies two entries that are removed independently.
///
/// # Design
///
/// - **SmallVec Optimization**: Uses `SmallVec<[_; 2]>` to avoid heap
///   allocation for the common case of 0-2 subscribers.
/// - **Snapshot fan-out**: `snapshot` clones the handles so callers can
///   deliver signals after releasing the registry lock.
pub(crate) struct Subscribers<Ob> {
  next_id: usize,
  items: SmallVec<[(usize, Ob); 2]>,
}

impl<Ob> Default for Subscribers<Ob> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<Ob> Subscribers<Ob> {
  /// Add an observer and return its unique ID.
  #[inline]
  pub(crate) fn add(&mut self, observer: Ob) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, observer));
    id
  }

  /// Remove an observer by ID.
  pub(crate) fn remove(&mut self, id: usize) -> Option<Ob> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  /// Remove the first observer matching `pred`.
  pub(crate) fn remove_where(&mut self, pred: impl Fn(&Ob) -> bool) -> Option<Ob> {
    self
      .items
      .iter()
      .position(|(_, ob)| pred(ob))
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub(crate) fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Take every observer out, leaving the registry empty.
  pub(crate) fn drain(&mut self) -> SmallVec<[Ob; 2]> {
    self.items.drain(..).map(|(_, ob)| ob).collect()
  }
}

impl<Ob: Clone> Subscribers<Ob> {
  /// Point-in-time copy of the registered observers.
  pub(crate) fn snapshot(&self) -> SmallVec<[Ob; 2]> {
    self.items.iter().map(|(_, ob)| ob.clone()).collect()
  }
}
