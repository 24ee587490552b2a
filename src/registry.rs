//! Process-wide set of active cores.
//!
//! Holds a strong reference to every core that has at least one subscriber or
//! is inside its creation grace period, so a core returned from a factory
//! survives until somebody subscribes to it or stores it, without the caller
//! having to keep a handle. Entries are added on construction and again when
//! a released core gains a subscriber, and removed by grace-period checks and
//! teardown; user code never iterates the set.

use std::{
  any::Any,
  collections::{hash_map, HashMap},
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
};

use once_cell::sync::Lazy;

use crate::rc::MutArc;

pub(crate) type Entry = Arc<dyn Any + Send + Sync>;

static ACTIVE: Lazy<MutArc<HashMap<usize, Entry>>> = Lazy::new(MutArc::default);
static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Allocate a process-unique core id.
pub(crate) fn next_id() -> usize { NEXT_ID.fetch_add(1, Ordering::Relaxed) }

pub(crate) fn retain(id: usize, core: Entry) {
  let previous = ACTIVE.rc_deref_mut().insert(id, core);
  debug_assert!(previous.is_none(), "core {id} registered twice");
}

/// Put `id` back into the active set unless it is already there. `core` is
/// only called when an entry is inserted. Returns whether it was inserted.
pub(crate) fn retain_if_absent(id: usize, core: impl FnOnce() -> Entry) -> bool {
  match ACTIVE.rc_deref_mut().entry(id) {
    hash_map::Entry::Occupied(_) => false,
    hash_map::Entry::Vacant(slot) => {
      slot.insert(core());
      true
    }
  }
}

/// Remove `id` from the active set and hand back its entry, so the caller
/// decides where the reference is dropped.
#[must_use]
pub(crate) fn take(id: usize) -> Option<Entry> { ACTIVE.rc_deref_mut().remove(&id) }

/// Remove `id` from the active set. Returns whether it was present.
///
/// The entry is dropped after the lock is released: dropping the last
/// reference to a core drops its emission callback, which runs user code.
pub(crate) fn release(id: usize) -> bool { take(id).is_some() }

/// Whether the core with `id` is currently kept alive by the active set.
pub fn contains(id: usize) -> bool { ACTIVE.rc_deref_mut().contains_key(&id) }

/// Number of cores currently kept alive by the active set.
pub fn len() -> usize { ACTIVE.rc_deref_mut().len() }
