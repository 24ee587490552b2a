//! # rxcore: a self-retaining observable core
//!
//! Push-based observable sequences with composable cancellation. A source
//! emits values, an error, or a completion to any number of observers; every
//! subscription returns a [`Subscription`] that stops further delivery when
//! disposed.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(vec![]));
//! let c_seen = seen.clone();
//! let _ = observable::generate::<_, (), _, _>(1, |x| (*x < 3).then(|| x + 1), ImmediateScheduler)
//!   .subscribe_fn(move |v| c_seen.lock().unwrap().push(v));
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Shared handle to a source core |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` signals |
//! | [`Subscription`] | Idempotent, composable cancellation handle |
//! | [`Scheduler`] | Decides where and when deferred work runs |
//! | [`AsyncSubject`] | Replays a single final outcome to every subscriber |
//!
//! A source returned from a factory keeps itself alive while it has
//! subscribers and for one grace check after creation, so it can be
//! subscribed without storing it.
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `ThreadPoolScheduler`, also the
//!   process default scheduler
//! - **`timer`** (default): delayed tasks on the thread pool wait
//!   asynchronously instead of blocking a pool thread
//! - **`tokio-scheduler`**: `TokioScheduler` over a tokio runtime handle
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler
//! [`AsyncSubject`]: subject::AsyncSubject

pub mod error;
pub mod observable;
pub mod observer;
pub mod prelude;
pub mod rc;
pub mod registry;
pub mod scheduler;
pub mod subject;
pub mod subscription;

#[cfg(test)]
mod test_util;

pub use prelude::*;

#[cfg(all(doctest, not(target_arch = "wasm32")))]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
