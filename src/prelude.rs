//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Errors
pub use crate::error::RxError;
// Core types and factories
pub use crate::observable::{self, Observable, ObservableBuilder, ObservableCore, OnSubscribe};
// Observer trait
pub use crate::observer::{FnObserver, Observer, SharedObserver};
// Schedulers
pub use crate::scheduler::{
  default_scheduler, ImmediateScheduler, NewThreadScheduler, Scheduler, SchedulerRef, Task,
  TestScheduler,
};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::{ThreadPoolScheduler, ThreadPoolSchedulerBuilder};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
// Subject
pub use crate::subject::AsyncSubject;
// Subscription
pub use crate::subscription::{Subscription, SubscriptionGuard};
