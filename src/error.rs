//! Errors raised by the crate itself.
//!
//! Errors produced by a source are never represented here: they travel to
//! observers as the terminal `error` signal, typed by the source's own `Err`
//! parameter. `RxError` only covers failures of the machinery around a
//! source, such as a scheduler that cannot be built.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RxError {
  /// The thread pool backing a scheduler could not be started.
  #[error("failed to build scheduler: {0}")]
  SchedulerBuild(#[from] std::io::Error),

  /// A runtime refused to accept a task.
  #[error("failed to spawn task on {scheduler}: {reason}")]
  Spawn { scheduler: &'static str, reason: String },

  /// No async runtime is reachable from the calling thread.
  #[error("no runtime available: {0}")]
  NoRuntime(String),
}
