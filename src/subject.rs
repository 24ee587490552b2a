//! Subjects are both an [`Observer`](crate::observer::Observer) and a source:
//! whatever is fed into them is broadcast to their subscribers.

mod async_subject;

pub use async_subject::AsyncSubject;
