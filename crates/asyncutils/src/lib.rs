//! Small reactive building blocks shared by the library pipeline.
//!
//! - [`Observable`] holds one value, hands out clones of the latest value,
//!   and streams every change to any number of subscribers. Subscribers that
//!   fall behind only ever see the newest value; intermediate states are
//!   dropped rather than queued.
//! - [`Trigger`] is a value-less [`Observable`]: firing it wakes every
//!   subscriber so that whatever depends on it gets re-derived.
//!
//! Both are thin wrappers over [`tokio::sync::watch`], so they work with any
//! executor that can poll a [`futures::Stream`], not just Tokio's.

mod observable;
mod trigger;

pub use crate::observable::Observable;
pub use crate::trigger::Trigger;
