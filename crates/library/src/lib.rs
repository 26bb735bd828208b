//! The library aggregation pipeline.
//!
//! Turns the raw contents of a manga library (entries, categories and
//! tracking rows) into the per-category, display-ready lists a library
//! screen renders. One *pass* runs three stages, each a pure function over
//! its inputs:
//!
//! 1. [`badge::annotate`] fills in the per-item badges (download count,
//!    unread count, local flag, source language) or their "disabled"
//!    sentinels.
//! 2. [`filter::Filter`] drops items that fail any of the configured
//!    tri-state filters.
//! 3. [`sort::apply`] orders each category by its own sort mode and
//!    direction.
//!
//! The [`pipeline`] module composes the upstream change streams and the
//! re-run triggers into a single continuously-updated [`Library`], and
//! [`projection`] derives the small presentation values (item counts,
//! toolbar title) from it.
//!
//! Everything the pipeline needs from the outside world (download counts,
//! source languages, read history...) is reached through the traits in
//! [`context`], so the stages can be exercised without a database.

pub mod badge;
pub mod categories;
pub mod context;
pub mod error;
pub mod filter;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod models;
pub mod pipeline;
pub mod projection;
pub mod sort;
pub mod tracks;

pub use crate::context::Context;
pub use crate::models::{Library, LibraryMap};
pub use crate::pipeline::{LibraryPipeline, Status};
