#![deny(missing_docs)]
//! Turns domain webhook events into persisted notifications.
//!
//! One [`NotificationFanout`] instance owns the whole pipeline: it routes an
//! incoming event to its family handler, resolves the recipients the event
//! concerns (authors, prior commenters, mentioned users, reviewers, or a
//! permission-gated slice of the space), drops anyone the space's
//! notification toggles silence, and writes one record per recipient through
//! the [`store::NotificationStore`]. Redelivered events are absorbed by the
//! store's uniqueness guarantee, so dispatching is safe to retry.
//!
//! All reads and writes go through the narrow traits in [`store`]; the
//! [`memory`] module provides a single in-memory implementation of all of
//! them for tests and local experiments.

mod engine;
mod error;
mod handlers;
pub mod memory;
pub mod store;

pub use engine::{NotificationFanout, DEFAULT_PERMISSION_CONCURRENCY};
pub use error::{FanoutError, ResourceKind};
pub use handlers::proposal_status_action;
