//! One module per event family; each extends [`crate::NotificationFanout`]
//! with the handlers the dispatcher routes to.

mod card;
mod document;
mod forum;
mod proposal;
mod reward;
mod vote;

pub use proposal::proposal_status_action;

#[cfg(test)]
pub(crate) mod support;
