//! Common functionality for Pulse.
//!
//! This crate contains the collaborators that the publishers consume but do not own: a [`Clock`]
//! for capture timestamps, an [`IdGenerator`] for unique identifiers and the [`retry`] policy
//! used to bound repeated send attempts.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod id;
mod retry;
mod time;

pub use self::id::*;
pub use self::retry::*;
pub use self::time::*;

pub use uuid::Uuid;
