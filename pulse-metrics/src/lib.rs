//! Publishing of metric events.
//!
//! The [`MetricsPublisher`] accepts [`PublishInput`] values, normalizes them into canonical
//! [`MetricEvent`]s and hands them to a [`BatchPublisher`](pulse_publisher::BatchPublisher) in a
//! single call. Metric publishing is fire-and-forget: delivery failures are reported to the
//! [`OnError`] observer and never returned to the caller.
//!
//! # Inputs
//!
//! Every input is either team-scoped or generic, and carries either a single measure or a set of
//! named measures:
//!
//! ```
//! use pulse_common::Uuid;
//! use pulse_metrics::{MeasureValue, PublishInput};
//!
//! // A generic event with the default value of `1` and a generated id.
//! let login = PublishInput::generic("UserLoggedIn");
//!
//! // A team event with named measures.
//! let team_id = Uuid::parse_str("12345e6f-8e12-49bd-9789-b807608ad3c2").unwrap();
//! let fix = PublishInput::team("GroundFixLocationRequestProcessed", team_id)
//!     .with_measures([
//!         ("cells", MeasureValue::Number(4.0)),
//!         ("source", MeasureValue::from("COAP")),
//!     ]);
//! ```
//!
//! Inputs can also be deserialized from their JSON representation, see [`PublishInput`].
//!
//! # Canonical Events
//!
//! Conversion fills in the capture time when the input has none, resolves the measure payload
//! (named measures if non-empty, otherwise the value, otherwise `1`) and assigns a fresh
//! identifier to generic events without one. See [`Converter`].
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod config;
mod constants;
mod convert;
mod event;
#[cfg(feature = "producer")]
mod factory;
mod hooks;
mod input;
mod publisher;

pub use self::config::*;
pub use self::constants::*;
pub use self::convert::*;
pub use self::event::*;
#[cfg(feature = "producer")]
pub use self::factory::*;
pub use self::hooks::*;
pub use self::input::*;
pub use self::publisher::*;
