//! Configuration for the Pulse CLI.
//!
//! The configuration is read from a `config.yml` file, either inside a configuration folder or
//! at an explicit file path:
//!
//! ```yaml
//! logging:
//!   level: debug
//! metrics:
//!   topic: metric-events
//!   retry:
//!     max_attempts: 5
//! kafka:
//!   - name: bootstrap.servers
//!     value: localhost:9092
//! ```
//!
//! All sections are optional except for `metrics.topic`.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod config;

pub use self::config::*;
