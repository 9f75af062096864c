//! The Pulse command line.
//!
//! Reads metric event inputs as JSON lines and publishes them with the configured transport:
//!
//! ```text
//! pulse --config ./config publish --input events.jsonl
//! pulse --config ./config config
//! ```
//!
//! See [`pulse_config`] for the configuration file format.

mod cli;
mod setup;
mod transport;

use std::process;

pub fn main() {
    let exit_code = match cli::execute() {
        Ok(()) => 0,
        Err(err) => {
            pulse_log::ensure_error(&err);
            1
        }
    };

    process::exit(exit_code);
}
