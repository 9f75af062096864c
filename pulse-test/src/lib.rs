//! Helpers for testing publishers.
//!
//! When writing tests, keep the following points in mind:
//!
//!  - In every test, call [`setup`]. This will set up the logger so that all console output is
//!    captured by the test runner. All logs emitted with [`pulse_log`] will show up for test
//!    failures or when run with `--nocapture`.
//!  - Use [`MockTransport`] in place of a real pub/sub client. It records every batch-send and
//!    follows a script of outcomes.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pulse_test::{MockTransport, Outcome};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     pulse_test::setup();
//!
//!     let transport = Arc::new(MockTransport::accepting().script([Outcome::reject("throttled")]));
//!     // ... publish through `transport.clone()`
//!     assert_eq!(transport.call_count(), 2);
//! }
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use pulse_publisher::{BatchTransport, TransportEntry, TransportError};

/// Setup the test environment.
///
///  - Initializes logs: The logger only captures logs from the calling crate and mutes all other
///    logs.
pub fn setup() {
    pulse_log::init_test!();
}

/// The result of a single batch-send on a [`MockTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The batch is accepted.
    Accept,
    /// The batch is rejected with a transport error carrying this message.
    Reject(String),
    /// The send panics with this message.
    Panic(String),
}

impl Outcome {
    /// Shorthand for [`Outcome::Reject`].
    pub fn reject(message: impl Into<String>) -> Self {
        Self::Reject(message.into())
    }

    /// Shorthand for [`Outcome::Panic`].
    pub fn panic(message: impl Into<String>) -> Self {
        Self::Panic(message.into())
    }
}

/// A batch-send invocation recorded by the [`MockTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentBatch {
    /// The topic passed to the transport.
    pub topic: String,
    /// The entries of the batch.
    pub entries: Vec<TransportEntry>,
}

impl SentBatch {
    /// Returns the bodies of all entries parsed as JSON.
    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.entries
            .iter()
            .map(|entry| serde_json::from_str(&entry.body).unwrap())
            .collect()
    }
}

/// A transport that records every call and answers from a script.
///
/// Scripted outcomes are consumed one per call. Once the script is exhausted, every further call
/// gets the fallback outcome.
#[derive(Debug)]
pub struct MockTransport {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    calls: Mutex<Vec<SentBatch>>,
}

impl MockTransport {
    /// Creates a transport that accepts every batch not covered by the script.
    pub fn accepting() -> Self {
        Self::with_fallback(Outcome::Accept)
    }

    /// Creates a transport that rejects every batch not covered by the script.
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self::with_fallback(Outcome::Reject(message.into()))
    }

    /// Creates a transport with the given fallback outcome.
    pub fn with_fallback(fallback: Outcome) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Appends outcomes to the script.
    pub fn script(self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.script.lock().extend(outcomes);
        self
    }

    /// Returns all recorded calls in invocation order.
    pub fn calls(&self) -> Vec<SentBatch> {
        self.calls.lock().clone()
    }

    /// Returns the number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the number of entries of each recorded call.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls.lock().iter().map(|c| c.entries.len()).collect()
    }

    fn next_outcome(&self) -> Outcome {
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl BatchTransport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn publish_batch(
        &self,
        topic: &str,
        entries: &[TransportEntry],
    ) -> Result<(), TransportError> {
        self.calls.lock().push(SentBatch {
            topic: topic.to_owned(),
            entries: entries.to_vec(),
        });

        match self.next_outcome() {
            Outcome::Accept => Ok(()),
            Outcome::Reject(message) => Err(TransportError::new(message)),
            Outcome::Panic(message) => panic!("{message}"),
        }
    }
}
