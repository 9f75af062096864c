use std::error::Error;

use thiserror::Error;

/// A single failed batch-send attempt reported by a [`BatchTransport`](crate::BatchTransport).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl TransportError {
    /// Creates a transport error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error caused by `source`.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the error message without its causes.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while publishing records.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A record could not be serialized into a message body.
    ///
    /// Nothing has been sent when this error is returned.
    #[error("failed to serialize message body")]
    Serialize(#[source] serde_json::Error),

    /// A batch could not be delivered within its attempt budget.
    ///
    /// All batches before `batch` have been delivered, none after it have been attempted.
    #[error("failed to publish batch {batch} after {attempts} attempt(s)")]
    Delivery {
        /// Zero-based index of the failed batch within the publish call.
        batch: usize,
        /// The number of attempts made for this batch.
        attempts: usize,
        /// The failure of the last attempt.
        #[source]
        source: TransportError,
    },

    /// A failure that is not an error value, for instance a panic in the transport.
    ///
    /// This is synthesized by callers that guard against invariant violations. It is never
    /// returned by [`BatchPublisher::publish`](crate::BatchPublisher::publish).
    #[error("{0}")]
    Unrecognized(String),
}

#[cfg(test)]
mod tests {
    use std::io;

    use pulse_log::LogError;

    use super::*;

    #[test]
    fn test_delivery_error_chain() {
        let error = PublishError::Delivery {
            batch: 1,
            attempts: 3,
            source: TransportError::with_source(
                "topic rejected batch",
                io::Error::other("connection reset"),
            ),
        };

        assert_eq!(
            LogError(&error).to_string(),
            "failed to publish batch 1 after 3 attempt(s)\n  \
             caused by: topic rejected batch\n  \
             caused by: connection reset"
        );
    }

    #[test]
    fn test_transport_error_message() {
        let error = TransportError::new("throttled");
        assert_eq!(error.message(), "throttled");
        assert!(error.source().is_none());
    }
}
