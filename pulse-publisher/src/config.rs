//! Configuration primitives for the batch publisher and its transports.

use pulse_common::RetryConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Publisher configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The topic identifier is empty.
    #[error("invalid publisher configuration: topic must not be empty")]
    MissingTopic,
    /// The message attribute name is empty.
    #[error("invalid publisher configuration: message attribute must not be empty")]
    MissingMessageAttribute,
    /// Retries are enabled with a budget of zero attempts.
    #[error("invalid publisher configuration: max_attempts must be at least 1")]
    InvalidMaxAttempts,
}

/// Construction-time configuration of a [`BatchPublisher`](crate::BatchPublisher).
///
/// The configuration is immutable once the publisher has been created.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PublisherConfig {
    /// The identifier of the topic to publish to.
    pub topic: String,
    /// The value of the `name` attribute attached to every message.
    ///
    /// Consumers use this attribute to filter the type of message.
    pub message_attribute: String,
    /// Retry behavior for failed batch sends.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl PublisherConfig {
    /// Creates a configuration with default retry behavior.
    pub fn new(topic: impl Into<String>, message_attribute: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            message_attribute: message_attribute.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Replaces the retry behavior.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Checks that this configuration can be used to publish.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::MissingTopic);
        }

        if self.message_attribute.trim().is_empty() {
            return Err(ConfigError::MissingMessageAttribute);
        }

        if self.retry.enabled && self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts);
        }

        Ok(())
    }
}

/// Kafka configuration parameter, passed through to the client unchanged.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct KafkaConfigParam {
    /// Name of the Kafka config parameter.
    pub name: String,
    /// Value of the Kafka config parameter.
    pub value: String,
}
