use pulse_publisher::{PublisherConfig, RetryConfig};
use serde::{Deserialize, Serialize};

use crate::constants::METRICS_EVENT_ATTRIBUTE;

/// Configuration of a [`MetricsPublisher`](crate::MetricsPublisher).
///
/// The message attribute is fixed to [`METRICS_EVENT_ATTRIBUTE`] for all metric events.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsPublisherConfig {
    /// The identifier of the topic receiving metric events.
    pub topic: String,
    /// Retry behavior for failed batch sends.
    pub retry: RetryConfig,
}

impl MetricsPublisherConfig {
    /// Creates a configuration for the given topic with default retry behavior.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Returns the configuration of the underlying batch publisher.
    pub fn publisher_config(&self) -> PublisherConfig {
        PublisherConfig::new(self.topic.as_str(), METRICS_EVENT_ATTRIBUTE)
            .with_retry(self.retry.clone())
    }
}
