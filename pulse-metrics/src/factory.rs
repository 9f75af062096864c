use std::sync::Arc;

use pulse_publisher::{ConfigError, KafkaConfigParam, KafkaTransport, ProducerError};
use thiserror::Error;

use crate::config::MetricsPublisherConfig;
use crate::publisher::MetricsPublisher;

/// Errors raised while setting up a publisher with its default transport.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The publisher configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The Kafka producer could not be created.
    #[error(transparent)]
    Producer(#[from] ProducerError),
}

/// Creates a [`MetricsPublisher`] that produces to Kafka.
///
/// `params` are passed to the librdkafka client unchanged, at minimum they need to contain
/// `bootstrap.servers`.
pub fn kafka_publisher(
    config: &MetricsPublisherConfig,
    params: &[KafkaConfigParam],
) -> Result<MetricsPublisher, SetupError> {
    let transport = KafkaTransport::create(params)?;
    pulse_log::debug!(topic = %config.topic, "created kafka transport for metric events");
    Ok(MetricsPublisher::new(config, Arc::new(transport))?)
}
