use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::future;
use rdkafka::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;
use thiserror::Error;

use crate::config::KafkaConfigParam;
use crate::entry::TransportEntry;
use crate::error::TransportError;
use crate::transport::BatchTransport;

mod utils;
use utils::{CaptureErrorContext, FutureProducer};

/// How long a message may wait in the local producer queue before the send fails.
const QUEUE_TIMEOUT: Duration = Duration::from_secs(5);

/// Kafka producer errors.
#[derive(Error, Debug)]
pub enum ProducerError {
    /// Failed to create a kafka producer because of the invalid configuration.
    #[error("failed to create kafka producer: invalid kafka config")]
    InvalidConfig(#[source] rdkafka::error::KafkaError),
}

/// A [`BatchTransport`] that produces every entry of a batch to a Kafka topic.
///
/// The entry identifier becomes the message key, the body becomes the payload and the message
/// attribute is attached as a header. A batch is accepted once every message of the batch has
/// been acknowledged by the broker.
pub struct KafkaTransport {
    producer: FutureProducer,
}

impl KafkaTransport {
    /// Creates a producer from librdkafka client parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ProducerError::InvalidConfig`] if the parameters are rejected by the client.
    pub fn create(params: &[KafkaConfigParam]) -> Result<Self, ProducerError> {
        let mut client_config = ClientConfig::new();
        for param in params {
            client_config.set(param.name.as_str(), param.value.as_str());
        }

        let producer = client_config
            .create_with_context(CaptureErrorContext)
            .map_err(ProducerError::InvalidConfig)?;

        Ok(Self { producer })
    }

    async fn send(&self, topic: &str, entry: &TransportEntry) -> Result<(), TransportError> {
        let key = entry.id.to_string();
        let headers = OwnedHeaders::new().insert(Header {
            key: entry.attribute.key,
            value: Some(entry.attribute.value.as_str()),
        });

        let record = FutureRecord::to(topic)
            .key(key.as_str())
            .payload(entry.body.as_str())
            .headers(headers);

        self.producer
            .send(record, Timeout::After(QUEUE_TIMEOUT))
            .await
            .map(|_| ())
            .map_err(|(error, _message)| {
                TransportError::with_source(format!("failed to produce message {key}"), error)
            })
    }
}

impl fmt::Debug for KafkaTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaTransport")
            .field("producer", &"<FutureProducer>")
            .finish()
    }
}

#[async_trait]
impl BatchTransport for KafkaTransport {
    fn name(&self) -> &'static str {
        "kafka"
    }

    async fn publish_batch(
        &self,
        topic: &str,
        entries: &[TransportEntry],
    ) -> Result<(), TransportError> {
        let results = future::join_all(entries.iter().map(|entry| self.send(topic, entry))).await;

        let mut errors = results.into_iter().filter_map(Result::err);
        match errors.next() {
            None => Ok(()),
            Some(error) => {
                let failed = 1 + errors.count();
                pulse_log::debug!(topic, failed, "kafka rejected messages of batch");
                Err(error)
            }
        }
    }
}
