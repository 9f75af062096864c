use std::fmt;
use std::sync::Arc;

use pulse_common::{IdGenerator, RandomIdGenerator, RetryBackoff, RetryConfig};
use serde::Serialize;

use crate::config::{ConfigError, PublisherConfig};
use crate::constants::MAX_BATCH_SIZE;
use crate::entry::{MessageAttribute, TransportEntry};
use crate::error::PublishError;
use crate::hooks::{OnBatchPublish, trace_publish};
use crate::transport::BatchTransport;

/// Publishes records to a topic in batches, retrying failed batches.
///
/// Every record is serialized to JSON and tagged with the `name` attribute configured in
/// [`PublisherConfig::message_attribute`]. Records are split into contiguous batches of at most
/// [`MAX_BATCH_SIZE`] entries, which are sent strictly one after another.
pub struct BatchPublisher {
    topic: String,
    message_attribute: String,
    retry: RetryConfig,
    transport: Arc<dyn BatchTransport>,
    ids: Arc<dyn IdGenerator>,
    on_batch_publish: OnBatchPublish,
}

impl BatchPublisher {
    /// Creates a new publisher sending through `transport`.
    ///
    /// The publisher traces every published batch and generates random entry identifiers unless
    /// configured otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration does not pass
    /// [`PublisherConfig::validate`].
    pub fn new(
        config: PublisherConfig,
        transport: Arc<dyn BatchTransport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let PublisherConfig {
            topic,
            message_attribute,
            retry,
        } = config;

        Ok(Self {
            topic,
            message_attribute,
            retry,
            transport,
            ids: Arc::new(RandomIdGenerator),
            on_batch_publish: Arc::new(trace_publish),
        })
    }

    /// Replaces the observer invoked after every successfully sent batch.
    pub fn with_on_batch_publish<F>(mut self, on_batch_publish: F) -> Self
    where
        F: Fn(&[TransportEntry]) + Send + Sync + 'static,
    {
        self.on_batch_publish = Arc::new(on_batch_publish);
        self
    }

    /// Replaces the generator for entry identifiers.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Returns the topic this publisher sends to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the value of the `name` attribute attached to every message.
    pub fn message_attribute(&self) -> &str {
        &self.message_attribute
    }

    /// Publishes all `records` in batches.
    ///
    /// Batches are sent in input order, one at a time. The observer is invoked after each batch
    /// that was accepted by the transport.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Serialize`] if any record cannot be serialized. Nothing is sent.
    /// - [`PublishError::Delivery`] if a batch fails on all of its attempts. Subsequent batches
    ///   are not attempted.
    pub async fn publish<T>(&self, records: &[T]) -> Result<(), PublishError>
    where
        T: Serialize,
    {
        let entries = self.entries(records)?;
        if entries.is_empty() {
            return Ok(());
        }

        pulse_log::debug!(
            topic = %self.topic,
            transport = self.transport.name(),
            "publishing {} messages in {} batches",
            entries.len(),
            entries.len().div_ceil(MAX_BATCH_SIZE),
        );

        for (index, batch) in entries.chunks(MAX_BATCH_SIZE).enumerate() {
            self.send_batch(index, batch).await?;
            (self.on_batch_publish)(batch);
        }

        Ok(())
    }

    /// Serializes every record into a transport entry with a fresh identifier.
    fn entries<T: Serialize>(&self, records: &[T]) -> Result<Vec<TransportEntry>, PublishError> {
        records
            .iter()
            .map(|record| -> Result<_, PublishError> {
                let body = serde_json::to_string(record).map_err(PublishError::Serialize)?;
                Ok(TransportEntry {
                    id: self.ids.generate(),
                    body,
                    attribute: MessageAttribute::name(self.message_attribute.as_str()),
                })
            })
            .collect()
    }

    /// Sends a single batch, applying the retry policy if enabled.
    async fn send_batch(&self, index: usize, batch: &[TransportEntry]) -> Result<(), PublishError> {
        let attempts = self.retry.attempts();

        let result = if self.retry.enabled {
            let mut backoff = RetryBackoff::from_config(&self.retry);
            pulse_common::retry(attempts, &mut backoff, || {
                self.transport.publish_batch(&self.topic, batch)
            })
            .await
        } else {
            self.transport.publish_batch(&self.topic, batch).await
        };

        result.map_err(|source| {
            pulse_log::warn!(
                topic = %self.topic,
                batch = index,
                attempts,
                "giving up on batch: {source}"
            );
            PublishError::Delivery {
                batch: index,
                attempts,
                source,
            }
        })
    }
}

impl fmt::Debug for BatchPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchPublisher")
            .field("topic", &self.topic)
            .field("message_attribute", &self.message_attribute)
            .field("retry", &self.retry)
            .field("transport", &self.transport.name())
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}
