use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use pulse_common::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
use pulse_publisher::{BatchPublisher, BatchTransport, ConfigError, PublishError, TransportEntry};

use crate::config::MetricsPublisherConfig;
use crate::constants::UNRECOGNIZED_FAILURE_MESSAGE;
use crate::convert::Converter;
use crate::hooks::{OnError, log_error};
use crate::input::PublishInput;

/// Publishes metric events through a [`BatchPublisher`].
///
/// Publishing is fire-and-forget. Every failure of the underlying publisher is handed to the
/// [`OnError`] observer and [`publish`](Self::publish) resolves normally. The only exception is
/// a panic raised by the transport: it is reported to the observer as
/// [`PublishError::Unrecognized`] and then resumed.
pub struct MetricsPublisher {
    publisher: BatchPublisher,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    on_error: OnError,
}

impl MetricsPublisher {
    /// Creates a publisher sending metric events through `transport`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the topic is empty or the retry configuration is invalid.
    pub fn new(
        config: &MetricsPublisherConfig,
        transport: Arc<dyn BatchTransport>,
    ) -> Result<Self, ConfigError> {
        let ids: Arc<dyn IdGenerator> = Arc::new(RandomIdGenerator);
        let publisher = BatchPublisher::new(config.publisher_config(), transport)?
            .with_id_generator(ids.clone());

        Ok(Self {
            publisher,
            clock: Arc::new(SystemClock),
            ids,
            on_error: Arc::new(log_error),
        })
    }

    /// Replaces the observer receiving swallowed failures.
    pub fn with_on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&PublishError) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(on_error);
        self
    }

    /// Replaces the observer invoked after every successfully sent batch.
    pub fn with_on_batch_publish<F>(mut self, on_batch_publish: F) -> Self
    where
        F: Fn(&[TransportEntry]) + Send + Sync + 'static,
    {
        self.publisher = self.publisher.with_on_batch_publish(on_batch_publish);
        self
    }

    /// Replaces the clock used to timestamp events without a capture time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the generator for event and entry identifiers.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.publisher = self.publisher.with_id_generator(ids.clone());
        self.ids = ids;
        self
    }

    /// Returns the topic metric events are sent to.
    pub fn topic(&self) -> &str {
        self.publisher.topic()
    }

    /// Converts all `inputs` into canonical events and publishes them in a single call.
    ///
    /// Failures are reported to the error observer and never returned.
    ///
    /// # Panics
    ///
    /// Resumes any panic raised by the transport after reporting it to the error observer.
    pub async fn publish<I>(&self, inputs: I)
    where
        I: IntoIterator<Item = PublishInput>,
    {
        let converter = Converter::new(self.clock.clone(), self.ids.clone());
        let events = converter.convert_all(inputs);

        match AssertUnwindSafe(self.publisher.publish(&events))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => (),
            Ok(Err(error)) => (self.on_error)(&error),
            Err(payload) => {
                let error = PublishError::Unrecognized(UNRECOGNIZED_FAILURE_MESSAGE.to_owned());
                (self.on_error)(&error);
                std::panic::resume_unwind(payload);
            }
        }
    }
}

impl fmt::Debug for MetricsPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsPublisher")
            .field("publisher", &self.publisher)
            .field("clock", &self.clock)
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

