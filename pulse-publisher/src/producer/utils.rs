use rdkafka::ClientContext;
use rdkafka::error::KafkaError;

/// Kafka client context that logs client errors.
#[derive(Debug)]
pub struct CaptureErrorContext;

impl ClientContext for CaptureErrorContext {
    /// Called for global client errors, such as all brokers being down.
    ///
    /// Delivery failures of individual messages are reported through the send futures instead.
    fn error(&self, error: KafkaError, reason: &str) {
        pulse_log::error!(
            "kafka client error: {reason}: {}",
            pulse_log::LogError(&error)
        );
    }
}

/// The wrapper type around the kafka [`rdkafka::producer::FutureProducer`] with our own
/// [`CaptureErrorContext`] context.
pub type FutureProducer = rdkafka::producer::FutureProducer<CaptureErrorContext>;
