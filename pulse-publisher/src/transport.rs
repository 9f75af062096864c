use async_trait::async_trait;

use crate::entry::TransportEntry;
use crate::error::TransportError;

/// The batch-send capability of a pub/sub client.
///
/// The publisher treats the transport as opaque: it does not interpret responses and makes no
/// assumptions about the delivery guarantees towards subscribers.
///
/// # Implementation Requirements
///
/// - `publish_batch` receives at most [`MAX_BATCH_SIZE`](crate::MAX_BATCH_SIZE) entries.
/// - It resolves once the remote service accepted the batch and fails on any transport or
///   service error. Partial acceptance must be reported as a failure.
/// - Transports must be `Send + Sync`. Concurrent publish calls on one publisher are only as
///   safe as the transport itself.
#[async_trait]
pub trait BatchTransport: Send + Sync {
    /// Returns a short name of the transport for logging, for example `"kafka"`.
    fn name(&self) -> &'static str;

    /// Sends one batch of entries to `topic`.
    async fn publish_batch(
        &self,
        topic: &str,
        entries: &[TransportEntry],
    ) -> Result<(), TransportError>;
}
