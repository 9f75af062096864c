use std::sync::Arc;

use pulse_log::LogError;
use pulse_publisher::PublishError;

/// Observer invoked with every failure swallowed by the
/// [`MetricsPublisher`](crate::MetricsPublisher).
pub type OnError = Arc<dyn Fn(&PublishError) + Send + Sync>;

/// Default error observer that logs the failure with its cause chain.
pub fn log_error(error: &PublishError) {
    pulse_log::error!(
        "error when attempting to publish metrics event(s): {}",
        LogError(error)
    );
}

/// Error observer that does nothing.
pub fn ignore_error(_error: &PublishError) {}
