use std::sync::Arc;

use crate::entry::TransportEntry;

/// Observer invoked once per successfully sent batch, with the entries of that batch.
///
/// The observer runs synchronously on the publishing task, so it should not block.
pub type OnBatchPublish = Arc<dyn Fn(&[TransportEntry]) + Send + Sync>;

/// Default batch observer that traces the published batch.
pub fn trace_publish(batch: &[TransportEntry]) {
    match serde_json::to_string(batch) {
        Ok(json) => pulse_log::trace!("published batch: {json}"),
        Err(_) => pulse_log::trace!("published batch of {} entries", batch.len()),
    }
}

/// Batch observer that does nothing.
pub fn ignore_publish(_batch: &[TransportEntry]) {}
