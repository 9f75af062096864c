use std::io::{self, Write};

use async_trait::async_trait;
use pulse_publisher::{BatchTransport, TransportEntry, TransportError};
use serde_json::json;

/// A transport that prints every entry as a JSON line to stdout instead of sending it.
#[derive(Debug, Default)]
pub struct StdoutTransport;

#[async_trait]
impl BatchTransport for StdoutTransport {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn publish_batch(
        &self,
        topic: &str,
        entries: &[TransportEntry],
    ) -> Result<(), TransportError> {
        let mut stdout = io::stdout().lock();
        write_batch(&mut stdout, topic, entries)
            .and_then(|()| stdout.flush())
            .map_err(|e| TransportError::with_source("failed to write batch to stdout", e))
    }
}

/// Writes one JSON line per entry.
pub fn write_batch<W: Write>(
    writer: &mut W,
    topic: &str,
    entries: &[TransportEntry],
) -> io::Result<()> {
    for entry in entries {
        let line = json!({
            "topic": topic,
            "id": entry.id,
            "attribute": entry.attribute,
            "body": entry.body,
        });
        writeln!(writer, "{line}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pulse_common::Uuid;
    use pulse_publisher::MessageAttribute;

    use super::*;

    #[test]
    fn test_write_batch() {
        let entries = [
            TransportEntry {
                id: Uuid::nil(),
                body: r#"{"eventName":"UserLoggedIn"}"#.to_owned(),
                attribute: MessageAttribute::name("MetricsEvent"),
            },
            TransportEntry {
                id: Uuid::from_u128(1),
                body: r#"{"eventName":"UserLoggedOut"}"#.to_owned(),
                attribute: MessageAttribute::name("MetricsEvent"),
            },
        ];

        let mut output = Vec::new();
        write_batch(&mut output, "metrics", &entries).unwrap();

        insta::assert_snapshot!(String::from_utf8(output).unwrap(), @r#"
        {"attribute":{"dataType":"String","key":"name","value":"MetricsEvent"},"body":"{\"eventName\":\"UserLoggedIn\"}","id":"00000000-0000-0000-0000-000000000000","topic":"metrics"}
        {"attribute":{"dataType":"String","key":"name","value":"MetricsEvent"},"body":"{\"eventName\":\"UserLoggedOut\"}","id":"00000000-0000-0000-0000-000000000001","topic":"metrics"}
        "#);
    }

    #[test]
    fn test_write_empty_batch() {
        let mut output = Vec::new();
        write_batch(&mut output, "metrics", &[]).unwrap();
        assert!(output.is_empty());
    }
}
