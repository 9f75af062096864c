use pulse_common::Uuid;
use serde::Serialize;

use crate::constants::{MESSAGE_ATTRIBUTE_DATA_TYPE, MESSAGE_ATTRIBUTE_KEY};

/// The attribute attached to every outbound message.
///
/// The key is always [`MESSAGE_ATTRIBUTE_KEY`] with data type [`MESSAGE_ATTRIBUTE_DATA_TYPE`], the
/// value is fixed per publisher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAttribute {
    /// The attribute key.
    pub key: &'static str,
    /// The data type of the value.
    pub data_type: &'static str,
    /// The attribute value.
    pub value: String,
}

impl MessageAttribute {
    /// Creates the `name` attribute with the given value.
    pub fn name(value: impl Into<String>) -> Self {
        Self {
            key: MESSAGE_ATTRIBUTE_KEY,
            data_type: MESSAGE_ATTRIBUTE_DATA_TYPE,
            value: value.into(),
        }
    }
}

/// A single outbound message in a batch-send.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportEntry {
    /// Unique identifier of this entry within its batch.
    pub id: Uuid,
    /// The JSON serialized record.
    pub body: String,
    /// The message type attribute.
    pub attribute: MessageAttribute,
}
