/// The maximum number of entries in a single batch-send, imposed by the transport.
pub const MAX_BATCH_SIZE: usize = 10;

/// The key of the message attribute that downstream consumers filter on.
pub const MESSAGE_ATTRIBUTE_KEY: &str = "name";

/// The data type of the message attribute.
pub const MESSAGE_ATTRIBUTE_DATA_TYPE: &str = "String";

pub use pulse_common::DEFAULT_MAX_ATTEMPTS;
