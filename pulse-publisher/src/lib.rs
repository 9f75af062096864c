//! Batched publishing of records to a pub/sub topic.
//!
//! The [`BatchPublisher`] serializes arbitrary records into [`TransportEntry`] values, splits them
//! into batches of at most [`MAX_BATCH_SIZE`] entries and hands every batch to a
//! [`BatchTransport`], retrying failed sends up to the configured attempt budget. After every
//! successfully sent batch, the publisher invokes its [`OnBatchPublish`] observer.
//!
//! By default, this library only provides the transport contract. With the `producer` feature
//! enabled, the [`KafkaTransport`] is provided and can be used to publish to Kafka topics.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use pulse_publisher::{BatchPublisher, PublisherConfig};
//!
//! let config = PublisherConfig::new("metrics", "MetricsEvent");
//! let publisher = BatchPublisher::new(config, Arc::new(transport))?
//!     .with_on_batch_publish(|batch| pulse_log::info!("sent {} entries", batch.len()));
//!
//! publisher.publish(&[serde_json::json!({"eventName": "Login"})]).await?;
//! ```
//!
//! Records are published in input order. If a batch cannot be delivered within the attempt
//! budget, the remaining batches are not attempted and [`PublishError::Delivery`] is returned.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod config;
mod constants;
mod entry;
mod error;
mod hooks;
#[cfg(feature = "producer")]
mod producer;
mod publisher;
mod transport;

pub use self::config::*;
pub use self::constants::*;
pub use self::entry::*;
pub use self::error::*;
pub use self::hooks::*;
#[cfg(feature = "producer")]
pub use self::producer::*;
pub use self::publisher::*;
pub use self::transport::*;

pub use pulse_common::RetryConfig;
