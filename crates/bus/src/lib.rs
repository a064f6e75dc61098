pub mod kafka;
pub mod memory;
pub mod worker;

use async_trait::async_trait;
use thiserror::Error;

/// The five topics the pipeline is built around. Centralizing the strings
/// here means a producer and its consumers can never drift apart on naming.
pub mod topics {
    pub use model::events::topics::*;
}

#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to connect to bus: {0}")]
    Connection(String),
    #[error("failed to publish to topic {topic}: {reason}")]
    Publish { topic: String, reason: String },
    #[error("failed to subscribe to topic {topic}: {reason}")]
    Subscribe { topic: String, reason: String },
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A message handed from a consumer to the worker that drives it. `key` is
/// the partitioning key the producer used (a ride id, driver id, etc.); two
/// messages with the same key are always delivered to the same consumer in
/// the order they were published.
#[derive(Debug, Clone)]
pub struct Message {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, BusError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Publishes typed events onto the bus. Implementations own partitioning and
/// delivery guarantees; callers only supply a key and a serializable value.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn publish_raw(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<(), BusError>;

    async fn publish<T>(&self, topic: &str, key: &str, event: &T) -> Result<(), BusError>
    where
        T: serde::Serialize + Sync,
    {
        let payload = serde_json::to_vec(event)?;
        self.publish_raw(topic, key, payload).await
    }
}

/// A subscription to one or more topics. Messages are handed out one at a
/// time in arrival order; there is no batching API because the services in
/// this pipeline process events one ride or one driver at a time anyway.
#[async_trait]
pub trait Consumer: Send {
    async fn recv(&mut self) -> Option<Message>;
}
