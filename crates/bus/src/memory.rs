use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{select_all, SelectAll};
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::{BusError, Consumer, Message, Producer};

const CHANNEL_CAPACITY: usize = 1024;

/// An in-process stand-in for the bus, used by tests and local demos so they
/// don't need a running broker. Every topic is a broadcast channel: each
/// subscriber sees every message published to a topic it subscribed to, in
/// the order it was published.
#[derive(Clone, Default)]
pub struct MemoryBus {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<Message>>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender_for(&self, topic: &str) -> broadcast::Sender<Message> {
        let mut topics = self.topics.lock().expect("memory bus mutex poisoned");
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    pub fn producer(&self) -> MemoryProducer {
        MemoryProducer { bus: self.clone() }
    }

    pub fn consumer(&self, topics: &[&str]) -> MemoryConsumer {
        let streams = topics
            .iter()
            .map(|topic| BroadcastStream::new(self.sender_for(topic).subscribe()))
            .collect::<Vec<_>>();
        MemoryConsumer {
            inner: select_all(streams),
        }
    }
}

#[derive(Clone)]
pub struct MemoryProducer {
    bus: MemoryBus,
}

#[async_trait]
impl Producer for MemoryProducer {
    async fn publish_raw(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<(), BusError> {
        let sender = self.bus.sender_for(topic);
        let message = Message {
            topic: topic.to_string(),
            key: key.to_string(),
            payload,
        };
        // No receivers yet is not an error: a test may publish before its
        // consumer subscribes, or nothing may care about this topic at all.
        let _ = sender.send(message);
        Ok(())
    }
}

pub struct MemoryConsumer {
    inner: SelectAll<BroadcastStream<Message>>,
}

#[async_trait]
impl Consumer for MemoryConsumer {
    async fn recv(&mut self) -> Option<Message> {
        loop {
            match self.inner.next().await {
                Some(Ok(message)) => return Some(message),
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "memory bus subscriber lagged, skipping gap");
                    continue;
                }
                None => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn a_published_message_reaches_a_subscribed_consumer() {
        let bus = MemoryBus::new();
        let mut consumer = bus.consumer(&["ride-requests"]);
        let producer = bus.producer();

        producer
            .publish_raw("ride-requests", "ride-1", b"hello".to_vec())
            .await
            .unwrap();

        let message = consumer.recv().await.expect("message delivered");
        assert_eq!(message.topic, "ride-requests");
        assert_eq!(message.key, "ride-1");
        assert_eq!(message.payload, b"hello");
    }

    #[tokio::test]
    async fn messages_for_the_same_key_arrive_in_publish_order() {
        let bus = MemoryBus::new();
        let mut consumer = bus.consumer(&["ride-updates"]);
        let producer = bus.producer();

        for i in 0..5 {
            producer
                .publish_raw("ride-updates", "ride-1", vec![i])
                .await
                .unwrap();
        }

        for i in 0..5 {
            let message = consumer.recv().await.expect("message delivered");
            assert_eq!(message.payload, vec![i]);
        }
    }

    #[tokio::test]
    async fn a_consumer_only_sees_topics_it_subscribed_to() {
        let bus = MemoryBus::new();
        let mut consumer = bus.consumer(&["ride-requests"]);
        let producer = bus.producer();

        producer
            .publish_raw("driver-locations", "driver-1", b"ignored".to_vec())
            .await
            .unwrap();
        producer
            .publish_raw("ride-requests", "ride-1", b"seen".to_vec())
            .await
            .unwrap();

        let message = consumer.recv().await.expect("message delivered");
        assert_eq!(message.payload, b"seen");
    }
}
