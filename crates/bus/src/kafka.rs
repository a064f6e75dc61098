use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer as _, StreamConsumer};
use rdkafka::message::Message as _;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use tokio::sync::mpsc;

use crate::{BusError, Consumer, Message, Producer};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Production bus producer backed by a Kafka-compatible broker.
pub struct KafkaProducer {
    producer: FutureProducer,
}

impl KafkaProducer {
    pub fn new(bootstrap_servers: &str) -> Result<Self, BusError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("message.timeout.ms", "10000")
            .set("acks", "all")
            .create()
            .map_err(|e| BusError::Connection(e.to_string()))?;
        Ok(Self { producer })
    }
}

#[async_trait]
impl Producer for KafkaProducer {
    async fn publish_raw(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<(), BusError> {
        let record = FutureRecord::to(topic).payload(&payload).key(key);
        match self.producer.send(record, Timeout::After(SEND_TIMEOUT)).await {
            Ok((partition, offset)) => {
                tracing::debug!(topic, partition, offset, key, "published event");
                Ok(())
            }
            Err((err, _)) => {
                tracing::error!(topic, key, error = %err, "failed to publish event");
                Err(BusError::Publish {
                    topic: topic.to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }
}

/// Production bus consumer. Subscribes to one or more topics under a fixed
/// consumer group and forwards decoded messages through an internal channel;
/// offsets are committed only after the message has been handed off, giving
/// at-least-once delivery. Handlers downstream must be idempotent.
pub struct KafkaConsumer {
    rx: mpsc::Receiver<Message>,
}

impl KafkaConsumer {
    pub fn subscribe(
        bootstrap_servers: &str,
        group_id: &str,
        topics: &[&str],
    ) -> Result<Self, BusError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| BusError::Connection(e.to_string()))?;

        consumer.subscribe(topics).map_err(|e| BusError::Subscribe {
            topic: topics.join(","),
            reason: e.to_string(),
        })?;

        let (tx, rx) = mpsc::channel(1000);
        let group_id = group_id.to_string();

        tokio::spawn(async move {
            let mut stream = consumer.stream();
            while let Some(result) = stream.next().await {
                let borrowed = match result {
                    Ok(msg) => msg,
                    Err(err) => {
                        tracing::warn!(group = %group_id, error = %err, "consumer poll error");
                        continue;
                    }
                };

                let Some(payload) = borrowed.payload() else {
                    tracing::warn!(group = %group_id, "dropping message with no payload");
                    if let Err(err) = consumer.commit_message(&borrowed, CommitMode::Async) {
                        tracing::warn!(error = %err, "failed to commit empty message");
                    }
                    continue;
                };

                let message = Message {
                    topic: borrowed.topic().to_string(),
                    key: borrowed
                        .key()
                        .map(|k| String::from_utf8_lossy(k).into_owned())
                        .unwrap_or_default(),
                    payload: payload.to_vec(),
                };

                if tx.send(message).await.is_err() {
                    tracing::debug!(group = %group_id, "receiver dropped, stopping consumer");
                    break;
                }

                if let Err(err) = consumer.commit_message(&borrowed, CommitMode::Async) {
                    tracing::warn!(
                        group = %group_id,
                        error = %err,
                        "failed to commit offset, message may be redelivered"
                    );
                }
            }
        });

        Ok(Self { rx })
    }
}

#[async_trait]
impl Consumer for KafkaConsumer {
    async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }
}
