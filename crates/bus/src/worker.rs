use std::any::Any;
use std::fmt::Debug;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::time::sleep;

use crate::{Consumer, Message};

/// How a worker should react after a handler returns an error or panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionStrategy {
    /// Log and keep consuming; the message is dropped.
    Resume,
    /// Stop the worker entirely. Used for errors that mean the handler can
    /// never make progress again (e.g. the store is gone).
    Stop,
}

/// Per-topic business logic driven by a worker loop. Implementations handle
/// one decoded message at a time; the worker around them owns retries,
/// panic containment, and backoff.
#[async_trait]
pub trait Handler: Send {
    type Error: Debug + Send;

    async fn handle(&mut self, message: Message) -> Result<(), Self::Error>;

    /// Strategy to apply when `handle` returns `Err`. Defaults to resuming,
    /// since a single malformed or unmatched event should not take the
    /// whole consumer down.
    fn on_error(&self, _error: &Self::Error) -> SupervisionStrategy {
        SupervisionStrategy::Resume
    }

    /// Strategy to apply when `handle` panics. Defaults to resuming, on the
    /// assumption that the panic was specific to the one message.
    fn on_panic(&self, _payload: &(dyn Any + Send)) -> SupervisionStrategy {
        SupervisionStrategy::Resume
    }
}

/// Drives `handler` off of `consumer` until the consumer stream ends or the
/// handler asks to stop. Backs off with a growing delay between consecutive
/// failures and resets it on the first message handled successfully.
pub async fn run<C, H>(mut consumer: C, mut handler: H)
where
    C: Consumer,
    H: Handler,
{
    let base_backoff = Duration::from_millis(200);
    let max_backoff = Duration::from_secs(30);
    let mut backoff = base_backoff;

    while let Some(message) = consumer.recv().await {
        let topic = message.topic.clone();
        let key = message.key.clone();

        let result = AssertUnwindSafe(handler.handle(message))
            .catch_unwind()
            .await;

        let strategy = match result {
            Ok(Ok(())) => {
                backoff = base_backoff;
                continue;
            }
            Ok(Err(err)) => {
                tracing::warn!(topic, key, error = ?err, "handler returned an error");
                handler.on_error(&err)
            }
            Err(panic) => {
                tracing::error!(topic, key, "handler panicked");
                handler.on_panic(&*panic)
            }
        };

        match strategy {
            SupervisionStrategy::Resume => {
                sleep(backoff).await;
                backoff = (backoff * 2).min(max_backoff);
            }
            SupervisionStrategy::Stop => {
                tracing::error!(topic, "worker stopping per supervision strategy");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBus;
    use crate::Producer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        seen: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Handler for CountingHandler {
        type Error = String;

        async fn handle(&mut self, message: Message) -> Result<(), Self::Error> {
            if message.payload == b"boom" {
                return Err("boom".to_string());
            }
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn worker_keeps_consuming_after_a_handler_error() {
        let bus = MemoryBus::new();
        let consumer = bus.consumer(&["ride-requests"]);
        let producer = bus.producer();
        let seen = Arc::new(AtomicUsize::new(0));

        let handler = CountingHandler { seen: seen.clone() };
        let worker = tokio::spawn(run(consumer, handler));

        producer
            .publish_raw("ride-requests", "a", b"boom".to_vec())
            .await
            .unwrap();
        producer
            .publish_raw("ride-requests", "b", b"ok".to_vec())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        worker.abort();
    }
}
