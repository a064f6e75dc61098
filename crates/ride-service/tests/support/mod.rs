#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use store::Store;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A fresh sqlite database, private to the calling test, that disappears
/// once the connection pool is dropped.
pub async fn test_store() -> Store {
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let url = format!("sqlite://file:ride-service-test-{id}?mode=memory&cache=shared");
    Store::connect(&url).await.expect("in-memory store connects")
}
