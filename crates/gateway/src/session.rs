use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::frames::ServerFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Every live client connection, addressable by [`SessionId`]. Indexes
/// (rider/driver/ride/browse) hold only ids; this is where the actual
/// channel to the socket's write half lives.
#[derive(Default)]
pub struct SessionRegistry {
    next_id: AtomicU64,
    senders: Mutex<HashMap<SessionId, mpsc::UnboundedSender<ServerFrame>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> (SessionId, mpsc::UnboundedReceiver<ServerFrame>) {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().insert(id, tx);
        (id, rx)
    }

    /// Pushes `frame` to `id`. A session whose receiver has been dropped
    /// (socket closed) is removed and the caller is told so it can also
    /// drop the id from whichever index it came from.
    pub fn send(&self, id: SessionId, frame: ServerFrame) -> bool {
        let sender = self.senders.lock().unwrap().get(&id).cloned();
        match sender {
            Some(sender) if sender.send(frame).is_ok() => true,
            _ => {
                self.remove(id);
                false
            }
        }
    }

    pub fn remove(&self, id: SessionId) {
        self.senders.lock().unwrap().remove(&id);
    }
}
