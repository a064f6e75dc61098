use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::RwLock;

use crate::session::SessionId;

/// A `key -> set<session>` index (one per rider/driver/ride) plus the
/// unbound "browse" set of nearby-drivers subscribers. Reads happen on
/// every bus-driven broadcast; writes happen on session open/close, so a
/// plain `RwLock` with short critical sections is enough — no long scan
/// ever holds the lock.
#[derive(Default)]
pub struct SessionIndex<K> {
    sessions: RwLock<HashMap<K, HashSet<SessionId>>>,
}

impl<K: Eq + Hash + Clone> SessionIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, key: K, session: SessionId) {
        self.sessions
            .write()
            .unwrap()
            .entry(key)
            .or_default()
            .insert(session);
    }

    pub fn remove(&self, key: &K, session: SessionId) {
        let mut sessions = self.sessions.write().unwrap();
        if let Some(set) = sessions.get_mut(key) {
            set.remove(&session);
            if set.is_empty() {
                sessions.remove(key);
            }
        }
    }

    /// A snapshot of the sessions subscribed to `key`, taken under the lock
    /// and released before the caller pushes any frames.
    pub fn members(&self, key: &K) -> Vec<SessionId> {
        self.sessions
            .read()
            .unwrap()
            .get(key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// The unbound set of sessions subscribed to the full live driver index.
#[derive(Default)]
pub struct BrowseSet {
    sessions: RwLock<HashSet<SessionId>>,
}

impl BrowseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, session: SessionId) {
        self.sessions.write().unwrap().insert(session);
    }

    pub fn remove(&self, session: SessionId) {
        self.sessions.write().unwrap().remove(&session);
    }

    pub fn members(&self) -> Vec<SessionId> {
        self.sessions.read().unwrap().iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRegistry;

    #[test]
    fn members_reflects_adds_and_removes() {
        let registry = SessionRegistry::new();
        let (a, _rx_a) = registry.register();
        let (b, _rx_b) = registry.register();

        let index: SessionIndex<i64> = SessionIndex::new();
        index.add(7, a);
        index.add(7, b);
        assert_eq!(index.members(&7).len(), 2);

        index.remove(&7, a);
        assert_eq!(index.members(&7), vec![b]);
    }

    #[test]
    fn removing_the_last_session_drops_the_key_entirely() {
        let registry = SessionRegistry::new();
        let (a, _rx) = registry.register();

        let index: SessionIndex<i64> = SessionIndex::new();
        index.add(1, a);
        index.remove(&1, a);
        assert!(index.members(&1).is_empty());
    }
}
