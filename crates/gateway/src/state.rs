use std::sync::{Arc, RwLock};

use model::LiveDriverIndex;
use store::Store;

use crate::index::{BrowseSet, SessionIndex};
use crate::session::SessionRegistry;

struct Inner {
    store: Store,
    registry: SessionRegistry,
    riders: SessionIndex<i64>,
    drivers: SessionIndex<i64>,
    rides: SessionIndex<i64>,
    browse: BrowseSet,
    live_index: RwLock<LiveDriverIndex>,
}

/// Everything the fan-out layer shares across websocket handlers and bus
/// consumers: one copy per process, cheap to clone.
#[derive(Clone)]
pub struct GatewayState(Arc<Inner>);

impl GatewayState {
    pub fn new(store: Store) -> Self {
        Self(Arc::new(Inner {
            store,
            registry: SessionRegistry::new(),
            riders: SessionIndex::new(),
            drivers: SessionIndex::new(),
            rides: SessionIndex::new(),
            browse: BrowseSet::new(),
            live_index: RwLock::new(LiveDriverIndex::new()),
        }))
    }

    pub fn store(&self) -> &Store {
        &self.0.store
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.0.registry
    }

    pub fn riders(&self) -> &SessionIndex<i64> {
        &self.0.riders
    }

    pub fn drivers(&self) -> &SessionIndex<i64> {
        &self.0.drivers
    }

    pub fn rides(&self) -> &SessionIndex<i64> {
        &self.0.rides
    }

    pub fn browse(&self) -> &BrowseSet {
        &self.0.browse
    }

    pub fn live_index(&self) -> &RwLock<LiveDriverIndex> {
        &self.0.live_index
    }
}
