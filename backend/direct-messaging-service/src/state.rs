use std::sync::Arc;

use crate::{
    config::Config,
    repository::{InMemoryStore, KeyDirectory, MessageStore, PgStore, UserDirectory},
    websocket::RealtimeRouter,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub messages: Arc<dyn MessageStore>,
    pub users: Arc<dyn UserDirectory>,
    pub keys: Arc<dyn KeyDirectory>,
    /// Constructed once per process and shared by every connection
    pub router: RealtimeRouter,
}

impl AppState {
    pub fn postgres(config: Arc<Config>, store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            config,
            messages: store.clone(),
            users: store.clone(),
            keys: store,
            router: RealtimeRouter::new(),
        }
    }

    pub fn in_memory(config: Arc<Config>, store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            config,
            messages: store.clone(),
            users: store.clone(),
            keys: store,
            router: RealtimeRouter::new(),
        }
    }
}
