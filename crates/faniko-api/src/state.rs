use std::sync::Arc;

use faniko_store::Store;

use crate::storage::Storage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
    pub storage: Storage,
}

impl AppStateInner {
    pub fn new(store: Store, storage: Storage) -> AppState {
        Arc::new(Self { store, storage })
    }
}
