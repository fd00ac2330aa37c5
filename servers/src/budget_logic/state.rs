use lib_store::{ConfigSource, ConnectionCache, StoreDriver};
use std::sync::Arc;

/// Shared handler state. Holds the one connection cache built in `main`.
pub struct AppState<D: StoreDriver, S: ConfigSource> {
    pub cache: Arc<ConnectionCache<D, S>>,
}

impl<D: StoreDriver, S: ConfigSource> AppState<D, S> {
    pub fn new(cache: Arc<ConnectionCache<D, S>>) -> Self {
        Self { cache }
    }
}

// Manual impl: a derive would require D and S themselves to be Clone.
impl<D: StoreDriver, S: ConfigSource> Clone for AppState<D, S> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}
