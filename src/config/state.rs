// Application state module
// Immutable configuration plus the shared store handle

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::store::AddressStore;

/// Application state shared by every connection task
pub struct AppState {
    pub config: Config,
    /// The sole owner of record state and durability
    pub store: Arc<AddressStore>,

    // Cached config value for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    pub fn new(config: Config, store: AddressStore) -> Self {
        let cached_access_log = AtomicBool::new(config.logging.access_log);
        Self {
            config,
            store: Arc::new(store),
            cached_access_log,
        }
    }
}
