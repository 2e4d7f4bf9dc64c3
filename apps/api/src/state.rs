use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::editor::SessionRegistry;
use crate::profiles::ProfileStore;
use crate::storage::KeyValueStorage;
use crate::versions::VersionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Open editor sessions and their history logs. Held in memory only.
    pub sessions: Arc<RwLock<SessionRegistry>>,
    pub versions: Arc<VersionStore>,
    pub profiles: Arc<ProfileStore>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn KeyValueStorage>) -> Self {
        let sessions = SessionRegistry::new(config.undo_max_entries, config.history_max_entries);
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
            versions: Arc::new(VersionStore::new(storage.clone())),
            profiles: Arc::new(ProfileStore::new(storage)),
            config,
        }
    }
}
