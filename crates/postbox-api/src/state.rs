use std::path::PathBuf;
use std::sync::Arc;

use postbox_gateway::relay::RelayClient;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub relay: RelayClient,
    /// Root directory for static assets.
    pub static_dir: PathBuf,
}

impl AppStateInner {
    pub fn new(relay: RelayClient, static_dir: impl Into<PathBuf>) -> AppState {
        Arc::new(Self {
            relay,
            static_dir: static_dir.into(),
        })
    }
}
