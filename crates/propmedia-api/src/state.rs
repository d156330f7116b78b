//! Application state shared across handlers.

use propmedia_core::Config;
use propmedia_db::{AssetRepository, MediaStore};
use propmedia_processing::Thumbnailer;
use std::sync::Arc;

pub struct AppState {
    pub store: MediaStore,
    pub thumbnailer: Thumbnailer,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, repository: Arc<dyn AssetRepository>) -> Self {
        Self {
            store: MediaStore::new(repository),
            thumbnailer: Thumbnailer::new(config.thumbnail),
            config,
        }
    }
}
