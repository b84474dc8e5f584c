use std::sync::Arc;

use crate::{analysis::fetcher::PageFetcher, config::AppConfig, db::app_storage::AppStorage};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<AppStorage>,
    pub config: Arc<AppConfig>,
    pub fetcher: Arc<PageFetcher>,
}

impl AppState {
    pub fn new(storage: AppStorage, config: AppConfig, fetcher: PageFetcher) -> Self {
        Self {
            storage: Arc::new(storage),
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
        }
    }
}
