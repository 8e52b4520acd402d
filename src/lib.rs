use std::sync::Arc;

use config::Config;
use database::PostStore;
use nearby::{NearbyPosts, StoredRadius};

pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod nearby;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn PostStore>,
    pub nearby: NearbyPosts,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn PostStore>) -> Self {
        let radius = Arc::new(StoredRadius::new(store.clone()));
        let nearby = NearbyPosts::new(store.clone(), radius).with_timeout(config.query_timeout());

        Self {
            config,
            store,
            nearby,
            http: reqwest::Client::new(),
        }
    }
}
