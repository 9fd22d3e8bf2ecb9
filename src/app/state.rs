//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::rooms::RoomService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rooms: Arc<RoomService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            rooms: Arc::new(RoomService::new()),
        }
    }
}
