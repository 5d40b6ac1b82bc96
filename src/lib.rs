pub mod api;
pub mod config;
pub mod db;
pub mod notifications;
pub mod roster;
pub mod utils;

pub use db::DbPool;

use config::Config;
use notifications::DutyNotifier;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub notifier: Arc<dyn DutyNotifier>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, notifier: Arc<dyn DutyNotifier>) -> Self {
        Self {
            config,
            db,
            notifier,
        }
    }
}
