use std::sync::Arc;

use crate::config::Config;
use crate::database::activities_repo::ActivityDirectory;
use crate::services::activities_service::CapacityPolicy;

/// Shared handler state. Cloning is cheap; every clone sees the same directory.
#[derive(Debug, Clone)]
pub struct AppState {
    pub directory: Arc<ActivityDirectory>,
    pub capacity: CapacityPolicy,
}

impl AppState {
    pub fn new(directory: ActivityDirectory, capacity: CapacityPolicy) -> Self {
        Self {
            directory: Arc::new(directory),
            capacity,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ActivityDirectory::seeded(),
            CapacityPolicy::from_enforce_flag(config.enforce_capacity),
        )
    }
}
