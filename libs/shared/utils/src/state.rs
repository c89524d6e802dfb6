use std::sync::Arc;

use tracing::info;

use shared_config::{AppConfig, StoreBackend};
use shared_database::{DoctorLocks, InMemoryStore, ScheduleStore, SupabaseStore};

use crate::jwt::TokenService;

/// Shared handles every router is built over.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ScheduleStore>,
    pub tokens: Arc<TokenService>,
    pub doctor_locks: Arc<DoctorLocks>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ScheduleStore>) -> Self {
        let tokens = TokenService::from_config(&config);

        Self {
            config: Arc::new(config),
            store,
            tokens: Arc::new(tokens),
            doctor_locks: Arc::new(DoctorLocks::new()),
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Arc::new(InMemoryStore::new()))
    }

    /// Picks the store implementation named by `config.store_backend`.
    pub fn from_config(config: AppConfig) -> Self {
        match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory schedule store");
                Self::in_memory(config)
            }
            StoreBackend::Supabase => {
                info!("Using Supabase schedule store at {}", config.supabase_url);
                let store = SupabaseStore::new(&config);
                Self::new(config, Arc::new(store))
            }
        }
    }
}
