/// Shared application state
use crate::config::{StorageBackend, StorageSettings};
use crate::error::Result;
use crate::graphql::{self, RosterSchema};
use crate::services::UserService;
use roster_core::{DisplayZone, UserStore};
use roster_storage::{MemoryUserStore, PgUserStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub schema: RosterSchema,
    pub display: DisplayZone,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, display: DisplayZone) -> Self {
        let users = Arc::new(UserService::new(store));
        let schema = graphql::build_schema(Arc::clone(&users), display);

        Self {
            users,
            schema,
            display,
        }
    }
}

/// Open the configured storage backend
///
/// For PostgreSQL this creates the pool and applies migrations.
pub async fn open_store(settings: &StorageSettings) -> Result<Arc<dyn UserStore>> {
    match settings.backend {
        StorageBackend::Postgres => {
            let pool = roster_storage::create_pool(
                &settings.database_url,
                &settings.schema,
                settings.max_connections,
            )
            .await
            .map_err(roster_storage::StorageError::from)?;
            roster_storage::run_migrations(&pool, &settings.schema).await?;
            tracing::info!(schema = %settings.schema, "Database connected");

            Ok(Arc::new(PgUserStore::new(pool)))
        }
        StorageBackend::Memory => {
            let store = if settings.seed_sample_data {
                MemoryUserStore::with_sample_data()
            } else {
                MemoryUserStore::new()
            };
            tracing::info!("Using in-memory storage");

            Ok(Arc::new(store))
        }
    }
}
