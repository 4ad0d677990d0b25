//! # Application State
//!
//! Everything a command needs: the repositories and the pricing table.
//!
//! Generic over the record store so commands run unchanged against SQLite
//! in the binary and `MemoryStore` in tests.

use mehfil_core::{Clock, PricingConfig};
use mehfil_db::{Database, DbConfig, RecordStore, Repositories};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{ApiError, ErrorCode};

pub struct AppState<S> {
    repos: Repositories<S>,
    pricing: PricingConfig,
}

impl AppState<Database> {
    /// Opens (and migrates) the configured database.
    pub async fn open(config: &AppConfig) -> Result<Self, ApiError> {
        let db_path = config.database_path()?;
        info!(?db_path, "Opening database");

        let db = Database::new(DbConfig::new(db_path)).await?;
        if !db.health_check().await {
            return Err(ApiError::new(ErrorCode::DatabaseError, "Database is not answering queries"));
        }
        info!("Database connected and migrations applied");

        Ok(AppState::with_store(db, config))
    }
}

impl<S: RecordStore> AppState<S> {
    pub fn with_store(store: S, config: &AppConfig) -> Self {
        AppState {
            repos: Repositories::new(store).with_order_policy(config.order_transitions),
            pricing: config.pricing,
        }
    }

    /// Replaces the clock (tests pass a `ManualClock`).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.repos = self.repos.with_clock(clock);
        self
    }

    pub fn repos(&self) -> &Repositories<S> {
        &self.repos
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mehfil_core::UserRole;

    #[tokio::test]
    async fn test_open_file_database() {
        let path = std::env::temp_dir().join(format!("mehfil-state-{}.db", std::process::id()));
        let config = AppConfig {
            db_path: Some(path.clone()),
            ..AppConfig::default()
        };

        let state = AppState::open(&config).await.unwrap();
        let admin = state
            .repos()
            .users()
            .ensure_default_admin("admin123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        state.repos().store().close().await;

        let reopened = AppState::open(&config).await.unwrap();
        assert_eq!(reopened.repos().users().list().await.unwrap().len(), 1);
        reopened.repos().store().close().await;

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
