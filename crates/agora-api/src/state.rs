//! Application state wiring the chat hub to its SQLite store.
//!
//! The core is generic over `MessageStore`; AppState pins it to the
//! concrete infra implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use agora_core::chat::{ChatHub, HubSettings};
use agora_infra::config::load_server_config;
use agora_infra::filesystem::{database_path, resolve_data_dir};
use agora_infra::sqlite::{DatabasePool, SqliteMessageStore};
use agora_types::config::ServerConfig;

/// Concrete type alias for the hub generic pinned to the infra store.
pub type ConcreteChatHub = ChatHub<SqliteMessageStore>;

/// Shared application state.
///
/// Used by both CLI commands and HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<ConcreteChatHub>,
    pub config: Arc<ServerConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: resolve the data dir, load config,
    /// connect to the DB, and build the hub.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_server_config(&data_dir).await;
        Self::with_config(data_dir, config).await
    }

    /// Build state from an explicit data directory and config.
    pub async fn with_config(data_dir: PathBuf, config: ServerConfig) -> anyhow::Result<Self> {
        let db_path = database_path(&data_dir, &config);
        let pool = DatabasePool::open(&db_path)
            .await
            .with_context(|| format!("failed to open database {}", db_path.display()))?;
        tracing::debug!(path = %db_path.display(), "database ready");

        let settings = HubSettings {
            privileged_username: config.privileged_username.clone(),
        };
        let hub = ChatHub::new(Arc::new(SqliteMessageStore::new(pool)), settings);

        Ok(Self {
            hub: Arc::new(hub),
            config: Arc::new(config),
            data_dir,
        })
    }

    pub fn store(&self) -> &SqliteMessageStore {
        self.hub.store()
    }
}
