//! Server configuration types for Agora.
//!
//! `ServerConfig` represents the top-level `config.toml` in the data
//! directory. Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the chat server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind the HTTP listener on.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port for the HTTP listener.
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database file name, relative to the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// The one username allowed to delete any message.
    #[serde(default = "default_privileged_username")]
    pub privileged_username: String,

    /// Seconds a single socket write may stall before the connection's
    /// writer gives up on it.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,

    /// Directory of static assets to serve, if any.
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_file() -> String {
    "chat.db".to_string()
}

fn default_privileged_username() -> String {
    "aspect".to_string()
}

fn default_write_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_file: default_database_file(),
            privileged_username: default_privileged_username(),
            write_timeout_secs: default_write_timeout_secs(),
            static_dir: None,
        }
    }
}
