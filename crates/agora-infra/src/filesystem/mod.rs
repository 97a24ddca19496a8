//! Filesystem layout helpers for Agora.
//!
//! Everything the server persists lives under one data directory:
//! `config.toml` and the SQLite database file.

use std::path::{Path, PathBuf};

use agora_types::config::ServerConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "AGORA_DATA_DIR";

/// Environment variable overriding the static asset directory.
pub const STATIC_DIR_ENV: &str = "AGORA_STATIC_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `AGORA_DATA_DIR` environment variable
/// 2. `~/.agora`
/// 3. `.agora` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var(DATA_DIR_ENV).ok(), dirs::home_dir())
}

fn data_dir_from(env_override: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(home) = home {
        return home.join(".agora");
    }

    PathBuf::from(".agora")
}

/// Path of the SQLite database file inside the data directory.
pub fn database_path(data_dir: &Path, config: &ServerConfig) -> PathBuf {
    data_dir.join(&config.database_file)
}

/// Static asset directory: `AGORA_STATIC_DIR` wins over `static_dir` in config.
pub fn resolve_static_dir(config: &ServerConfig) -> Option<PathBuf> {
    static_dir_from(std::env::var(STATIC_DIR_ENV).ok(), config)
}

fn static_dir_from(env_override: Option<String>, config: &ServerConfig) -> Option<PathBuf> {
    env_override
        .filter(|d| !d.is_empty())
        .or_else(|| config.static_dir.clone())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_env_override_wins() {
        let dir = data_dir_from(Some("/srv/agora".to_string()), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/srv/agora"));
    }

    #[test]
    fn test_data_dir_falls_back_to_home() {
        let dir = data_dir_from(None, Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/home/u/.agora"));

        let dir = data_dir_from(Some(String::new()), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/home/u/.agora"));
    }

    #[test]
    fn test_data_dir_last_resort() {
        assert_eq!(data_dir_from(None, None), PathBuf::from(".agora"));
    }

    #[test]
    fn test_database_path_uses_config_file_name() {
        let config = ServerConfig {
            database_file: "history.db".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(
            database_path(Path::new("/data"), &config),
            PathBuf::from("/data/history.db")
        );
    }

    #[test]
    fn test_static_dir_resolution() {
        let mut config = ServerConfig::default();
        assert_eq!(static_dir_from(None, &config), None);

        config.static_dir = Some("static".to_string());
        assert_eq!(static_dir_from(None, &config), Some(PathBuf::from("static")));
        assert_eq!(
            static_dir_from(Some("public".to_string()), &config),
            Some(PathBuf::from("public"))
        );
    }
}
