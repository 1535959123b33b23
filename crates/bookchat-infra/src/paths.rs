//! Data directory layout.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "BOOKCHAT_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `BOOKCHAT_DATA_DIR` environment variable
/// 2. `~/.bookchat`
/// 3. `.bookchat` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var(DATA_DIR_ENV).ok(), dirs::home_dir())
}

fn data_dir_from(env_value: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_value.filter(|dir| !dir.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    match home {
        Some(home) => home.join(".bookchat"),
        None => PathBuf::from(".bookchat"),
    }
}

/// `{data_dir}/config.toml`
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}
