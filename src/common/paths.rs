//! Project-relative paths for configuration and logs
//!
//! The project root is `$APICASE_ROOT` when set, otherwise the current
//! working directory. Layout under the root:
//! - `config/config.yaml` - default configuration file
//! - `logs/` - one log file per run

use std::io;
use std::path::PathBuf;

/// Environment variable overriding the project root
pub const ROOT_ENV: &str = "APICASE_ROOT";

/// Get the project root directory
pub fn project_root() -> PathBuf {
    if let Ok(root) = std::env::var(ROOT_ENV) {
        if !root.is_empty() {
            return PathBuf::from(root);
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Get the path to the default configuration file
pub fn config_path() -> PathBuf {
    project_root().join("config").join("config.yaml")
}

/// Get the path to the log directory
pub fn log_dir() -> PathBuf {
    project_root().join("logs")
}

/// Ensure the log directory exists
pub fn ensure_log_dir() -> io::Result<PathBuf> {
    let dir = log_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_under_config_dir() {
        let path = config_path();
        assert!(path.ends_with("config/config.yaml"));
    }

    #[test]
    fn test_log_dir_is_valid() {
        let dir = log_dir();
        assert!(dir.ends_with("logs"));
    }
}
