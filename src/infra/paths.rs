// src/infra/paths.rs — Application path management
//
// All paths respect the DECORA_HOME environment variable for isolation.
// When unset, config lives under ~/.decora/.

use directories::BaseDirs;
use std::path::PathBuf;

/// Returns the DECORA_HOME override, if set.
fn decora_home() -> Option<PathBuf> {
    std::env::var_os("DECORA_HOME").map(PathBuf::from)
}

/// Configuration directory: $DECORA_HOME/ or ~/.decora/
pub fn config_dir() -> PathBuf {
    if let Some(home) = decora_home() {
        return home;
    }
    dirs_home().join(".decora")
}

/// Home directory
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .expect("Could not determine home directory")
        .home_dir()
        .to_path_buf()
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
