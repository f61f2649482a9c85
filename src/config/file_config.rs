//! Configuration file discovery.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! semantic_scholar = "your-api-key"
//!
//! [search]
//! timeout_secs = 20
//! primary_share = 0.6
//! primary_min = 4
//!
//! [retry]
//! attempts = 3
//! backoff_step_ms = 600
//! timeout_secs = 14
//!
//! [graph]
//! similarity_threshold = 0.12
//! fallback_edge_weight = 0.05
//! max_features = 1200
//! layout_seed = 42
//!
//! [logging]
//! level = "info"
//! format = "plain"
//! ```

use std::path::PathBuf;

/// File name looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "scholar-sync.toml";

/// Per-user configuration file, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scholar-sync").join("config.toml"))
}

/// First existing configuration file: `./scholar-sync.toml`, then the
/// per-user file
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|path| path.is_file())
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Serialize error: {0}")]
    Serialize(String),
}
