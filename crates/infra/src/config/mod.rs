//! Configuration loading
//!
//! This module loads [`ConnectorConfig`](hubspot_sync_domain::ConnectorConfig)
//! from environment variables and files.

pub mod loader;

// Re-export commonly used items
pub use loader::{
    load, load_from_env, load_from_file, parse_config, probe_config_paths, probe_config_paths_from,
};
