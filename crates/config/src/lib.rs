//! Configuration loading, discovery, and env substitution.
//!
//! Config files: `crier.toml`, `crier.yaml`, or `crier.json`,
//! searched in `./` then `~/.config/crier/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        config_dir, data_dir, discover_and_load, find_or_default_config_path, load_config,
        save_config,
    },
    schema::{
        CallbackConfig, CrierConfig, PlatformCredentials, PlatformsConfig, SchedulerConfig,
        StoreConfig,
    },
};
